//! Software-rendered cockpit window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ MODE POSE   LAST R4   MIRROR ON              │
//! │ LINK /DEV/RFCOMM0 @ 9600                     │
//! │                  F                           │
//! │          ...outer ring (go zone)...          │
//! │       L  ..inner ring (dead zone)..  R       │
//! │          wrist marker + skeleton             │
//! │                  B                           │
//! │ M = MIRROR   Q = QUIT                        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Pose and simulation runs always get the window (it is the feedback and,
//! for simulation, the input device). Pad runs open it on request only.

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use crate::app::{AppState, ViewKind};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 640;
pub const WIN_H: usize = 480;

const STATUS_Y:  usize = 8;
const LEGEND_Y:  usize = WIN_H - 15;
const PAD_HALF:  f32   = 150.0; // stick box half-width in pixels

const BG_COLOR:    u32 = 0xFF10141C;
const TEXT_COLOR:  u32 = 0xFFD0D8E8;
const DIM_COLOR:   u32 = 0xFF5A6478;
const SEP_COLOR:   u32 = 0xFFE8ECF4; // quadrant separators
const OUTER_COLOR: u32 = 0xFF30C050; // go zone boundary
const INNER_COLOR: u32 = 0xFFE04040; // dead zone boundary
const BONE_COLOR:  u32 = 0xFF00E0E0;
const LIVE_COLOR:  u32 = 0xFF40FF70; // marker while commanding
const IDLE_COLOR:  u32 = 0xFFFFB030; // marker while stopped

// ════════════════════════════════════════════════════════════════════════════
// Cockpit
// ════════════════════════════════════════════════════════════════════════════

/// Keys and pointer state gathered once per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct CockpitInput {
    pub quit:          bool,
    pub toggle_mirror: bool,
    /// Arrow-key stick, full deflection, 0.6 with shift held.
    pub sim_axes:      Option<(f32, f32)>,
    /// Pointer position in window coordinates, when inside the window.
    pub cursor:        Option<(f32, f32)>,
}

pub struct Cockpit {
    window: Window,
    buf:    Vec<u32>,
}

impl Cockpit {
    pub fn new(title: &str) -> Result<Self, String> {
        let mut window = Window::new(
            title,
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        // Pacing lives in the drive loop; this only caps redraw cost.
        window.limit_update_rate(Some(std::time::Duration::from_millis(4)));

        Ok(Cockpit {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
        })
    }

    /// Returns false when the window has been closed.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and pointer. Arrow keys are read level-triggered so a
    /// held key keeps steering between key-repeat events.
    pub fn poll_input(&self) -> CockpitInput {
        // Keys that trigger on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Keys sampled while held
        let held     = |k: Key| self.window.is_key_down(k);

        let quit          = one_shot(Key::Q) || one_shot(Key::Escape);
        let toggle_mirror = one_shot(Key::M);

        let mut x = 0.0f32;
        let mut y = 0.0f32;
        if held(Key::Left)  { x -= 1.0; }
        if held(Key::Right) { x += 1.0; }
        if held(Key::Up)    { y -= 1.0; }
        if held(Key::Down)  { y += 1.0; }
        let gain = if held(Key::LeftShift) || held(Key::RightShift) { 0.6 } else { 1.0 };
        let sim_axes = (x != 0.0 || y != 0.0).then_some((x * gain, y * gain));

        let cursor = self.window.get_mouse_pos(MouseMode::Discard);

        CockpitInput { quit, toggle_mirror, sim_axes, cursor }
    }

    // ── Frame rendering ───────────────────────────────────────────────────

    /// Redraw the whole window from the current drive state.
    pub fn render(&mut self, app: &AppState, link_line: &str, legend: &str) {
        self.buf.fill(BG_COLOR);

        match app.view() {
            ViewKind::Pad => self.draw_stick_box(app),
            ViewKind::Pose | ViewKind::Sim => self.draw_rings(app),
        }

        // Status: mode, last command, link state, legend.
        let mut status = format!("MODE {}   LAST {}", app.view().name(), app.command());
        if app.view() == ViewKind::Pose {
            status.push_str(if app.mirror() { "   MIRROR ON" } else { "   MIRROR OFF" });
        }
        self.draw_label(8, STATUS_Y, &status, TEXT_COLOR);
        self.draw_label(8, STATUS_Y + 12, link_line, DIM_COLOR);
        self.draw_label(8, LEGEND_Y, legend, DIM_COLOR);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    /// Steering rings, sector separators, and whatever the detector saw.
    fn draw_rings(&mut self, app: &AppState) {
        // Detector frames keep their own dimensions; scale them onto the
        // window. Simulation classifies in window coordinates already.
        let (sx, sy) = match app.frame() {
            Some(f) => (WIN_W as f32 / f.width as f32, WIN_H as f32 / f.height as f32),
            None => (1.0, 1.0),
        };
        let s = sx.min(sy);

        let ring = app.ring();
        let cx = ring.center_x * sx;
        let cy = ring.center_y * sy;
        let inner = ring.inner_radius * s;
        let outer = ring.outer_radius * s;

        self.draw_circle(cx as i32, cy as i32, outer as i32, OUTER_COLOR);
        self.draw_circle(cx as i32, cy as i32, inner as i32, INNER_COLOR);

        // Diagonal separators between the four steering cones.
        let k = std::f32::consts::FRAC_1_SQRT_2;
        for (dx, dy) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            self.draw_line(
                (cx + dx * inner * k) as i32, (cy + dy * inner * k) as i32,
                (cx + dx * outer * k) as i32, (cy + dy * outer * k) as i32,
                SEP_COLOR,
            );
        }

        // Direction letters at mid-annulus.
        let mid = (inner + outer) / 2.0;
        self.draw_label((cx - 2.0) as usize, (cy - mid - 3.0) as usize, "F", DIM_COLOR);
        self.draw_label((cx - 2.0) as usize, (cy + mid - 3.0) as usize, "B", DIM_COLOR);
        self.draw_label((cx - mid - 2.0) as usize, (cy - 3.0) as usize, "L", DIM_COLOR);
        self.draw_label((cx + mid - 2.0) as usize, (cy - 3.0) as usize, "R", DIM_COLOR);

        if let Some(frame) = app.frame() {
            for ((ax, ay), (bx, by)) in frame.bone_segments() {
                self.draw_line(
                    (ax * sx) as i32, (ay * sy) as i32,
                    (bx * sx) as i32, (by * sy) as i32,
                    BONE_COLOR,
                );
            }
        }

        match app.wrist_point() {
            Some((wx, wy)) => {
                let (mx, my) = ((wx * sx) as i32, (wy * sy) as i32);
                if app.command().is_stop() {
                    self.draw_circle(mx, my, 6, IDLE_COLOR);
                } else {
                    self.fill_circle(mx, my, 6, LIVE_COLOR);
                }
            }
            // Only the detector view announces a lost target; in simulation
            // an absent pointer is just idle.
            None if app.view() == ViewKind::Pose => {
                self.draw_label((cx as usize).saturating_sub(36), cy as usize, "NO DETECTION", DIM_COLOR);
            }
            None => {}
        }
    }

    /// Stick position against the classification thresholds (pad mode).
    fn draw_stick_box(&mut self, app: &AppState) {
        let cx = (WIN_W / 2) as f32;
        let cy = (WIN_H / 2) as f32;
        let half = PAD_HALF;

        self.rect_border(
            (cx - half) as usize, (cy - half) as usize,
            (half * 2.0) as usize + 1, (half * 2.0) as usize + 1,
            DIM_COLOR,
        );
        // The 0.5 threshold box: crossing it picks a direction.
        let t = half * 0.5;
        self.rect_border(
            (cx - t) as usize, (cy - t) as usize,
            (t * 2.0) as usize + 1, (t * 2.0) as usize + 1,
            INNER_COLOR,
        );
        self.draw_line((cx - half) as i32, cy as i32, (cx + half) as i32, cy as i32, DIM_COLOR);
        self.draw_line(cx as i32, (cy - half) as i32, cx as i32, (cy + half) as i32, DIM_COLOR);

        self.draw_label((cx - 2.0) as usize, (cy - half - 12.0) as usize, "F", DIM_COLOR);
        self.draw_label((cx - 2.0) as usize, (cy + half + 6.0) as usize, "B", DIM_COLOR);
        self.draw_label((cx - half - 12.0) as usize, (cy - 3.0) as usize, "L", DIM_COLOR);
        self.draw_label((cx + half + 7.0) as usize, (cy - 3.0) as usize, "R", DIM_COLOR);

        let (ax, ay) = app.axes();
        let dot = if app.command().is_stop() { IDLE_COLOR } else { LIVE_COLOR };
        self.fill_circle((cx + ax * half) as i32, (cy + ay * half) as i32, 6, dot);
    }

    // ── Drawing primitives ────────────────────────────────────────────────

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn rect_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for dx in 0..w {
            self.set_pixel((x + dx) as i32, y as i32, color);
            self.set_pixel((x + dx) as i32, (y + h - 1) as i32, color);
        }
        for dy in 0..h {
            self.set_pixel(x as i32, (y + dy) as i32, color);
            self.set_pixel((x + w - 1) as i32, (y + dy) as i32, color);
        }
    }

    /// Bresenham segment, clipped per pixel.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Midpoint circle outline.
    fn draw_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        if r <= 0 { return; }
        let mut x = r;
        let mut y = 0;
        let mut err = 1 - r;
        while x >= y {
            for (px, py) in [
                (cx + x, cy + y), (cx - x, cy + y), (cx + x, cy - y), (cx - x, cy - y),
                (cx + y, cy + x), (cx - y, cy + x), (cx + y, cy - x), (cx - y, cy - x),
            ] {
                self.set_pixel(px, py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: u32) {
        for dy in -r..=r {
            let half = ((r * r - dy * dy) as f32).sqrt() as i32;
            for dx in -half..=half {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// 5x7 bitmap text, uppercased, 6 px advance.
    fn draw_label(&mut self, x: usize, y: usize, text: &str, color: u32) {
        for (i, c) in text.chars().enumerate() {
            let rows = glyph(c.to_ascii_uppercase());
            let gx = x + i * 6;
            for (ry, row) in rows.iter().enumerate() {
                for bit in 0..5 {
                    if row & (0b10000 >> bit) != 0 {
                        self.set_pixel((gx + bit) as i32, (y + ry) as i32, color);
                    }
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// 5x7 font
// ════════════════════════════════════════════════════════════════════════════

/// Glyph rows, top to bottom, 5 bits wide. Unknown characters render as a
/// hollow box.
fn glyph(c: char) -> [u8; 7] {
    match c {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ' ' => [0, 0, 0, 0, 0, 0, 0],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '.' => [0, 0, 0, 0, 0, 0b00100, 0b00100],
        '/' => [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
        ':' => [0, 0b00100, 0b00100, 0, 0b00100, 0b00100, 0],
        '=' => [0, 0, 0b11111, 0, 0b11111, 0, 0],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        _   => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: [u8; 7] = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

    /// Every character the cockpit prints must have a real glyph, so a
    /// changed status string never renders as a row of boxes.
    #[test]
    fn status_charset_is_covered() {
        let samples = "MODE PAD POSE SIM LAST F7 S0 MIRROR ON OFF \
                       LINK /DEV/RFCOMM0 @ 9600 BAUD DRY RUN (NO SERIAL PORT) \
                       NO DETECTION ARROWS = DRIVE MOUSE WRIST M Q QUIT 0123456789 -.:";
        for c in samples.chars() {
            let g = glyph(c.to_ascii_uppercase());
            assert!(c == ' ' || g != MISSING, "missing glyph for {c:?}");
        }
    }

    #[test]
    fn unknown_chars_fall_back_to_box() {
        assert_eq!(glyph('~'), MISSING);
        assert_eq!(glyph('%'), MISSING);
    }

    #[test]
    fn glyphs_fit_five_columns() {
        for c in ('A'..='Z').chain('0'..='9') {
            for row in glyph(c) {
                assert_eq!(row & !0b11111, 0, "glyph {c:?} wider than 5 bits");
            }
        }
    }
}
