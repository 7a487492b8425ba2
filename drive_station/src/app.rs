//! Top-level drive loop and its state.
//!
//! `AppState` owns the classification side: it turns one
//! [`SourceReading`](crate::sources::SourceReading) per tick into a
//! [`DriveCommand`]. `run` wires a source, the optional cockpit, and the
//! serial sink into the single-threaded loop, and guarantees the car is
//! told to stop on the way out no matter how the loop ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use drive_command::{classify_axes, DriveCommand, RingGeometry};
use drive_link::{open_link, CommandSink};
use pose_bridge::{PoseFrame, WristSide};
use tracing::{debug, info};

use crate::cockpit::{Cockpit, WIN_H, WIN_W};
use crate::sources::{GamepadSource, PoseStream, SourceReading};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// How the operator steers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Gamepad left stick.
    Pad,
    /// Wrist frames from an external pose detector; a file path or `-`
    /// for stdin.
    Pose { frames: String },
    /// Mouse and arrow keys inside the cockpit window. No hardware.
    Sim,
}

/// Configuration for a full driving session.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mode:           Mode,
    /// Serial port name; `None` auto-discovers and may fall back to dry run.
    pub port:           Option<String>,
    pub baud:           u32,
    /// Dead-zone radius in frame pixels.
    pub inner_radius:   f32,
    /// Go-zone outer radius in frame pixels.
    pub outer_radius:   f32,
    pub wrist:          WristSide,
    pub min_confidence: f32,
    /// Flip detector frames horizontally so the view behaves like a mirror.
    pub mirror:         bool,
    /// Open the cockpit window in pad mode too.
    pub cockpit:        bool,
    /// Delay between ticks; 50 ms gives the nominal 20 Hz command rate.
    pub tick:           Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            mode:           Mode::Sim,
            port:           None,
            baud:           9600,
            inner_radius:   60.0,
            outer_radius:   200.0,
            wrist:          WristSide::Left,
            min_confidence: 0.25,
            mirror:         true,
            cockpit:        false,
            tick:           Duration::from_millis(50),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

/// What the cockpit draws for the current mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind { Pad, Pose, Sim }

impl ViewKind {
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Pad  => "PAD",
            ViewKind::Pose => "POSE",
            ViewKind::Sim  => "SIM",
        }
    }
}

pub struct AppState {
    // ── classification ───────────────────────────────────────────────────
    view:        ViewKind,
    ring:        RingGeometry,
    wrist:       WristSide,
    min_conf:    f32,
    mirror:      bool,

    // ── last tick, for rendering ─────────────────────────────────────────
    command:     DriveCommand,
    axes:        (f32, f32),
    frame:       Option<PoseFrame>,
    wrist_point: Option<(f32, f32)>,

    // ── counters ─────────────────────────────────────────────────────────
    ticks:       u64,
    missed:      u64,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let view = match cfg.mode {
            Mode::Pad      => ViewKind::Pad,
            Mode::Pose { .. } => ViewKind::Pose,
            Mode::Sim      => ViewKind::Sim,
        };
        AppState {
            view,
            // Pose frames move the center to their own midpoint as they
            // arrive; simulation classifies in window coordinates.
            ring: RingGeometry::centered_in(
                WIN_W as u32,
                WIN_H as u32,
                cfg.inner_radius,
                cfg.outer_radius,
            ),
            wrist:       cfg.wrist,
            min_conf:    cfg.min_confidence,
            mirror:      cfg.mirror,
            command:     DriveCommand::STOP,
            axes:        (0.0, 0.0),
            frame:       None,
            wrist_point: None,
            ticks:       0,
            missed:      0,
        }
    }

    /// Map one reading to this tick's command.
    pub fn ingest(&mut self, reading: SourceReading) -> DriveCommand {
        self.ticks += 1;
        let command = match reading {
            SourceReading::Axes { x, y } => {
                self.axes = (x, y);
                self.frame = None;
                self.wrist_point = None;
                classify_axes(x, y)
            }
            SourceReading::Pose(frame) => {
                let frame = if self.mirror { frame.mirrored() } else { frame };
                // Radii stay fixed; the center tracks the detector's frame.
                self.ring.center_x = (frame.width / 2) as f32;
                self.ring.center_y = (frame.height / 2) as f32;
                self.wrist_point = frame
                    .wrist(self.wrist, self.min_conf)
                    .map(|kp| kp.position());
                if self.wrist_point.is_none() {
                    self.missed += 1;
                    debug!(tick = self.ticks, "no detection in frame");
                }
                self.frame = Some(frame);
                self.ring.classify(self.wrist_point)
            }
            SourceReading::Cursor(x, y) => {
                self.frame = None;
                self.wrist_point = Some((x, y));
                self.ring.classify(self.wrist_point)
            }
            SourceReading::Blank | SourceReading::Exhausted => {
                self.frame = None;
                self.wrist_point = None;
                self.missed += 1;
                self.ring.classify(None)
            }
        };
        self.command = command;
        command
    }

    pub fn toggle_mirror(&mut self) {
        self.mirror = !self.mirror;
        info!(mirror = self.mirror, "mirror toggled");
    }

    // ── accessors for rendering and tests ────────────────────────────────

    pub fn view(&self) -> ViewKind                  { self.view }
    pub fn command(&self) -> DriveCommand           { self.command }
    pub fn ring(&self) -> &RingGeometry             { &self.ring }
    pub fn frame(&self) -> Option<&PoseFrame>       { self.frame.as_ref() }
    pub fn wrist_point(&self) -> Option<(f32, f32)> { self.wrist_point }
    pub fn axes(&self) -> (f32, f32)                { self.axes }
    pub fn mirror(&self) -> bool                    { self.mirror }
    pub fn ticks(&self) -> u64                      { self.ticks }
    pub fn missed(&self) -> u64                     { self.missed }
}

// ════════════════════════════════════════════════════════════════════════════
// run
// ════════════════════════════════════════════════════════════════════════════

/// Drive until the operator quits, the window closes, or the pose stream
/// ends. The final stop command is sent unconditionally on every exit path.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    if cfg.inner_radius < 0.0 || cfg.inner_radius >= cfg.outer_radius {
        return Err(format!(
            "ring radii: inner {} must be non-negative and smaller than outer {}",
            cfg.inner_radius, cfg.outer_radius
        ));
    }

    // ── Ctrl-C flag, so headless runs stop cleanly ───────────────────────
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = interrupted.clone();
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .map_err(|e| format!("interrupt handler: {e}"))?;
    }

    // ── Outbound link (degrades to a dry run on its own) ─────────────────
    let mut sink = CommandSink::new(open_link(cfg.port.as_deref(), cfg.baud));
    info!(link = %sink.describe(), "command sink ready");

    // ── Source ────────────────────────────────────────────────────────────
    enum Source {
        Pad(GamepadSource),
        Pose(PoseStream),
        Sim,
    }
    let mut source = match &cfg.mode {
        Mode::Pad             => Source::Pad(GamepadSource::new()?),
        Mode::Pose { frames } => {
            let stream = PoseStream::open(frames)?;
            info!(stream = %stream.label(), "pose stream open");
            Source::Pose(stream)
        }
        Mode::Sim             => Source::Sim,
    };

    // ── Cockpit (mandatory for pose and sim, opt-in for pad) ─────────────
    let mut app = AppState::new(&cfg);
    let mut cockpit = if app.view() != ViewKind::Pad || cfg.cockpit {
        Some(Cockpit::new("Drive Station — RC Car Teleop")?)
    } else {
        None
    };

    let link_line = format!("LINK {}", sink.describe());
    let legend = match app.view() {
        ViewKind::Pad  => "Q = QUIT",
        ViewKind::Pose => "M = MIRROR   Q = QUIT",
        ViewKind::Sim  => "ARROWS = DRIVE   MOUSE = WRIST   Q = QUIT",
    };

    // ── Main loop ─────────────────────────────────────────────────────────
    loop {
        if interrupted.load(Ordering::SeqCst) {
            info!("interrupted, stopping");
            break;
        }

        // 1. Window input (quit, mirror, simulated stick and wrist).
        let mut sim_axes = None;
        let mut cursor = None;
        if let Some(c) = cockpit.as_mut() {
            if !c.is_open() {
                info!("cockpit closed, stopping");
                break;
            }
            let input = c.poll_input();
            if input.quit {
                info!("quit requested, stopping");
                break;
            }
            if input.toggle_mirror {
                app.toggle_mirror();
            }
            sim_axes = input.sim_axes;
            cursor = input.cursor;
        }

        // 2. One reading from the active source.
        let reading = match &mut source {
            Source::Pad(pad)     => pad.sample(),
            Source::Pose(stream) => stream.sample(),
            // Arrow keys win over the pointer, so keyboard driving is not
            // disturbed by where the mouse happens to rest.
            Source::Sim => match (sim_axes, cursor) {
                (Some((x, y)), _)    => SourceReading::Axes { x, y },
                (None, Some((x, y))) => SourceReading::Cursor(x, y),
                (None, None)         => SourceReading::Blank,
            },
        };
        if reading == SourceReading::Exhausted {
            info!("pose stream ended, stopping");
            break;
        }

        // 3. Classify and transmit.
        let command = app.ingest(reading);
        sink.send(command);

        // 4. Feedback.
        if let Some(c) = cockpit.as_mut() {
            c.render(&app, &link_line, legend);
        }

        // 5. Pace the loop.
        thread::sleep(cfg.tick);
    }

    // Fail-safe: the car halts even if the last transmitted command was
    // identical or the loop never sent anything.
    sink.shutdown();
    info!(ticks = app.ticks(), missed = app.missed(), "session closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
