//! # drive_command
//!
//! Core types for the car's drive protocol: a [`DriveCommand`] is a
//! direction plus a quantized speed, rendered on the wire as a two-byte
//! ASCII payload and a newline:
//!
//! | code | direction | sent when                                  |
//! |------|-----------|--------------------------------------------|
//! | `F`  | Forward   | stick pushed up / wrist in the upper cone  |
//! | `B`  | Backward  | stick pulled down / wrist in the lower cone|
//! | `L`  | Left      | stick left / wrist in the left cone        |
//! | `R`  | Right     | stick right / wrist in the right cone      |
//! | `S`  | Stop      | everything else                            |
//!
//! Speed is a single digit `0`–`9`. `"F7\n"` means forward at 7/9 throttle;
//! `"S0\n"` is the all-stop the firmware falls back to.
//!
//! Two classifiers produce commands from operator input:
//!
//! * [`classify_axes`] — gamepad variant, threshold table over two stick
//!   axes in [-1, 1];
//! * [`RingGeometry::classify`] — vision variant, angle cones over a wrist
//!   position inside an annulus around the frame center.
//!
//! ## Quick start
//!
//! ```rust
//! use drive_command::{classify_axes, Direction, DriveCommand};
//!
//! // Stick pushed most of the way up, slight rightward drift.
//! let cmd = classify_axes(0.1, -0.8);
//! assert_eq!(cmd.direction(), Direction::Forward);
//! assert_eq!(cmd.speed(), 7);
//! assert_eq!(cmd.wire_line(), "F7\n");
//!
//! // Centered stick is the dead zone.
//! assert_eq!(classify_axes(0.3, -0.4), DriveCommand::STOP);
//! ```

use std::fmt;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Direction — the five drive states the firmware understands
// ════════════════════════════════════════════════════════════════════════════

/// One of the five drive states, identified on the wire by a single
/// ASCII letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl Direction {
    /// Wire code letter for this direction.
    pub const fn code(self) -> char {
        match self {
            Direction::Forward  => 'F',
            Direction::Backward => 'B',
            Direction::Left     => 'L',
            Direction::Right    => 'R',
            Direction::Stop     => 'S',
        }
    }

    /// Inverse of [`Direction::code`].
    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'F' => Some(Direction::Forward),
            'B' => Some(Direction::Backward),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            'S' => Some(Direction::Stop),
            _   => None,
        }
    }

    /// Lower-case human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Direction::Forward  => "forward",
            Direction::Backward => "backward",
            Direction::Left     => "left",
            Direction::Right    => "right",
            Direction::Stop     => "stop",
        }
    }

    pub const fn is_stop(self) -> bool {
        matches!(self, Direction::Stop)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DriveCommand — direction + quantized speed, the unit of transmission
// ════════════════════════════════════════════════════════════════════════════

/// A (direction, speed) pair.
///
/// Fields are private so the two invariants hold for every value that can
/// exist: speed is always in `0..=9`, and [`Direction::Stop`] always
/// carries speed 0. The converse is allowed — a moving direction may carry
/// speed 0 (wrist just past the inner ring), which the firmware treats as
/// no motion while keeping the direction visible on the wire.
///
/// ```rust
/// use drive_command::{Direction, DriveCommand};
///
/// assert_eq!(DriveCommand::new(Direction::Right, 14).speed(), 9);
/// assert_eq!(DriveCommand::new(Direction::Stop, 7), DriveCommand::STOP);
/// assert_eq!(DriveCommand::STOP.wire_line(), "S0\n");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DriveCommand {
    direction: Direction,
    speed:     u8,
}

impl DriveCommand {
    /// The all-stop command, `"S0"`.
    pub const STOP: DriveCommand = DriveCommand {
        direction: Direction::Stop,
        speed:     0,
    };

    /// Build a command, clamping speed to 9 and forcing speed 0 for
    /// [`Direction::Stop`].
    pub fn new(direction: Direction, speed: u8) -> Self {
        let speed = if direction.is_stop() { 0 } else { speed.min(9) };
        DriveCommand { direction, speed }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn is_stop(&self) -> bool {
        self.direction.is_stop()
    }

    /// The exact bytes written to the serial link: payload plus newline.
    pub fn wire_line(&self) -> String {
        format!("{}{}\n", self.direction.code(), self.speed)
    }

    /// Decode one wire line back into a command.
    ///
    /// Accepts an optional trailing `\n` or `\r\n`; everything else is
    /// strict. Used by tests and link diagnostics, not by the car.
    ///
    /// ```rust
    /// use drive_command::{Direction, DriveCommand};
    ///
    /// let cmd = DriveCommand::parse_line("B3\n").unwrap();
    /// assert_eq!(cmd.direction(), Direction::Backward);
    /// assert_eq!(cmd.speed(), 3);
    /// assert!(DriveCommand::parse_line("F12\n").is_err());
    /// ```
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let payload = line.strip_suffix('\n').unwrap_or(line);
        let payload = payload.strip_suffix('\r').unwrap_or(payload);

        let mut chars = payload.chars();
        let d = chars.next().ok_or(ParseError::Empty)?;
        let direction = Direction::from_code(d).ok_or(ParseError::Direction(d))?;
        let s = chars.next().ok_or(ParseError::MissingSpeed)?;
        let speed = s.to_digit(10).ok_or(ParseError::Speed(s))? as u8;

        let rest: String = chars.collect();
        if !rest.is_empty() {
            return Err(ParseError::Trailing(rest));
        }
        if direction.is_stop() && speed != 0 {
            return Err(ParseError::StopSpeed(speed));
        }
        Ok(DriveCommand { direction, speed })
    }
}

impl Default for DriveCommand {
    /// Startup state is all-stop.
    fn default() -> Self {
        DriveCommand::STOP
    }
}

impl fmt::Display for DriveCommand {
    /// Payload without the newline, e.g. `F7` — what the logs show.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.code(), self.speed)
    }
}

/// Reasons a wire line fails to decode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    Empty,
    #[error("unrecognized direction code `{0}`")]
    Direction(char),
    #[error("missing speed digit")]
    MissingSpeed,
    #[error("speed must be a digit 0-9, got `{0}`")]
    Speed(char),
    #[error("unexpected trailing input `{0}`")]
    Trailing(String),
    #[error("stop must carry speed 0, got {0}")]
    StopSpeed(u8),
}

// ════════════════════════════════════════════════════════════════════════════
// Stick classifier — gamepad variant
// ════════════════════════════════════════════════════════════════════════════

/// Deflection a stick axis must exceed before it counts as a command.
pub const AXIS_THRESHOLD: f32 = 0.5;

/// Classify a pair of stick axes into a command.
///
/// Both axes are in [-1, 1]; negative `axis_y` is stick-forward. First
/// match wins, and the vertical checks come first: a stick pushed into a
/// corner drives forward or backward, never left or right. That priority
/// is the pad variant's tie-break policy.
///
/// | order | test             | result   |
/// |-------|------------------|----------|
/// | 1     | `axis_y < -0.5`  | Forward  |
/// | 2     | `axis_y >  0.5`  | Backward |
/// | 3     | `axis_x < -0.5`  | Left     |
/// | 4     | `axis_x >  0.5`  | Right    |
/// | 5     | otherwise        | Stop     |
///
/// Speed is the dominant axis quantized to a digit:
/// `floor(|axis| × 9)`, clamped to 9.
pub fn classify_axes(axis_x: f32, axis_y: f32) -> DriveCommand {
    if axis_y < -AXIS_THRESHOLD {
        DriveCommand::new(Direction::Forward, quantize_axis(axis_y))
    } else if axis_y > AXIS_THRESHOLD {
        DriveCommand::new(Direction::Backward, quantize_axis(axis_y))
    } else if axis_x < -AXIS_THRESHOLD {
        DriveCommand::new(Direction::Left, quantize_axis(axis_x))
    } else if axis_x > AXIS_THRESHOLD {
        DriveCommand::new(Direction::Right, quantize_axis(axis_x))
    } else {
        DriveCommand::STOP
    }
}

/// `floor(|axis| × 9)` clamped to 9. Full deflection is exactly 9; the
/// clamp absorbs drivers that report slightly past ±1.0.
fn quantize_axis(axis: f32) -> u8 {
    ((axis.abs() * 9.0) as u8).min(9)
}

// ════════════════════════════════════════════════════════════════════════════
// RingGeometry — vision variant
// ════════════════════════════════════════════════════════════════════════════

/// The virtual joystick drawn over the camera frame: an annulus around the
/// frame center.
///
/// Inside `inner_radius` is the dead zone; outside `outer_radius` nothing
/// tracks. In between, the wrist's polar angle picks the direction and its
/// radial depth into the annulus picks the speed.
///
/// Angle cones (degrees, pixel Y flipped so "up" is +90°):
///
/// ```text
///              [45, 135) F
///                 \  |  /
///  [135, 180] L    \ | /     R [-45, 45)
///  [-180,-135) L   / | \
///                 /  |  \
///             [-135, -45) B
/// ```
///
/// The cones are the ring variant's tie-break policy: a single polar angle
/// partitions cleanly into four 90° sectors, so no axis-priority order is
/// needed here.
///
/// ```rust
/// use drive_command::{Direction, DriveCommand, RingGeometry};
///
/// let ring = RingGeometry::new(320.0, 240.0, 60.0, 200.0);
///
/// // Wrist 130 px to the right of center: inside the annulus, angle 0°.
/// let cmd = ring.classify(Some((450.0, 240.0)));
/// assert_eq!(cmd.direction(), Direction::Right);
/// assert_eq!(cmd.speed(), 4);
///
/// // No wrist this frame: all stop, never a stale vector.
/// assert_eq!(ring.classify(None), DriveCommand::STOP);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingGeometry {
    pub center_x:     f32,
    pub center_y:     f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl RingGeometry {
    /// Ring at an explicit center. `inner_radius` must be non-negative and
    /// strictly smaller than `outer_radius`.
    pub fn new(center_x: f32, center_y: f32, inner_radius: f32, outer_radius: f32) -> Self {
        assert!(inner_radius >= 0.0, "inner_radius must be non-negative");
        assert!(
            inner_radius < outer_radius,
            "inner_radius must be smaller than outer_radius"
        );
        RingGeometry { center_x, center_y, inner_radius, outer_radius }
    }

    /// Ring centered in a `width` × `height` frame.
    pub fn centered_in(width: u32, height: u32, inner_radius: f32, outer_radius: f32) -> Self {
        RingGeometry::new(
            (width / 2) as f32,
            (height / 2) as f32,
            inner_radius,
            outer_radius,
        )
    }

    /// Euclidean distance from the ring center to `point`.
    pub fn distance(&self, point: (f32, f32)) -> f32 {
        let dx = point.0 - self.center_x;
        let dy = point.1 - self.center_y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when `point` is inside the active annulus
    /// (`inner_radius < d <= outer_radius`).
    pub fn contains(&self, point: (f32, f32)) -> bool {
        let d = self.distance(point);
        d > self.inner_radius && d <= self.outer_radius
    }

    /// Speed digit for a wrist at distance `d` from center:
    /// `floor((d - inner) / (outer - inner) × 9)`, clamped to `0..=9`.
    /// `d` at the outer edge is exactly 9; just past the inner edge is 0.
    pub fn speed_at(&self, d: f32) -> u8 {
        let span = self.outer_radius - self.inner_radius;
        let ratio = ((d - self.inner_radius) / span).clamp(0.0, 1.0);
        ((ratio * 9.0) as u8).min(9)
    }

    /// Classify an optional wrist position into a command.
    ///
    /// `None` means the tracker saw no wrist this frame and always yields
    /// [`DriveCommand::STOP`]; so does any point outside the annulus. The
    /// pixel Y axis grows downward, so the angle is taken as
    /// `atan2(-dy, dx)` to restore "up is +90°".
    pub fn classify(&self, wrist: Option<(f32, f32)>) -> DriveCommand {
        let Some((x, y)) = wrist else {
            return DriveCommand::STOP;
        };

        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let d = (dx * dx + dy * dy).sqrt();
        if d <= self.inner_radius || d > self.outer_radius {
            return DriveCommand::STOP;
        }

        let angle = (-dy).atan2(dx).to_degrees();
        DriveCommand::new(cone_direction(angle), self.speed_at(d))
    }
}

/// Map a polar angle in degrees (from `atan2`, so in (-180, 180]) onto the
/// four cardinal cones.
fn cone_direction(angle: f32) -> Direction {
    if (-45.0..45.0).contains(&angle) {
        Direction::Right
    } else if (45.0..135.0).contains(&angle) {
        Direction::Forward
    } else if (-135.0..-45.0).contains(&angle) {
        Direction::Backward
    } else {
        // [135, 180] and [-180, -135)
        Direction::Left
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── Direction codes ──────────────────────────────────────────────────
    #[test]
    fn direction_codes_round_trip() {
        for dir in [
            Direction::Forward,
            Direction::Backward,
            Direction::Left,
            Direction::Right,
            Direction::Stop,
        ] {
            assert_eq!(Direction::from_code(dir.code()), Some(dir));
        }
    }

    #[test]
    fn unknown_code_rejected() {
        assert_eq!(Direction::from_code('X'), None);
        assert_eq!(Direction::from_code('f'), None); // case-sensitive
    }

    // ── DriveCommand invariants ──────────────────────────────────────────
    #[test]
    fn new_clamps_speed() {
        assert_eq!(DriveCommand::new(Direction::Forward, 200).speed(), 9);
        assert_eq!(DriveCommand::new(Direction::Left, 9).speed(), 9);
    }

    #[test]
    fn stop_forces_speed_zero() {
        assert_eq!(DriveCommand::new(Direction::Stop, 7), DriveCommand::STOP);
    }

    #[test]
    fn moving_direction_may_carry_speed_zero() {
        let crawl = DriveCommand::new(Direction::Right, 0);
        assert_eq!(crawl.speed(), 0);
        assert!(!crawl.is_stop());
        assert_eq!(crawl.wire_line(), "R0\n");
    }

    #[test]
    fn default_is_stop() {
        assert_eq!(DriveCommand::default(), DriveCommand::STOP);
    }

    // ── Wire codec ───────────────────────────────────────────────────────
    #[test]
    fn wire_line_format() {
        assert_eq!(DriveCommand::new(Direction::Forward, 7).wire_line(), "F7\n");
        assert_eq!(DriveCommand::STOP.wire_line(), "S0\n");
    }

    #[test]
    fn display_is_payload_only() {
        assert_eq!(DriveCommand::new(Direction::Backward, 3).to_string(), "B3");
    }

    #[test]
    fn parse_accepts_bare_and_terminated_lines() {
        let want = DriveCommand::new(Direction::Left, 5);
        assert_eq!(DriveCommand::parse_line("L5").unwrap(), want);
        assert_eq!(DriveCommand::parse_line("L5\n").unwrap(), want);
        assert_eq!(DriveCommand::parse_line("L5\r\n").unwrap(), want);
    }

    #[test]
    fn parse_round_trips_every_command() {
        for dir in [
            Direction::Forward,
            Direction::Backward,
            Direction::Left,
            Direction::Right,
        ] {
            for speed in 0..=9u8 {
                let cmd = DriveCommand::new(dir, speed);
                assert_eq!(DriveCommand::parse_line(&cmd.wire_line()).unwrap(), cmd);
            }
        }
        let stop = DriveCommand::STOP;
        assert_eq!(DriveCommand::parse_line(&stop.wire_line()).unwrap(), stop);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert_eq!(DriveCommand::parse_line(""), Err(ParseError::Empty));
        assert_eq!(DriveCommand::parse_line("\n"), Err(ParseError::Empty));
        assert_eq!(DriveCommand::parse_line("X5"), Err(ParseError::Direction('X')));
        assert_eq!(DriveCommand::parse_line("F"), Err(ParseError::MissingSpeed));
        assert_eq!(DriveCommand::parse_line("Fq"), Err(ParseError::Speed('q')));
        assert_eq!(
            DriveCommand::parse_line("F12"),
            Err(ParseError::Trailing("2".to_string()))
        );
        assert_eq!(DriveCommand::parse_line("S5"), Err(ParseError::StopSpeed(5)));
    }

    // ── Stick classifier ─────────────────────────────────────────────────
    #[test]
    fn centered_stick_is_stop() {
        assert_eq!(classify_axes(0.0, 0.0), DriveCommand::STOP);
        assert_eq!(classify_axes(0.3, -0.4), DriveCommand::STOP);
        assert_eq!(classify_axes(-0.49, 0.49), DriveCommand::STOP);
    }

    #[test]
    fn threshold_is_strict() {
        // Exactly ±0.5 on both axes still sits in the dead zone.
        assert_eq!(classify_axes(0.5, 0.5), DriveCommand::STOP);
        assert_eq!(classify_axes(-0.5, -0.5), DriveCommand::STOP);
    }

    #[test]
    fn forward_example() {
        // Stick mostly up with a little drift: F7.
        let cmd = classify_axes(0.1, -0.8);
        assert_eq!(cmd.direction(), Direction::Forward);
        assert_eq!(cmd.speed(), 7); // floor(0.8 × 9) = 7
    }

    #[test]
    fn four_quadrants() {
        assert_eq!(classify_axes(0.0, -0.9).direction(), Direction::Forward);
        assert_eq!(classify_axes(0.0, 0.9).direction(), Direction::Backward);
        assert_eq!(classify_axes(-0.9, 0.0).direction(), Direction::Left);
        assert_eq!(classify_axes(0.9, 0.0).direction(), Direction::Right);
    }

    #[test]
    fn vertical_axis_wins_corners() {
        // Stick jammed into a corner: the vertical check fires first.
        let cmd = classify_axes(0.9, -0.9);
        assert_eq!(cmd.direction(), Direction::Forward);
        assert_eq!(cmd.speed(), 8); // from axis_y, floor(0.9 × 9) = 8
        assert_eq!(classify_axes(-1.0, 1.0).direction(), Direction::Backward);
    }

    #[test]
    fn full_deflection_is_nine() {
        assert_eq!(classify_axes(0.0, -1.0).speed(), 9);
        assert_eq!(classify_axes(1.0, 0.0).speed(), 9);
        // Drivers that overshoot ±1.0 stay clamped.
        assert_eq!(classify_axes(0.0, 1.2).speed(), 9);
    }

    #[test]
    fn speed_truncates_toward_zero() {
        assert_eq!(classify_axes(0.0, -0.6).speed(), 5); // 5.4 → 5
        assert_eq!(classify_axes(0.7, 0.0).speed(), 6);  // 6.3 → 6
    }

    // ── Ring classifier ──────────────────────────────────────────────────
    fn ring() -> RingGeometry {
        RingGeometry::new(320.0, 240.0, 60.0, 200.0)
    }

    /// Point at `deg` degrees and distance `d` from the ring center, in
    /// pixel coordinates (Y grows downward).
    fn at_angle(r: &RingGeometry, deg: f32, d: f32) -> (f32, f32) {
        let rad = deg.to_radians();
        (r.center_x + d * rad.cos(), r.center_y - d * rad.sin())
    }

    #[test]
    fn no_detection_is_stop() {
        assert_eq!(ring().classify(None), DriveCommand::STOP);
    }

    #[test]
    fn dead_zone_inside_inner_ring() {
        let r = ring();
        assert_eq!(r.classify(Some((r.center_x, r.center_y))), DriveCommand::STOP);
        assert_eq!(r.classify(Some(at_angle(&r, 0.0, 59.0))), DriveCommand::STOP);
        // The inner boundary itself does not move the car.
        assert_eq!(r.classify(Some(at_angle(&r, 0.0, 60.0))), DriveCommand::STOP);
    }

    #[test]
    fn outside_outer_ring_is_stop() {
        let r = ring();
        assert_eq!(r.classify(Some(at_angle(&r, 90.0, 201.0))), DriveCommand::STOP);
        assert_eq!(r.classify(Some((0.0, 0.0))), DriveCommand::STOP);
    }

    #[test]
    fn outer_boundary_is_full_throttle() {
        let r = ring();
        let cmd = r.classify(Some((r.center_x + 200.0, r.center_y)));
        assert_eq!(cmd.direction(), Direction::Right);
        assert_eq!(cmd.speed(), 9);
    }

    #[test]
    fn cardinal_points() {
        let r = ring();
        let d = 130.0;
        // Pixel coordinates: up on screen is smaller y.
        assert_eq!(
            r.classify(Some((r.center_x, r.center_y - d))).direction(),
            Direction::Forward
        );
        assert_eq!(
            r.classify(Some((r.center_x, r.center_y + d))).direction(),
            Direction::Backward
        );
        assert_eq!(
            r.classify(Some((r.center_x - d, r.center_y))).direction(),
            Direction::Left
        );
        assert_eq!(
            r.classify(Some((r.center_x + d, r.center_y))).direction(),
            Direction::Right
        );
    }

    #[test]
    fn ring_example_right_four() {
        // Wrist at distance 130, angle 10°: R with speed floor(70/140 × 9) = 4.
        let r = ring();
        let cmd = r.classify(Some(at_angle(&r, 10.0, 130.0)));
        assert_eq!(cmd.direction(), Direction::Right);
        assert_eq!(cmd.speed(), 4);
    }

    #[test]
    fn cone_boundaries_exact() {
        // Boundary membership tested on the cone function directly, with
        // exact degree values that float noise cannot shift.
        assert_eq!(cone_direction(0.0), Direction::Right);
        assert_eq!(cone_direction(-45.0), Direction::Right);
        assert_eq!(cone_direction(45.0), Direction::Forward);
        assert_eq!(cone_direction(90.0), Direction::Forward);
        assert_eq!(cone_direction(135.0), Direction::Left);
        assert_eq!(cone_direction(180.0), Direction::Left);
        assert_eq!(cone_direction(-180.0), Direction::Left);
        assert_eq!(cone_direction(-135.0), Direction::Backward);
        assert_eq!(cone_direction(-90.0), Direction::Backward);
    }

    #[test]
    fn cone_boundaries_through_classify() {
        // Near-boundary angles with a safe margin survive the atan2 round
        // trip.
        let r = ring();
        let d = 150.0;
        assert_eq!(r.classify(Some(at_angle(&r, 44.0, d))).direction(), Direction::Right);
        assert_eq!(r.classify(Some(at_angle(&r, 46.0, d))).direction(), Direction::Forward);
        assert_eq!(r.classify(Some(at_angle(&r, 134.0, d))).direction(), Direction::Forward);
        assert_eq!(r.classify(Some(at_angle(&r, 136.0, d))).direction(), Direction::Left);
        assert_eq!(r.classify(Some(at_angle(&r, -44.0, d))).direction(), Direction::Right);
        assert_eq!(r.classify(Some(at_angle(&r, -46.0, d))).direction(), Direction::Backward);
        assert_eq!(r.classify(Some(at_angle(&r, -134.0, d))).direction(), Direction::Backward);
        assert_eq!(r.classify(Some(at_angle(&r, -136.0, d))).direction(), Direction::Left);
    }

    #[test]
    fn crawl_band_just_past_inner_ring() {
        // Inside the annulus but barely: direction holds, speed floors to 0.
        let r = ring();
        let cmd = r.classify(Some(at_angle(&r, 0.0, 61.0)));
        assert_eq!(cmd.direction(), Direction::Right);
        assert_eq!(cmd.speed(), 0);
    }

    #[test]
    fn speed_monotone_across_annulus() {
        let r = ring();
        let mut last = 0;
        for d in [61.0, 80.0, 110.0, 140.0, 170.0, 200.0] {
            let s = r.speed_at(d);
            assert!(s >= last, "speed must not decrease outward");
            assert!(s <= 9);
            last = s;
        }
        assert_eq!(last, 9);
    }

    #[test]
    fn contains_matches_classify() {
        let r = ring();
        let inside = at_angle(&r, 30.0, 130.0);
        let outside = at_angle(&r, 30.0, 230.0);
        assert!(r.contains(inside));
        assert!(!r.contains(outside));
        assert!(!r.classify(Some(inside)).is_stop());
        assert!(r.classify(Some(outside)).is_stop());
    }

    #[test]
    fn centered_in_uses_frame_midpoint() {
        let r = RingGeometry::centered_in(640, 480, 60.0, 200.0);
        assert_eq!(r.center_x, 320.0);
        assert_eq!(r.center_y, 240.0);
    }

    #[test]
    #[should_panic(expected = "inner_radius must be smaller")]
    fn degenerate_ring_rejected() {
        RingGeometry::new(0.0, 0.0, 200.0, 200.0);
    }
}
