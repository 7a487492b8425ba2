//! Operator input sources.
//!
//! Every source is polled synchronously from the drive loop, once per
//! tick, and hands back a [`SourceReading`]. There are two concrete
//! sources here:
//!
//! * [`GamepadSource`] — drains pending gamepad events and reports the
//!   current left-stick position.
//! * [`PoseStream`] — reads one newline-delimited JSON pose record per
//!   tick from a file or stdin, as emitted by an external detector.
//!
//! The third way to drive, simulation, needs no source of its own: the
//! cockpit window's arrow keys and mouse cursor are mapped straight to
//! readings by the drive loop.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

use gilrs::{Axis, EventType, Gilrs};
use pose_bridge::PoseFrame;
use tracing::{debug, info, warn};

// ══════════════════════════════════════════════════════════════════════════
//  SourceReading — one tick of operator input
// ══════════════════════════════════════════════════════════════════════════

/// What a source produced for the current tick.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceReading {
    /// Stick deflection in `[-1.0, 1.0]` per axis, negative y forward.
    Axes { x: f32, y: f32 },
    /// A decoded detector frame. It may contain no usable person.
    Pose(PoseFrame),
    /// A raw pointer position in window coordinates (simulation mode).
    Cursor(f32, f32),
    /// Nothing usable this tick: an undecodable record, a keep-alive
    /// blank line, or a pointer outside the window. Reads as a missed
    /// detection, so the drive loop keeps emitting and settles on stop.
    Blank,
    /// The source is finished (end of the pose stream). Ends the session.
    Exhausted,
}

// ══════════════════════════════════════════════════════════════════════════
//  GamepadSource — left analog stick via gilrs
// ══════════════════════════════════════════════════════════════════════════

/// Polls the gamepad subsystem and tracks the left stick.
///
/// gilrs reports the vertical axis with positive pointing up; the drive
/// convention is the opposite (negative y = forward), so the value is
/// negated on arrival. Axes are cached between events: a stick held
/// steady produces no events but keeps commanding the same direction.
pub struct GamepadSource {
    gilrs:   Gilrs,
    axis_x:  f32,
    axis_y:  f32,
    nagged:  bool,
}

impl GamepadSource {
    pub fn new() -> Result<Self, String> {
        let gilrs = Gilrs::new().map_err(|e| format!("gamepad subsystem: {e}"))?;
        for (_id, pad) in gilrs.gamepads() {
            info!(pad = %pad.name(), "gamepad detected");
        }
        Ok(GamepadSource { gilrs, axis_x: 0.0, axis_y: 0.0, nagged: false })
    }

    /// Drain pending events and report the current stick position.
    pub fn sample(&mut self) -> SourceReading {
        while let Some(ev) = self.gilrs.next_event() {
            match ev.event {
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.axis_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.axis_y = -v,
                EventType::Connected => {
                    info!(pad = %self.gilrs.gamepad(ev.id).name(), "gamepad connected");
                    self.nagged = false;
                }
                EventType::Disconnected => {
                    warn!("gamepad disconnected, centering stick");
                    self.axis_x = 0.0;
                    self.axis_y = 0.0;
                }
                _ => {}
            }
        }
        if self.gilrs.gamepads().count() == 0 && !self.nagged {
            warn!("no gamepad attached, commands stay at stop until one appears");
            self.nagged = true;
        }
        SourceReading::Axes { x: self.axis_x, y: self.axis_y }
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  PoseStream — newline-delimited JSON frames from a detector
// ══════════════════════════════════════════════════════════════════════════

/// Reads pose records, one JSON object per line, from a file or stdin.
///
/// The read blocks, which is what paces a live pipe: the loop runs at
/// whatever rate the detector publishes, capped by the tick delay. A
/// record that fails to decode is logged and treated as a missed
/// detection rather than ending the run.
pub struct PoseStream {
    reader: BufReader<Box<dyn Read + Send>>,
    label:  String,
    line:   String,
}

impl PoseStream {
    /// `-` selects stdin, anything else is opened as a file.
    pub fn open(path: &str) -> Result<Self, String> {
        let (reader, label): (Box<dyn Read + Send>, String) = if path == "-" {
            (Box::new(io::stdin()), "stdin".to_string())
        } else {
            let file = File::open(path).map_err(|e| format!("pose stream {path}: {e}"))?;
            (Box::new(file), path.to_string())
        };
        Ok(Self::from_reader(reader, label))
    }

    pub fn from_reader(reader: Box<dyn Read + Send>, label: String) -> Self {
        PoseStream { reader: BufReader::new(reader), label, line: String::new() }
    }

    /// Where the frames come from, for banners and logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Pull the next record. Blocks until a line arrives or the stream ends.
    pub fn sample(&mut self) -> SourceReading {
        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => SourceReading::Exhausted,
            Ok(_) => {
                let record = self.line.trim();
                if record.is_empty() {
                    debug!(stream = %self.label, "blank line in pose stream");
                    return SourceReading::Blank;
                }
                match PoseFrame::from_json_line(record) {
                    Ok(frame) => SourceReading::Pose(frame),
                    Err(e) => {
                        warn!(stream = %self.label, error = %e, "undecodable pose record, reading as missed detection");
                        SourceReading::Blank
                    }
                }
            }
            Err(e) => {
                warn!(stream = %self.label, error = %e, "pose stream read failed, ending");
                SourceReading::Exhausted
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
//  Tests
// ══════════════════════════════════════════════════════════════════════════
