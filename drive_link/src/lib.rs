//! # drive_link
//!
//! The outbound half of the teleoperation pipeline: everything between a
//! [`DriveCommand`] and the car's Bluetooth serial module.
//!
//! ```text
//! DriveCommand ──▶ CommandSink ──▶ DriveLink ──▶ "F7\n" on the wire
//!                  (de-dup +        (serial or
//!                   fail-safe)       dry-run null)
//! ```
//!
//! [`CommandSink`] owns the single piece of session state — the last
//! command actually transmitted — and the shutdown fail-safe: however the
//! session ends, an all-stop goes out before the port is released. When no
//! serial port can be opened the sink runs against [`NullLink`] and the
//! session becomes a dry run: commands are still generated, de-duplicated
//! and logged, nothing leaves the machine.

use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, trace, warn};

use drive_command::DriveCommand;

// ════════════════════════════════════════════════════════════════════════════
// LinkError
// ════════════════════════════════════════════════════════════════════════════

/// Failures on the outbound channel.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port:   String,
        source: serialport::Error,
    },
    #[error("serial write failed: {0}")]
    Io(#[from] std::io::Error),
}

// ════════════════════════════════════════════════════════════════════════════
// DriveLink — abstraction over serial / null (for dry runs and tests)
// ════════════════════════════════════════════════════════════════════════════

/// One exclusively-owned outbound byte channel.
pub trait DriveLink: Send {
    /// Write one complete wire line (payload + newline).
    fn send_line(&mut self, line: &str) -> Result<(), LinkError>;

    /// True when writes actually leave the machine.
    fn is_live(&self) -> bool;

    /// Short description for banners and the cockpit status line.
    fn describe(&self) -> String;
}

// ── serial backend ───────────────────────────────────────────────────────────

/// Time for the Bluetooth SPP module to settle after the port opens;
/// writes before that are dropped by some modules.
const SETTLE: Duration = Duration::from_secs(2);

/// A real serial port, typically `/dev/rfcomm0` or `COMn` bound to the
/// car's Bluetooth module.
pub struct SerialLink {
    port: Box<dyn serialport::SerialPort>,
    name: String,
    baud: u32,
}

impl SerialLink {
    /// Open `name` at `baud`, then wait out the module settle time.
    pub fn open(name: &str, baud: u32) -> Result<Self, LinkError> {
        let port = serialport::new(name, baud)
            .timeout(Duration::from_millis(250))
            .open()
            .map_err(|source| LinkError::Open { port: name.to_string(), source })?;
        thread::sleep(SETTLE);
        Ok(SerialLink { port, name: name.to_string(), baud })
    }
}

impl DriveLink for SerialLink {
    fn send_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.port.write_all(line.as_bytes())?;
        self.port.flush()?;
        Ok(())
    }

    fn is_live(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.name, self.baud)
    }
}

// ── null backend (dry run) ───────────────────────────────────────────────────

/// Swallows every line. Used when no port is available, so the rest of the
/// pipeline behaves exactly as it would live.
pub struct NullLink;

impl DriveLink for NullLink {
    fn send_line(&mut self, _line: &str) -> Result<(), LinkError> {
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "dry run (no serial port)".to_string()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_link — discover, prefer Bluetooth, fall back to a dry run
// ════════════════════════════════════════════════════════════════════════════

/// Open the outbound channel.
///
/// With `preferred` set, only that port is tried. Otherwise the available
/// ports are enumerated and a Bluetooth-looking one is picked (the car is a
/// Bluetooth serial module). Every failure path degrades to [`NullLink`]
/// with printed guidance rather than aborting: a teleoperation session
/// without a car is still useful for checking the camera, ring and pad
/// setup.
pub fn open_link(preferred: Option<&str>, baud: u32) -> Box<dyn DriveLink> {
    let name = match preferred {
        Some(name) => name.to_string(),
        None => match pick_port() {
            Some(name) => name,
            None => {
                eprintln!("[link] No serial ports found — dry run.");
                eprintln!("[link] To drive the car, pair its Bluetooth module first:");
                eprintln!("         • Linux: `bluetoothctl pair <addr>` then `rfcomm bind 0 <addr>`");
                eprintln!("         • Windows: pair in Settings, note the outgoing COM port");
                eprintln!("         • then pass it with --port");
                return Box::new(NullLink);
            }
        },
    };

    match SerialLink::open(&name, baud) {
        Ok(link) => {
            eprintln!("[link] Opened {} at {} baud", name, baud);
            Box::new(link)
        }
        Err(e) => {
            eprintln!("[link] {} — dry run (commands logged, not sent).", e);
            let others = port_names();
            if !others.is_empty() {
                eprintln!("[link] Ports seen: {}", others.join(", "));
            }
            Box::new(NullLink)
        }
    }
}

/// First Bluetooth-looking port, else the first port, else `None`.
fn pick_port() -> Option<String> {
    let ports = serialport::available_ports().unwrap_or_default();
    if ports.is_empty() {
        return None;
    }

    let idx = ports
        .iter()
        .position(|p| {
            matches!(p.port_type, serialport::SerialPortType::BluetoothPort) || {
                let n = p.port_name.to_lowercase();
                n.contains("rfcomm") || n.contains("bluetooth")
            }
        })
        .unwrap_or(0);

    Some(ports[idx].port_name.clone())
}

fn port_names() -> Vec<String> {
    serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.port_name)
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// CommandSink — de-duplication + fail-safe stop
// ════════════════════════════════════════════════════════════════════════════

/// Owns the link and the last-sent state for one session.
///
/// * a command identical to the last *successfully* transmitted one is
///   suppressed;
/// * a failed write leaves the last-sent state untouched, so the next tick
///   naturally tries again if the command still differs;
/// * [`CommandSink::shutdown`] (also run on drop) sends an unconditional
///   all-stop, bypassing de-duplication, then closes the sink.
pub struct CommandSink {
    link:      Box<dyn DriveLink>,
    last_sent: Option<DriveCommand>,
    closed:    bool,
}

impl CommandSink {
    pub fn new(link: Box<dyn DriveLink>) -> Self {
        CommandSink { link, last_sent: None, closed: false }
    }

    /// Offer one command for transmission. Returns true when a line was
    /// handed to the link and the last-sent state updated.
    pub fn send(&mut self, cmd: DriveCommand) -> bool {
        if self.closed {
            trace!(command = %cmd, "sink closed, dropping");
            return false;
        }
        if self.last_sent == Some(cmd) {
            trace!(command = %cmd, "duplicate suppressed");
            return false;
        }

        match self.link.send_line(&cmd.wire_line()) {
            Ok(()) => {
                if self.link.is_live() {
                    info!(command = %cmd, "sent");
                } else {
                    debug!(command = %cmd, "dry run, not sent");
                }
                self.last_sent = Some(cmd);
                true
            }
            Err(e) => {
                warn!(command = %cmd, error = %e, "transmit failed");
                false
            }
        }
    }

    /// Last command actually accepted by the link this session.
    pub fn last_sent(&self) -> Option<DriveCommand> {
        self.last_sent
    }

    pub fn is_live(&self) -> bool {
        self.link.is_live()
    }

    pub fn describe(&self) -> String {
        self.link.describe()
    }

    /// The fail-safe: force an all-stop onto the wire, regardless of what
    /// was last sent, and close the sink. Safe to call more than once;
    /// only the first call transmits.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let stop = DriveCommand::STOP;
        match self.link.send_line(&stop.wire_line()) {
            Ok(()) => info!("final stop sent"),
            Err(e) => warn!(error = %e, "final stop failed"),
        }
        self.last_sent = Some(stop);
    }
}

impl Drop for CommandSink {
    /// Covers panic and early-return paths; no car keeps driving because
    /// the program went away.
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
