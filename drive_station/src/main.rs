//! drive_station — interactive entry point.

use std::io::{self, Write};
use std::time::Duration;

use clap::{Parser, Subcommand};
use drive_station::app::{run, AppConfig, Mode};
use pose_bridge::WristSide;

#[derive(Parser)]
#[clap(name = "drive_station", version)]
#[clap(about = "Teleoperation station for a Bluetooth RC car")]
struct Opts {
    /// Steering mode; omit it for interactive setup
    #[clap(subcommand)]
    mode: Option<ModeCmd>,
}

#[derive(Subcommand)]
enum ModeCmd {
    /// Drive with a gamepad's left analog stick
    Pad {
        /// Serial port name (default: auto-discover)
        #[clap(long)]
        port: Option<String>,
        /// Serial baud rate
        #[clap(long, default_value_t = 9600)]
        baud: u32,
        /// Open the cockpit window for visual feedback
        #[clap(long)]
        cockpit: bool,
        /// Milliseconds between command ticks
        #[clap(long, default_value_t = 50)]
        tick_ms: u64,
    },

    /// Drive with a wrist tracked by an external pose detector
    Pose {
        /// Frame source: a file of JSON records, one per line, or `-` for stdin
        #[clap(long, default_value = "-")]
        frames: String,
        /// Serial port name (default: auto-discover)
        #[clap(long)]
        port: Option<String>,
        /// Serial baud rate
        #[clap(long, default_value_t = 9600)]
        baud: u32,
        /// Dead-zone radius in pixels
        #[clap(long, default_value_t = 60.0)]
        inner_radius: f32,
        /// Go-zone outer radius in pixels
        #[clap(long, default_value_t = 200.0)]
        outer_radius: f32,
        /// Which wrist steers: left or right
        #[clap(long, default_value = "left")]
        wrist: String,
        /// Keypoints below this confidence read as not detected
        #[clap(long, default_value_t = 0.25)]
        min_confidence: f32,
        /// Classify frames as the camera sees them instead of mirrored
        #[clap(long)]
        no_mirror: bool,
        /// Milliseconds between command ticks
        #[clap(long, default_value_t = 50)]
        tick_ms: u64,
    },

    /// Drive with the mouse and arrow keys in the cockpit (no hardware)
    Sim {
        /// Serial port name (default: auto-discover)
        #[clap(long)]
        port: Option<String>,
        /// Serial baud rate
        #[clap(long, default_value_t = 9600)]
        baud: u32,
        /// Dead-zone radius in pixels
        #[clap(long, default_value_t = 60.0)]
        inner_radius: f32,
        /// Go-zone outer radius in pixels
        #[clap(long, default_value_t = 200.0)]
        outer_radius: f32,
        /// Milliseconds between command ticks
        #[clap(long, default_value_t = 50)]
        tick_ms: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Drive Station — Bluetooth RC Car Teleoperation        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let opts = Opts::parse();
    let cfg = match opts.mode {
        Some(cmd) => config_from(cmd),
        None => Ok(configure_interactively()),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    println!();
    println!("  Starting. Ctrl-C always stops the car.");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn config_from(cmd: ModeCmd) -> Result<AppConfig, String> {
    match cmd {
        ModeCmd::Pad { port, baud, cockpit, tick_ms } => Ok(AppConfig {
            mode: Mode::Pad,
            port,
            baud,
            cockpit,
            tick: Duration::from_millis(tick_ms),
            ..AppConfig::default()
        }),
        ModeCmd::Pose {
            frames,
            port,
            baud,
            inner_radius,
            outer_radius,
            wrist,
            min_confidence,
            no_mirror,
            tick_ms,
        } => Ok(AppConfig {
            mode: Mode::Pose { frames },
            port,
            baud,
            inner_radius,
            outer_radius,
            wrist: parse_wrist(&wrist)?,
            min_confidence,
            mirror: !no_mirror,
            tick: Duration::from_millis(tick_ms),
            ..AppConfig::default()
        }),
        ModeCmd::Sim { port, baud, inner_radius, outer_radius, tick_ms } => Ok(AppConfig {
            mode: Mode::Sim,
            port,
            baud,
            inner_radius,
            outer_radius,
            tick: Duration::from_millis(tick_ms),
            ..AppConfig::default()
        }),
    }
}

fn parse_wrist(s: &str) -> Result<WristSide, String> {
    match s.to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(WristSide::Left),
        "right" | "r" => Ok(WristSide::Right),
        other => Err(format!("wrist must be 'left' or 'right', not '{other}'")),
    }
}

fn configure_interactively() -> AppConfig {
    println!("  Mode:");
    println!("    1. sim  — mouse and arrow keys in the cockpit window");
    println!("    2. pad  — gamepad left stick");
    println!("    3. pose — wrist frames from a detector on stdin");
    let mode = match read_line("  Choice (1-3, default 1): ").trim() {
        "2" => Mode::Pad,
        "3" => Mode::Pose { frames: "-".to_string() },
        _   => Mode::Sim,
    };

    let port = {
        let p = read_line("  Serial port (blank = auto-discover): ").trim().to_string();
        if p.is_empty() { None } else { Some(p) }
    };
    let baud: u32 = read_line("  Baud (default 9600): ").trim().parse().unwrap_or(9600);

    let mut cfg = AppConfig { mode, port, baud, ..AppConfig::default() };

    if let Mode::Pose { .. } = cfg.mode {
        cfg.wrist = match read_line("  Wrist (l/r, default l): ").trim() {
            "r" | "R" | "right" => WristSide::Right,
            _ => WristSide::Left,
        };
        let inner: f32 = read_line("  Dead-zone radius px (default 60): ")
            .trim().parse().unwrap_or(60.0);
        let outer: f32 = read_line("  Go-zone radius px (default 200): ")
            .trim().parse().unwrap_or(200.0);
        if inner >= 0.0 && inner < outer {
            cfg.inner_radius = inner;
            cfg.outer_radius = outer;
        } else {
            println!("  ⚠  Need 0 <= inner < outer; keeping 60/200.");
        }
    }
    if cfg.mode == Mode::Pad {
        cfg.cockpit = read_line("  Cockpit window (y/N): ").trim().eq_ignore_ascii_case("y");
    }

    cfg
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
