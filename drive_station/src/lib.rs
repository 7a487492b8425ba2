//! # drive_station
//!
//! Operator station for a Bluetooth-serial RC car. Each tick it polls one
//! input source, classifies the reading into a single-letter drive command,
//! and streams the command over the serial link, deduplicated against the
//! last one that actually went out. A stop is always sent on the way out.
//!
//! ## Mode → steering mapping
//!
//! | Mode | Input | Classification |
//! |---|---|---|
//! | `pad` | Gamepad left stick | Dominant axis past ±0.5, speed ∝ deflection |
//! | `pose` | Wrist keypoint from an external detector | Angle cone + distance rings |
//! | `sim` | Mouse and arrow keys in the cockpit | Mouse as wrist, arrows as stick |
//!
//! ## Cockpit
//!
//! A software-rendered window shows the steering geometry (threshold box in
//! pad mode, dead-zone and go-zone rings otherwise), the detected skeleton,
//! the live marker, and the last command on the wire. Pose and sim runs
//! always open it; pad runs only with `--cockpit`.
//!
//! ### Cockpit keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `Arrows` / hold | Drive (sim mode; softer with Shift) |
//! | `M` | Toggle mirror view (pose mode) |
//! | `Q` / `Escape` | Quit, stopping the car |

pub mod sources;
pub mod cockpit;
pub mod app;
