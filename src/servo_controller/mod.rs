//! Servo Controller Module
//!
//! Control core of the pan/tilt tracker. Pure state and arithmetic, no I/O:
//! detections in, bounded actuator commands out.

pub mod arbiter;
pub mod geometry;
pub mod pid;
pub mod scan;
pub mod tracking;
pub mod types;

pub use arbiter::ModeArbiter;
pub use geometry::{bounding_box_to_target, setpoint};
pub use pid::{AxisPid, AxisState, PidGains};
pub use scan::ScanSweeper;
pub use tracking::TrackingController;
pub use types::*;
