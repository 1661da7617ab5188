//! Servo Tracker Library
//!
//! Closed-loop visual servoing for a two-axis pan/tilt mount: object
//! detections in, bounded actuator position commands out, with an
//! autonomous sweep when the target is lost.
//!
//! ## Architecture (4 Components)
//!
//! 1. ServoController - control core (PID, geometry, tracking, sweep, mode arbitration)
//! 2. DetectionFeed - inbound detection batches (WebSocket / channel)
//! 3. ActuatorLink - outbound `X:<int> Y:<int>` commands (TCP)
//! 4. ControlLoop - single serialization point between feed and actuator
//!
//! ## Design Principles
//!
//! - The control core does no I/O and takes time as an argument
//! - One owner (ModeArbiter) for all control state
//! - Transport loss is fatal; bad data only costs the offending message or box

pub mod actuator_link;
pub mod config;
pub mod control_loop;
pub mod detection_feed;
pub mod error;
pub mod servo_controller;

pub use config::AppConfig;
pub use error::{Error, Result};
