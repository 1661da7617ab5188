//! Actuator Link Module
//!
//! Outbound side of the tracker: forwards position commands to the
//! pan/tilt hardware as newline-terminated `X:<int> Y:<int>` text.

pub mod tcp;

pub use tcp::{StreamActuatorSink, TcpActuatorSink};

use crate::error::Result;
use crate::servo_controller::ActuatorCommand;
use async_trait::async_trait;

/// Capability: accepts actuator commands
#[async_trait]
pub trait ActuatorSink: Send {
    /// Deliver one command. An error means the link is gone.
    async fn send(&mut self, command: &ActuatorCommand) -> Result<()>;
}

/// Wire encoding of one command, newline included
pub fn encode_command(command: &ActuatorCommand) -> String {
    format!("{}\n", command)
}
