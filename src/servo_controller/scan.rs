//! Autonomous x-axis sweep used while no target is tracked

use super::types::{ActuatorCommand, AxisRange, ScanDirection};

/// Back-and-forth sweep generator
///
/// The sweep position is the shared actuator x position; only the
/// direction is owned here.
#[derive(Debug, Clone)]
pub struct ScanSweeper {
    direction: ScanDirection,
    step_size: f64,
    range: AxisRange,
}

impl ScanSweeper {
    pub fn new(step_size: f64, range: AxisRange) -> Self {
        Self {
            direction: ScanDirection::Forward,
            step_size,
            range,
        }
    }

    /// Advance x by one step, bouncing at either bound. Y is held.
    pub fn step(&mut self, position: &mut ActuatorCommand) -> ActuatorCommand {
        let next = position.x_position + self.direction.sign() * self.step_size;

        position.x_position = if next >= self.range.max {
            self.direction = ScanDirection::Backward;
            self.range.max
        } else if next <= self.range.min {
            self.direction = ScanDirection::Forward;
            self.range.min
        } else {
            next
        };

        *position
    }

    pub fn direction(&self) -> ScanDirection {
        self.direction
    }
}
