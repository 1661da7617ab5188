//! Per-axis PID with deadzone anti-windup

use std::time::{Duration, Instant};

/// Proportional / integral / derivative gains
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Mutable history of one axis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisState {
    pub integral: f64,
    pub previous_error: f64,
    /// Unset until the first update
    pub last_update: Option<Instant>,
}

/// Stateful PID evaluator for a single control axis
#[derive(Debug, Clone)]
pub struct AxisPid {
    gains: PidGains,
    /// Errors with magnitude strictly below this are treated as zero
    deadzone: f64,
    state: AxisState,
}

impl AxisPid {
    pub fn new(gains: PidGains, deadzone: f64) -> Self {
        Self {
            gains,
            deadzone,
            state: AxisState::default(),
        }
    }

    /// Evaluate one step for `error` (setpoint - measurement) observed at `now`.
    ///
    /// The first call, and any call whose `now` is not after the previous
    /// one, has `dt = 0`: only the proportional term is produced and
    /// nothing accumulates.
    pub fn update(&mut self, error: f64, now: Instant) -> f64 {
        let dt = self
            .state
            .last_update
            .and_then(|last| now.checked_duration_since(last))
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();

        let error = if error.abs() < self.deadzone {
            self.reset_integral();
            0.0
        } else {
            error
        };

        let mut output = self.gains.kp * error;
        if dt > 0.0 {
            self.state.integral += error * dt;
            let derivative = (error - self.state.previous_error) / dt;
            output += self.gains.ki * self.state.integral + self.gains.kd * derivative;
        }

        // Stored even when the deadzone zeroed the error
        self.state.previous_error = error;
        self.state.last_update = Some(now);

        output
    }

    /// Drop the accumulated integral, keeping derivative and timing history
    pub fn reset_integral(&mut self) {
        self.state.integral = 0.0;
    }

    /// Forget all history; the next update behaves like the first one
    pub fn reset(&mut self) {
        self.state = AxisState::default();
    }

    pub fn state(&self) -> &AxisState {
        &self.state
    }
}
