//! Mode Arbiter
//!
//! Decides once per detection batch whether the system tracks or sweeps,
//! and owns every piece of control state: both PIDs (via the tracking
//! controller), the sweep direction, the actuator position and the time of
//! the last accepted detection.
//!
//! ## Transitions
//! - non-empty batch -> Tracking, even if every box is skipped as malformed
//! - empty batch, last detection older than the timeout -> Scanning
//! - empty batch inside the timeout -> hold (no output, mode unchanged)

use super::scan::ScanSweeper;
use super::tracking::TrackingController;
use super::types::{ActuatorCommand, BoundingBox, ControllerMode, CycleOutcome};
use crate::config::AppConfig;
use std::time::{Duration, Instant};

/// Tracking / scanning state machine
#[derive(Debug, Clone)]
pub struct ModeArbiter {
    tracking: TrackingController,
    sweeper: ScanSweeper,
    /// The one authoritative actuator position
    position: ActuatorCommand,
    mode: ControllerMode,
    /// Unset until the first non-empty batch
    last_detection_at: Option<Instant>,
    timeout: Duration,
}

impl ModeArbiter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            tracking: TrackingController::new(config),
            sweeper: ScanSweeper::new(config.scan_step, config.x_axis.range),
            position: ActuatorCommand::new(config.x_axis.start, config.y_axis.start),
            mode: ControllerMode::Scanning,
            last_detection_at: None,
            timeout: config.detection_timeout,
        }
    }

    /// Process one frame's detections observed at `now`
    pub fn on_batch(&mut self, boxes: &[BoundingBox], now: Instant) -> CycleOutcome {
        if !boxes.is_empty() {
            self.last_detection_at = Some(now);
            self.transition(ControllerMode::Tracking);
            let commands = self.tracking.on_detections(boxes, &mut self.position, now);
            if commands.len() < boxes.len() {
                tracing::warn!(
                    boxes = boxes.len(),
                    accepted = commands.len(),
                    "Malformed detections skipped"
                );
            }
            return CycleOutcome::Tracked(commands);
        }

        if self.is_stale(now) {
            self.transition(ControllerMode::Scanning);
            let command = self.sweeper.step(&mut self.position);
            tracing::debug!(command = %command, direction = ?self.sweeper.direction(), "Scan step");
            CycleOutcome::Scanned(command)
        } else {
            CycleOutcome::Held
        }
    }

    /// Whether the last detection is older than the timeout
    pub fn is_stale(&self, now: Instant) -> bool {
        match self.last_detection_at {
            Some(last) => now.saturating_duration_since(last) > self.timeout,
            None => true,
        }
    }

    fn transition(&mut self, next: ControllerMode) {
        match (self.mode, next) {
            (ControllerMode::Scanning, ControllerMode::Tracking) => {
                tracing::info!(position = %self.position, "Target acquired, tracking");
            }
            (ControllerMode::Tracking, ControllerMode::Scanning) => {
                tracing::info!(
                    position = %self.position,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Target lost, sweeping"
                );
            }
            _ => {}
        }
        self.mode = next;
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn position(&self) -> ActuatorCommand {
        self.position
    }

    pub fn last_detection_at(&self) -> Option<Instant> {
        self.last_detection_at
    }

    pub fn sweeper(&self) -> &ScanSweeper {
        &self.sweeper
    }
}
