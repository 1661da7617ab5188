//! Tracking controller
//!
//! Drives the actuator toward centering each detection: geometry, one PID
//! per axis, position update and clamping.

use super::geometry::{bounding_box_to_target, setpoint};
use super::pid::AxisPid;
use super::types::{ActuatorCommand, AxisRange, BoundingBox, ImageSize, TargetPoint};
use crate::config::{AppConfig, AxisConfig};
use std::time::Instant;

/// Output-to-actuator mapping for one axis
#[derive(Debug, Clone)]
struct AxisDrive {
    pid: AxisPid,
    range: AxisRange,
    output_gain: f64,
}

impl AxisDrive {
    fn from_config(axis: &AxisConfig) -> Self {
        Self {
            pid: AxisPid::new(axis.gains, axis.deadzone),
            range: axis.range,
            output_gain: axis.output_gain,
        }
    }

    /// New position after correcting for `error`
    ///
    /// The PID output is a correction toward the setpoint, so it is
    /// subtracted from the current position. A non-finite result keeps
    /// `position` and clears the PID history it came from.
    fn drive(&mut self, position: f64, error: f64, now: Instant) -> f64 {
        let output = self.pid.update(error, now);
        let next = position - output * self.output_gain;
        if next.is_finite() {
            return next;
        }

        tracing::warn!(error, output, position, "PID output overflowed, holding axis");
        self.pid.reset();
        position
    }
}

/// Closed-loop tracking of detection centers
#[derive(Debug, Clone)]
pub struct TrackingController {
    x: AxisDrive,
    y: AxisDrive,
    image: ImageSize,
    flip_vertical: bool,
    setpoint: TargetPoint,
}

impl TrackingController {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            x: AxisDrive::from_config(&config.x_axis),
            y: AxisDrive::from_config(&config.y_axis),
            image: config.image,
            flip_vertical: config.flip_vertical,
            setpoint: setpoint(config.image, config.flip_vertical),
        }
    }

    /// Run one tracking step per box, in order, against the shared `position`.
    ///
    /// Returns one clamped command per accepted box. Malformed boxes are
    /// skipped and do not touch any state.
    pub fn on_detections(
        &mut self,
        boxes: &[BoundingBox],
        position: &mut ActuatorCommand,
        now: Instant,
    ) -> Vec<ActuatorCommand> {
        let image_height = self.image.height as f64;
        let mut commands = Vec::with_capacity(boxes.len());

        for bb in boxes {
            let target = match bounding_box_to_target(bb, image_height, self.flip_vertical) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!(error = %e, ?bb, "Skipping malformed detection");
                    continue;
                }
            };

            let error_x = self.setpoint.x - target.x;
            let error_y = self.setpoint.y - target.y;

            position.x_position = self.x.drive(position.x_position, error_x, now);
            position.y_position = self.y.drive(position.y_position, error_y, now);
            position.clamp_to(&self.x.range, &self.y.range);

            tracing::debug!(
                target_x = target.x,
                target_y = target.y,
                error_x,
                error_y,
                command = %position,
                "Tracking step"
            );

            commands.push(*position);
        }

        commands
    }

    pub fn x_pid(&self) -> &AxisPid {
        &self.x.pid
    }

    pub fn y_pid(&self) -> &AxisPid {
        &self.y.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn start_position(config: &AppConfig) -> ActuatorCommand {
        ActuatorCommand::new(config.x_axis.start, config.y_axis.start)
    }

    #[test]
    fn test_centered_detection_holds_position() {
        let config = AppConfig::default();
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);

        // center (48, 48) with or without flip for a 96-high image
        let bb = BoundingBox::new(38.0, 38.0, 20.0, 20.0);
        let commands = controller.on_detections(&[bb], &mut position, Instant::now());

        assert_eq!(commands, vec![ActuatorCommand::new(650.0, 900.0)]);
        assert_eq!(controller.x_pid().state().integral, 0.0);
        assert_eq!(controller.y_pid().state().integral, 0.0);
    }

    #[test]
    fn test_offset_detection_moves_against_output() {
        let mut config = AppConfig::default();
        config.flip_vertical = false;
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);

        // center (18, 48): error_x = 30, Kp 0.5 -> output 15, gain 0.3 -> -4.5
        let bb = BoundingBox::new(8.0, 38.0, 20.0, 20.0);
        let commands = controller.on_detections(&[bb], &mut position, Instant::now());

        assert_eq!(commands.len(), 1);
        assert!((commands[0].x_position - 645.5).abs() < 1e-9);
        assert_eq!(commands[0].y_position, 900.0);
        assert_eq!(position, commands[0]);
    }

    #[test]
    fn test_commands_stay_in_range_for_pathological_targets() {
        let config = AppConfig::default();
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);
        let t0 = Instant::now();

        let boxes = [
            BoundingBox::new(-1.0e7, -1.0e7, 10.0, 10.0),
            BoundingBox::new(1.0e7, 1.0e7, 10.0, 10.0),
            BoundingBox::new(0.0, 5.0e6, 1.0e6, 3.0),
        ];
        for i in 0..50u64 {
            let now = t0 + Duration::from_millis(i * 33);
            for command in controller.on_detections(&boxes, &mut position, now) {
                assert!(config.x_axis.range.contains(command.x_position));
                assert!(config.y_axis.range.contains(command.y_position));
            }
        }
    }

    #[test]
    fn test_extreme_centers_never_produce_non_finite_positions() {
        let config = AppConfig::default();
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);
        let t0 = Instant::now();

        // Finite centers whose errors alternate sign: the derivative overflows
        let boxes = [
            BoundingBox::new(1.7e308, 0.0, 0.0, 0.0),
            BoundingBox::new(-1.7e308, 0.0, 0.0, 0.0),
        ];
        for i in 0..50u64 {
            let now = t0 + Duration::from_millis(i * 33);
            for command in controller.on_detections(&boxes, &mut position, now) {
                assert!(config.x_axis.range.contains(command.x_position), "{:?}", command);
                assert!(config.y_axis.range.contains(command.y_position), "{:?}", command);
            }
        }

        // Still steerable afterwards
        let later = t0 + Duration::from_secs(10);
        let centered = BoundingBox::new(38.0, 38.0, 20.0, 20.0);
        let commands = controller.on_detections(&[centered], &mut position, later);
        assert_eq!(commands.len(), 1);
        assert!(commands[0].x_position.is_finite());
        assert!(controller.x_pid().state().integral.is_finite());
    }

    #[test]
    fn test_overflowing_box_is_skipped() {
        let config = AppConfig::default();
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);
        let t0 = Instant::now();

        let bb = BoundingBox::new(1.5e308, 0.0, 1.5e308, 0.0);
        for i in 0..3u64 {
            let commands =
                controller.on_detections(&[bb], &mut position, t0 + Duration::from_millis(i * 33));
            assert!(commands.is_empty());
        }
        assert_eq!(position, start_position(&config));
    }

    #[test]
    fn test_malformed_box_skipped_rest_processed() {
        let mut config = AppConfig::default();
        config.flip_vertical = false;
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);

        let boxes = [
            BoundingBox::new(8.0, 38.0, -20.0, 20.0),
            BoundingBox::new(8.0, 38.0, 20.0, 20.0),
        ];
        let commands = controller.on_detections(&boxes, &mut position, Instant::now());
        assert_eq!(commands.len(), 1);
        assert!((commands[0].x_position - 645.5).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_detection_without_elapsed_time_is_idempotent() {
        let config = AppConfig::default();
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);
        let now = Instant::now();

        // Inside the deadzone on both axes
        let bb = BoundingBox::new(40.0, 36.0, 20.0, 20.0);
        for _ in 0..20 {
            let commands = controller.on_detections(&[bb], &mut position, now);
            assert_eq!(commands, vec![start_position(&config)]);
        }
    }

    #[test]
    fn test_multiple_boxes_emitted_in_order() {
        let mut config = AppConfig::default();
        config.flip_vertical = false;
        let mut controller = TrackingController::new(&config);
        let mut position = start_position(&config);

        let boxes = [
            BoundingBox::new(8.0, 38.0, 20.0, 20.0),
            BoundingBox::new(68.0, 38.0, 20.0, 20.0),
        ];
        let commands = controller.on_detections(&boxes, &mut position, Instant::now());

        // second box: error_x = 48 - 78 = -30 -> +4.5 from 645.5
        assert_eq!(commands.len(), 2);
        assert!((commands[0].x_position - 645.5).abs() < 1e-9);
        assert!((commands[1].x_position - 650.0).abs() < 1e-9);
    }
}
