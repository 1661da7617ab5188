//! Servo controller type definitions

use std::fmt;

/// Axis-aligned detection box in image pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Pixel coordinates of a detection center or of the setpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub x: f64,
    pub y: f64,
}

/// Camera image dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Inclusive actuator range for one axis, in the actuator's native unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Commanded pan/tilt position
///
/// One value of this type is the authoritative actuator position; both the
/// tracking and the scanning path move it and it persists between cycles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommand {
    pub x_position: f64,
    pub y_position: f64,
}

impl ActuatorCommand {
    pub fn new(x_position: f64, y_position: f64) -> Self {
        Self {
            x_position,
            y_position,
        }
    }

    /// Bring both axes back inside their ranges
    pub fn clamp_to(&mut self, x_range: &AxisRange, y_range: &AxisRange) {
        self.x_position = x_range.clamp(self.x_position);
        self.y_position = y_range.clamp(self.y_position);
    }

    /// Integer position as sent on the wire (truncated toward zero)
    pub fn wire_position(&self) -> (i64, i64) {
        (self.x_position as i64, self.y_position as i64)
    }
}

/// Wire form without the trailing newline: `X:<int> Y:<int>`
impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.wire_position();
        write!(f, "X:{} Y:{}", x, y)
    }
}

/// Sweep direction on the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// Increasing x position
    Forward,
    /// Decreasing x position
    Backward,
}

impl ScanDirection {
    /// +1.0 or -1.0
    pub fn sign(&self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }
}

/// Which component drives the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// Detections were accepted within the staleness timeout
    Tracking,
    /// No detection accepted within the staleness timeout
    Scanning,
}

impl fmt::Display for ControllerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracking => write!(f, "tracking"),
            Self::Scanning => write!(f, "scanning"),
        }
    }
}

/// Result of one arbitration cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// One command per accepted box, in input order
    Tracked(Vec<ActuatorCommand>),
    /// One sweep step
    Scanned(ActuatorCommand),
    /// Inside the grace period: nothing emitted, actuator holds
    Held,
}

impl CycleOutcome {
    /// Commands to forward to the actuator, in emission order
    pub fn commands(&self) -> &[ActuatorCommand] {
        match self {
            Self::Tracked(commands) => commands,
            Self::Scanned(command) => std::slice::from_ref(command),
            Self::Held => &[],
        }
    }
}
