//! Application configuration
//!
//! Loaded once at start-up from the environment (after `.env`, if any).
//! Every key falls back to the values of the reference deployment:
//! 96x96 camera, micro-second servo pulses, ESP32 actuator on port 5000.

use crate::error::{Error, Result};
use crate::servo_controller::{AxisRange, ImageSize, PidGains};
use std::str::FromStr;
use std::time::Duration;

/// Control parameters for one axis
#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub gains: PidGains,
    /// Pixel error below which the axis is considered settled
    pub deadzone: f64,
    pub range: AxisRange,
    /// Actuator units per unit of PID output
    pub output_gain: f64,
    /// Position commanded before the first cycle
    pub start: f64,
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// WebSocket URL of the detection runner
    pub detection_url: String,
    /// Address the actuator connects to
    pub actuator_host: String,
    pub actuator_port: u16,
    pub image: ImageSize,
    /// Image y axis points opposite to the actuator's "up"
    pub flip_vertical: bool,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    /// Sweep increment per scanning cycle, actuator units
    pub scan_step: f64,
    /// Staleness window before sweeping starts
    pub detection_timeout: Duration,
    /// Synthesize an empty batch when the feed is silent this long
    pub idle_tick: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            detection_url: "ws://127.0.0.1:4912".to_string(),
            actuator_host: "0.0.0.0".to_string(),
            actuator_port: 5000,
            image: ImageSize {
                width: 96,
                height: 96,
            },
            flip_vertical: true,
            x_axis: AxisConfig {
                gains: PidGains::new(0.5, 0.01, 0.0),
                deadzone: 5.0,
                range: AxisRange::new(500.0, 1100.0),
                output_gain: 0.3,
                start: 650.0,
            },
            y_axis: AxisConfig {
                gains: PidGains::new(0.05, 0.01, 0.0),
                deadzone: 5.0,
                range: AxisRange::new(500.0, 1200.0),
                output_gain: 0.3,
                start: 900.0,
            },
            scan_step: 2.0,
            detection_timeout: Duration::from_secs(2),
            idle_tick: None,
        }
    }
}

impl AppConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str, default: String| lookup(key).unwrap_or(default);

        let config = Self {
            detection_url: get("DETECTION_WS_URL", defaults.detection_url),
            actuator_host: get("ACTUATOR_HOST", defaults.actuator_host),
            actuator_port: parse_or(&lookup, "ACTUATOR_PORT", defaults.actuator_port)?,
            image: ImageSize {
                width: parse_or(&lookup, "IMAGE_WIDTH", defaults.image.width)?,
                height: parse_or(&lookup, "IMAGE_HEIGHT", defaults.image.height)?,
            },
            flip_vertical: match lookup("FLIP_VERTICAL") {
                Some(raw) => parse_bool("FLIP_VERTICAL", &raw)?,
                None => defaults.flip_vertical,
            },
            x_axis: axis_from_lookup(&lookup, "X", &defaults.x_axis)?,
            y_axis: axis_from_lookup(&lookup, "Y", &defaults.y_axis)?,
            scan_step: parse_or(&lookup, "SCAN_STEP", defaults.scan_step)?,
            detection_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DETECTION_TIMEOUT_MS",
                defaults.detection_timeout.as_millis() as u64,
            )?),
            idle_tick: match parse_or(&lookup, "IDLE_TICK_MS", 0u64)? {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the controller cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.image.width == 0 || self.image.height == 0 {
            return Err(Error::Config(format!(
                "image dimensions must be positive, got {}x{}",
                self.image.width, self.image.height
            )));
        }
        if !(self.scan_step.is_finite() && self.scan_step > 0.0) {
            return Err(Error::Config(format!(
                "scan step must be positive, got {}",
                self.scan_step
            )));
        }
        validate_axis("x", &self.x_axis)?;
        validate_axis("y", &self.y_axis)?;
        Ok(())
    }

    /// `host:port` the actuator listener binds to
    pub fn actuator_addr(&self) -> String {
        format!("{}:{}", self.actuator_host, self.actuator_port)
    }
}

fn axis_from_lookup<F>(lookup: &F, axis: &str, defaults: &AxisConfig) -> Result<AxisConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let key = |name: &str| format!("{}_{}", axis, name);

    Ok(AxisConfig {
        gains: PidGains::new(
            parse_or(lookup, &key("KP"), defaults.gains.kp)?,
            parse_or(lookup, &key("KI"), defaults.gains.ki)?,
            parse_or(lookup, &key("KD"), defaults.gains.kd)?,
        ),
        deadzone: parse_or(lookup, &key("DEADZONE"), defaults.deadzone)?,
        range: AxisRange::new(
            parse_or(lookup, &key("MIN"), defaults.range.min)?,
            parse_or(lookup, &key("MAX"), defaults.range.max)?,
        ),
        output_gain: parse_or(lookup, &key("OUTPUT_GAIN"), defaults.output_gain)?,
        start: parse_or(lookup, &key("START"), defaults.start)?,
    })
}

fn validate_axis(name: &str, axis: &AxisConfig) -> Result<()> {
    let gains = [
        axis.gains.kp,
        axis.gains.ki,
        axis.gains.kd,
        axis.output_gain,
    ];
    if gains.iter().any(|g| !g.is_finite()) {
        return Err(Error::Config(format!("{} axis gains must be finite", name)));
    }
    if !(axis.deadzone.is_finite() && axis.deadzone >= 0.0) {
        return Err(Error::Config(format!(
            "{} axis deadzone must be non-negative, got {}",
            name, axis.deadzone
        )));
    }
    if !(axis.range.min.is_finite() && axis.range.max.is_finite())
        || axis.range.min >= axis.range.max
    {
        return Err(Error::Config(format!(
            "{} axis range [{}, {}] is empty",
            name, axis.range.min, axis.range.max
        )));
    }
    if !axis.range.contains(axis.start) {
        return Err(Error::Config(format!(
            "{} axis start {} outside [{}, {}]",
            name, axis.start, axis.range.min, axis.range.max
        )));
    }
    Ok(())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{}={:?}: expected a boolean", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.actuator_addr(), "0.0.0.0:5000");
        assert!(config.idle_tick.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("IMAGE_WIDTH", "320"),
            ("IMAGE_HEIGHT", "240"),
            ("FLIP_VERTICAL", "off"),
            ("X_KP", "1.5"),
            ("Y_MAX", "1500"),
            ("DETECTION_TIMEOUT_MS", "750"),
            ("IDLE_TICK_MS", "100"),
        ]))
        .unwrap();

        assert_eq!(config.image.width, 320);
        assert_eq!(config.image.height, 240);
        assert!(!config.flip_vertical);
        assert_eq!(config.x_axis.gains.kp, 1.5);
        assert_eq!(config.y_axis.range.max, 1500.0);
        assert_eq!(config.detection_timeout, Duration::from_millis(750));
        assert_eq!(config.idle_tick, Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        let result = AppConfig::from_lookup(lookup_from(&[("X_KP", "fast")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = AppConfig::from_lookup(lookup_from(&[("FLIP_VERTICAL", "maybe")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_range_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("X_MIN", "1100")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_start_outside_range_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("Y_START", "1300")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_non_positive_scan_step_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("SCAN_STEP", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
