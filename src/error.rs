//! Error handling for the servo tracker

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bounding box with negative extent
    #[error("Malformed detection: width={width}, height={height}")]
    MalformedDetection { width: f64, height: f64 },

    /// Bounding box whose center does not fit in an f64
    #[error("Detection center out of range: x={x}, y={y}")]
    NonFiniteDetection { x: f64, y: f64 },

    /// Inbound feed message is not valid detection data
    #[error("Feed decode error: {0}")]
    FeedDecode(#[from] serde_json::Error),

    /// Detection feed transport failure
    #[error("Detection feed error: {0}")]
    Feed(String),

    /// Actuator connection broken
    #[error("Actuator link error: {0}")]
    ActuatorLink(std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the control loop has to stop on this error.
    ///
    /// A malformed box or an undecodable message only costs that box or
    /// message; losing either connection ends the loop.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::MalformedDetection { .. } | Error::NonFiniteDetection { .. } | Error::FeedDecode(_)
        )
    }
}
