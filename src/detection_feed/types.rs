//! Detection feed type definitions

use crate::error::Result;
use crate::servo_controller::BoundingBox;
use serde::Deserialize;
use std::time::Instant;

/// Inbound message from the detection runner, one per frame
#[derive(Debug, Clone, Deserialize)]
pub struct FeedMessage {
    pub result: FeedResult,
}

/// Inference result of one frame
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResult {
    /// Absent for frames without object-detection output
    #[serde(default)]
    pub bounding_boxes: Vec<FeedBox>,
}

/// One detected object
#[derive(Debug, Clone, Deserialize)]
pub struct FeedBox {
    #[serde(default)]
    pub label: Option<String>,
    /// Detection confidence (0.0-1.0)
    #[serde(default)]
    pub value: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&FeedBox> for BoundingBox {
    fn from(b: &FeedBox) -> Self {
        BoundingBox::new(b.x, b.y, b.width, b.height)
    }
}

/// Raw frame as it came off a transport
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub payload: Vec<u8>,
    pub received_at: Instant,
}

impl RawFrame {
    pub fn new(payload: impl Into<Vec<u8>>, received_at: Instant) -> Self {
        Self {
            payload: payload.into(),
            received_at,
        }
    }

    /// Frame stamped with the current instant
    pub fn now(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(payload, tokio::time::Instant::now().into_std())
    }
}

/// Decoded detections of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionBatch {
    /// Possibly empty, in runner order
    pub boxes: Vec<BoundingBox>,
    /// Monotonic arrival time; the control core's `now` for this batch
    pub received_at: Instant,
}

impl DetectionBatch {
    pub fn empty(received_at: Instant) -> Self {
        Self {
            boxes: Vec::new(),
            received_at,
        }
    }
}

/// Decode one feed message. Any missing or mistyped field fails the whole
/// message.
pub fn decode_batch(payload: &[u8], received_at: Instant) -> Result<DetectionBatch> {
    let message: FeedMessage = serde_json::from_slice(payload)?;

    for b in &message.result.bounding_boxes {
        tracing::debug!(
            label = b.label.as_deref().unwrap_or("-"),
            value = b.value.unwrap_or_default(),
            x = b.x,
            y = b.y,
            width = b.width,
            height = b.height,
            "Detection"
        );
    }

    Ok(DetectionBatch {
        boxes: message
            .result
            .bounding_boxes
            .iter()
            .map(BoundingBox::from)
            .collect(),
        received_at,
    })
}
