//! In-process detection source

use super::types::{decode_batch, DetectionBatch, RawFrame};
use super::DetectionSource;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Decodes raw frames pushed through an mpsc channel
pub struct ChannelDetectionSource {
    rx: mpsc::Receiver<RawFrame>,
}

impl ChannelDetectionSource {
    pub fn new(rx: mpsc::Receiver<RawFrame>) -> Self {
        Self { rx }
    }

    /// Create a source together with its sending half
    pub fn channel(buffer: usize) -> (mpsc::Sender<RawFrame>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl DetectionSource for ChannelDetectionSource {
    async fn next_batch(&mut self) -> Option<Result<DetectionBatch>> {
        let frame = self.rx.recv().await?;
        Some(decode_batch(&frame.payload, frame.received_at))
    }
}
