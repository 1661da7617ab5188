//! Detection Feed Module
//!
//! Inbound side of the tracker: produces one `DetectionBatch` per frame.
//!
//! ## Sources
//!
//! - `WebSocketDetectionSource` - detection runner pushing JSON frames
//! - `ChannelDetectionSource` - in-process producer over an mpsc channel

pub mod channel;
pub mod types;
pub mod websocket;

pub use channel::ChannelDetectionSource;
pub use types::*;
pub use websocket::WebSocketDetectionSource;

use crate::error::Result;
use async_trait::async_trait;

/// Capability: yields detection batches
///
/// `next_batch` must be cancel safe; the control loop races it against its
/// idle tick.
#[async_trait]
pub trait DetectionSource: Send {
    /// Next decoded batch, `None` once the feed has closed.
    ///
    /// A message that fails to decode is reported as `Some(Err(FeedDecode))`
    /// and the source stays usable.
    async fn next_batch(&mut self) -> Option<Result<DetectionBatch>>;
}
