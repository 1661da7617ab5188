//! WebSocket client for the detection runner
//!
//! The runner pushes one JSON text frame per processed camera frame.

use super::types::{decode_batch, DetectionBatch};
use super::DetectionSource;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Detection source backed by a WebSocket connection
pub struct WebSocketDetectionSource {
    url: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketDetectionSource {
    /// Open the connection
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| Error::Feed(format!("connect {}: {}", url, e)))?;

        tracing::info!(url = %url, "Detection feed connected");

        Ok(Self {
            url: url.to_string(),
            stream,
        })
    }
}

#[async_trait]
impl DetectionSource for WebSocketDetectionSource {
    async fn next_batch(&mut self) -> Option<Result<DetectionBatch>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "Detection feed error");
                    return Some(Err(Error::Feed(e.to_string())));
                }
            };
            let received_at = tokio::time::Instant::now().into_std();

            match message {
                Message::Text(text) => return Some(decode_batch(text.as_bytes(), received_at)),
                Message::Binary(data) => return Some(decode_batch(&data, received_at)),
                Message::Close(frame) => {
                    tracing::info!(url = %self.url, ?frame, "Detection feed closed by peer");
                    return None;
                }
                Message::Ping(data) => {
                    // Pong is queued by tungstenite and flushed on the next read
                    tracing::trace!("Received ping: {:?}", data);
                }
                Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }
}
