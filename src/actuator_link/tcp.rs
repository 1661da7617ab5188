//! Stream-backed actuator link
//!
//! The actuator (ESP32 servo board) dials in once; that single connection
//! is held for the lifetime of the control loop.

use super::{encode_command, ActuatorSink};
use crate::error::{Error, Result};
use crate::servo_controller::ActuatorCommand;
use async_trait::async_trait;
use std::net::SocketAddr;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Actuator sink over any async byte stream
pub struct StreamActuatorSink<W> {
    writer: W,
    /// Remote address, when the stream is a socket
    peer: Option<SocketAddr>,
    sent: u64,
}

/// The production link
pub type TcpActuatorSink = StreamActuatorSink<TcpStream>;

impl<W> StreamActuatorSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            peer: None,
            sent: 0,
        }
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Commands written so far
    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl StreamActuatorSink<TcpStream> {
    /// Wait for the actuator to connect
    pub async fn accept(listener: &TcpListener) -> Result<Self> {
        let (stream, peer) = listener.accept().await?;
        stream.set_nodelay(true)?;

        tracing::info!(peer = %peer, "Actuator connected");

        Ok(Self {
            writer: stream,
            peer: Some(peer),
            sent: 0,
        })
    }
}

#[async_trait]
impl<W> ActuatorSink for StreamActuatorSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, command: &ActuatorCommand) -> Result<()> {
        let line = encode_command(command);

        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(Error::ActuatorLink)?;
        self.writer.flush().await.map_err(Error::ActuatorLink)?;
        self.sent += 1;

        tracing::debug!(command = %command, "TX actuator");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

    #[tokio::test]
    async fn test_writes_newline_terminated_commands() {
        let (client, mut server) = tokio::io::duplex(256);
        let mut sink = StreamActuatorSink::new(client);

        sink.send(&ActuatorCommand::new(650.0, 900.0)).await.unwrap();
        sink.send(&ActuatorCommand::new(652.7, 900.0)).await.unwrap();
        assert_eq!(sink.sent(), 2);
        drop(sink);

        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "X:650 Y:900\nX:652 Y:900\n");
    }

    #[tokio::test]
    async fn test_broken_link_is_fatal() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);
        let mut sink = StreamActuatorSink::new(client);

        let err = sink
            .send(&ActuatorCommand::new(650.0, 900.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ActuatorLink(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_accepts_tcp_actuator() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            let mut lines = BufReader::new(stream).lines();
            lines.next_line().await.unwrap()
        });

        let mut sink = TcpActuatorSink::accept(&listener).await.unwrap();
        assert!(sink.peer().is_some());
        sink.send(&ActuatorCommand::new(1100.0, 500.0)).await.unwrap();

        assert_eq!(client.await.unwrap(), Some("X:1100 Y:500".to_string()));
    }
}
