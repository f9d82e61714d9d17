//! Plain TCP transport for compressed frames.
//!
//! Each message is written as:
//!
//! ```text
//! [4-byte length (big-endian)][metadata "key=value;..." NUL-terminated][payload]
//! ```
//!
//! where the length covers the metadata block, its terminator and the payload.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use super::Connection;
use crate::core::Metadata;

pub struct TcpConnection {
    target: String,
    stream: Option<TcpStream>,
    buffer: Vec<u8>,
}

impl TcpConnection {
    /// `target` is a `host:port` address
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            stream: None,
            buffer: Vec::with_capacity(4096),
        }
    }
}

/// Serialize one message into `buffer` using the wire layout above
pub fn encode_message(payload: &[u8], metadata: &Metadata, buffer: &mut Vec<u8>) -> Result<()> {
    let header = metadata
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(";");
    if header.as_bytes().contains(&0) {
        return Err(anyhow!("Metadata must not contain NUL bytes"));
    }

    let body_len = header.len() + 1 + payload.len();
    let body_len = u32::try_from(body_len).context("Message too large for length prefix")?;

    buffer.clear();
    buffer.extend_from_slice(&body_len.to_be_bytes());
    buffer.extend_from_slice(header.as_bytes());
    buffer.push(0);
    buffer.extend_from_slice(payload);
    Ok(())
}

#[async_trait]
impl Connection for TcpConnection {
    fn target(&self) -> &str {
        &self.target
    }

    async fn open(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(anyhow!("Connection to {} already open", self.target));
        }
        let stream = TcpStream::connect(&self.target)
            .await
            .with_context(|| format!("Failed to connect to {}", self.target))?;
        stream.set_nodelay(true)?;
        info!("TCP connection established to {}", self.target);
        self.stream = Some(stream);
        Ok(())
    }

    async fn send(&mut self, payload: &[u8], metadata: &Metadata) -> Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| anyhow!("Connection to {} is not open", self.target))?;

        encode_message(payload, metadata, &mut self.buffer)?;
        stream.write_all(&self.buffer).await.context("Failed to write message")?;
        stream.flush().await.context("Failed to flush message")?;
        debug!("Wrote {} byte message to {}", self.buffer.len(), self.target);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await.context("Failed to shut down connection")?;
            info!("TCP connection to {} closed", self.target);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}
