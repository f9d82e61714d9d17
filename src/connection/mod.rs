pub mod mock;
pub mod tcp;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::Metadata;

pub use mock::{MockConnection, SentMessage};
pub use tcp::TcpConnection;

/// Transport session to the ingestion endpoint.
///
/// The open connection is the session handle: `open` establishes it,
/// `send` uses it and `close` releases it.
#[async_trait]
pub trait Connection: Send {
    /// Opaque target this connection was created for
    fn target(&self) -> &str;

    async fn open(&mut self) -> Result<()>;

    /// Deliver one payload with its message properties
    async fn send(&mut self, payload: &[u8], metadata: &Metadata) -> Result<()>;

    async fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;
}
