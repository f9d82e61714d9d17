use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::{sleep, Duration};

use super::Connection;
use crate::core::Metadata;

/// Message captured by [`MockConnection`]
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub payload: Vec<u8>,
    pub metadata: Metadata,
}

#[derive(Debug, Default)]
struct MockState {
    is_open: bool,
    open_calls: usize,
    close_calls: usize,
    send_attempts: usize,
    sent: Vec<SentMessage>,
}

/// In-memory connection that records traffic and can be scripted to fail.
///
/// Clones share state, so a test can keep one clone and hand the other
/// to the controller.
#[derive(Clone)]
pub struct MockConnection {
    target: String,
    state: Arc<Mutex<MockState>>,
    fail_open: bool,
    fail_close: bool,
    fail_send_at: Option<usize>,
    send_delay: Option<Duration>,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            target: "mock".to_string(),
            state: Arc::new(Mutex::new(MockState::default())),
            fail_open: false,
            fail_close: false,
            fail_send_at: None,
            send_delay: None,
        }
    }

    /// Every `open` call fails
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Every `close` call fails after marking the connection closed
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// The send with this zero-based attempt index fails
    pub fn failing_send_at(mut self, attempt: usize) -> Self {
        self.fail_send_at = Some(attempt);
        self
    }

    /// Simulated network latency per send
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    pub fn open_calls(&self) -> usize {
        self.lock().open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn target(&self) -> &str {
        &self.target
    }

    async fn open(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.open_calls += 1;
        if self.fail_open {
            return Err(anyhow!("Endpoint unreachable"));
        }
        if state.is_open {
            return Err(anyhow!("Connection already open"));
        }
        state.is_open = true;
        Ok(())
    }

    async fn send(&mut self, payload: &[u8], metadata: &Metadata) -> Result<()> {
        if let Some(delay) = self.send_delay {
            sleep(delay).await;
        }

        let mut state = self.lock();
        if !state.is_open {
            return Err(anyhow!("Connection not open"));
        }

        let attempt = state.send_attempts;
        state.send_attempts += 1;
        if self.fail_send_at == Some(attempt) {
            return Err(anyhow!("Send rejected by endpoint"));
        }

        state.sent.push(SentMessage {
            payload: payload.to_vec(),
            metadata: metadata.clone(),
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.close_calls += 1;
        state.is_open = false;
        if self.fail_close {
            return Err(anyhow!("Endpoint reset during close"));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().is_open
    }
}
