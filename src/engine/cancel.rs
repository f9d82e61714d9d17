use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// Controller side of a stop request
#[derive(Clone)]
pub struct CancelHandle {
    tx: broadcast::Sender<()>,
}

/// Worker side of a stop request. Once observed, stays cancelled.
pub struct CancelSignal {
    rx: broadcast::Receiver<()>,
    cancelled: bool,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = broadcast::channel(1);
    (
        CancelHandle { tx },
        CancelSignal {
            rx,
            cancelled: false,
        },
    )
}

impl CancelHandle {
    pub fn cancel(&self) {
        // No receiver means the worker already exited
        let _ = self.tx.send(());
    }
}

impl CancelSignal {
    /// Non-blocking check point. A dropped handle counts as cancellation.
    pub fn is_cancelled(&mut self) -> bool {
        if !self.cancelled {
            match self.rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => {
                    self.cancelled = true;
                }
            }
        }
        self.cancelled
    }

    /// Resolves once cancellation has been requested
    pub async fn cancelled(&mut self) {
        if self.cancelled {
            return;
        }
        let _ = self.rx.recv().await;
        self.cancelled = true;
    }
}
