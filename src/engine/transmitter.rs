use chrono::{Local, NaiveDateTime};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::connection::Connection;
use crate::core::{CompressedFrame, ConnectionOp, Result, TelemetryError};
use crate::observability::PipelineMetrics;

/// Outcome of one successful transmission
#[derive(Debug)]
pub struct TransmitReceipt {
    pub bytes_sent: usize,
    /// File the frame was written to, if persistence is on and succeeded
    pub stored_at: Option<PathBuf>,
    /// Write failure, reported without undoing the send
    pub persist_error: Option<TelemetryError>,
}

/// `yyyyMMddHHmmss.gzip`
pub fn frame_file_name(at: &NaiveDateTime) -> String {
    format!("{}.gzip", at.format("%Y%m%d%H%M%S"))
}

/// Sends frames over the connection and optionally mirrors them to disk
pub struct Transmitter {
    persist_dir: Option<PathBuf>,
    metrics: Arc<PipelineMetrics>,
}

impl Transmitter {
    pub fn new(persist_dir: Option<PathBuf>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            persist_dir,
            metrics,
        }
    }

    /// Send `frame` with its metadata. Network failures are returned;
    /// persistence failures are logged and attached to the receipt.
    pub async fn send(
        &self,
        connection: &mut dyn Connection,
        frame: &CompressedFrame,
        encoded_len: usize,
    ) -> Result<TransmitReceipt> {
        let start = self.metrics.start_send();
        connection
            .send(frame.as_bytes(), frame.metadata())
            .await
            .map_err(|e| TelemetryError::connection(ConnectionOp::Send, e))?;
        self.metrics.record_frame_sent(encoded_len, frame.len(), start);
        info!("Send - {} bytes", frame.len());

        let mut receipt = TransmitReceipt {
            bytes_sent: frame.len(),
            stored_at: None,
            persist_error: None,
        };

        if let Some(dir) = &self.persist_dir {
            match Self::store(dir, frame).await {
                Ok(path) => {
                    self.metrics.record_stored();
                    info!("Stored - {}", path.display());
                    receipt.stored_at = Some(path);
                }
                Err(e) => {
                    self.metrics.record_persist_failure();
                    warn!("{}", e);
                    receipt.persist_error = Some(e);
                }
            }
        }

        Ok(receipt)
    }

    /// Frames written within the same second replace each other
    async fn store(dir: &Path, frame: &CompressedFrame) -> Result<PathBuf> {
        let path = dir.join(frame_file_name(&Local::now().naive_local()));
        tokio::fs::write(&path, frame.as_bytes())
            .await
            .map_err(|source| TelemetryError::Persistence {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
