use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::{Result, TelemetryError};

/// Simulator settings, read from camelCase JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatorConfig {
    /// Samples per transmitted frame
    pub batch_size: usize,

    /// Delay between the end of one tick and the start of the next
    pub tick_interval_ms: u64,

    pub persist_enabled: bool,

    /// Required when `persist_enabled` is set
    pub persist_directory: Option<PathBuf>,

    /// Opaque target handed to the connection (e.g. "host:port")
    pub connection_target: String,

    /// Oscillator increment per tick
    pub step_size: f64,

    /// Gzip level, 0-9
    pub compression_level: u32,

    /// Upper bound on a compressed frame; larger output fails compression
    pub max_frame_bytes: Option<usize>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            tick_interval_ms: 100,
            persist_enabled: false,
            persist_directory: None,
            connection_target: "127.0.0.1:5555".to_string(),
            step_size: 0.01,
            compression_level: 6,
            max_frame_bytes: None,
        }
    }
}

impl SimulatorConfig {
    pub fn from_json(config: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(config)
            .map_err(|e| TelemetryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            TelemetryError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| TelemetryError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Self::from_json(value)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(TelemetryError::Config("batchSize must be at least 1".to_string()));
        }
        if !self.step_size.is_finite() || self.step_size <= 0.0 || self.step_size > 1.0 {
            return Err(TelemetryError::Config(format!(
                "stepSize must be in (0, 1], got {}",
                self.step_size
            )));
        }
        if self.compression_level > 9 {
            return Err(TelemetryError::Config(format!(
                "compressionLevel must be 0-9, got {}",
                self.compression_level
            )));
        }
        if self.max_frame_bytes == Some(0) {
            return Err(TelemetryError::Config("maxFrameBytes must be at least 1".to_string()));
        }
        if self.persist_enabled && self.persist_directory.is_none() {
            return Err(TelemetryError::Config(
                "persistDirectory is required when persistEnabled is set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Directory frames are written to, if persistence is on
    pub fn persist_dir(&self) -> Option<&Path> {
        if self.persist_enabled {
            self.persist_directory.as_deref()
        } else {
            None
        }
    }
}
