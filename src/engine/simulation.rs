use log::{debug, info};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::cancel::CancelSignal;
use super::transmitter::{TransmitReceipt, Transmitter};
use crate::connection::Connection;
use crate::core::{Batch, Result, SimulatorConfig, TelemetryError};
use crate::nodes::{FrameBatcher, FrameCompressor, FrameEncoder, SignalGenerator};
use crate::observability::PipelineMetrics;

/// Tick loop: generate, batch, encode, compress, send.
///
/// Owns every stage and the open connection for the duration of a run.
pub struct SimulationLoop {
    generator: SignalGenerator,
    batcher: FrameBatcher,
    compressor: FrameCompressor,
    transmitter: Transmitter,
    connection: Box<dyn Connection>,
    tick_interval: Duration,
    metrics: Arc<PipelineMetrics>,
}

impl SimulationLoop {
    /// `connection` must already be open. Fails on an invalid config.
    pub fn new(
        config: &SimulatorConfig,
        connection: Box<dyn Connection>,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self> {
        config.validate()?;

        let mut compressor = FrameCompressor::new(config.compression_level);
        if let Some(limit) = config.max_frame_bytes {
            compressor = compressor.with_max_output(limit);
        }

        Ok(Self {
            generator: SignalGenerator::with_step(config.step_size),
            batcher: FrameBatcher::new(config.batch_size),
            compressor,
            transmitter: Transmitter::new(config.persist_dir().map(|p| p.to_path_buf()), metrics.clone()),
            connection,
            tick_interval: config.tick_interval(),
            metrics,
        })
    }

    pub fn with_generator(mut self, generator: SignalGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// One full tick without pacing or cancellation checks
    pub async fn tick(&mut self) -> Result<Option<TransmitReceipt>> {
        self.generate();
        self.flush_full().await
    }

    /// Run until cancelled or a stage fails. Never returns `Ok`; a stop
    /// request ends with [`TelemetryError::Cancelled`].
    pub async fn run(&mut self, cancel: &mut CancelSignal) -> Result<Infallible> {
        loop {
            if cancel.is_cancelled() {
                return Err(self.abandon());
            }

            self.generate();

            if cancel.is_cancelled() {
                return Err(self.abandon());
            }

            self.flush_full().await?;

            // Delay runs from the end of this cycle, so slow sends shift later ticks
            tokio::select! {
                _ = sleep(self.tick_interval) => {}
                _ = cancel.cancelled() => {}
            }
        }
    }

    fn generate(&mut self) {
        let sample = self.generator.next();
        self.metrics.record_sample();
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string(&sample) {
                Ok(json) => debug!("Added {}", json),
                Err(_) => debug!("Added {:?}", sample),
            }
        }
        self.batcher.add(sample);
    }

    async fn flush_full(&mut self) -> Result<Option<TransmitReceipt>> {
        match self.batcher.try_take_full() {
            Some(batch) => self.process_batch(batch).await.map(Some),
            None => Ok(None),
        }
    }

    async fn process_batch(&mut self, batch: Batch) -> Result<TransmitReceipt> {
        let encoded = FrameEncoder::encode(&batch);
        let compressed = self.compressor.compress(&encoded)?;
        self.transmitter
            .send(self.connection.as_mut(), &compressed, encoded.len())
            .await
    }

    /// Drop the partial batch and produce the cancellation outcome
    fn abandon(&mut self) -> TelemetryError {
        let dropped = self.batcher.discard();
        self.metrics.record_discarded(dropped);
        info!("Simulation cancelled, discarded {} buffered samples", dropped);
        TelemetryError::Cancelled
    }

    pub fn pending_samples(&self) -> usize {
        self.batcher.len()
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn into_connection(self) -> Box<dyn Connection> {
        self.connection
    }
}
