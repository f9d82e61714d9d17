use log::{error, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::cancel::{cancel_pair, CancelHandle};
use super::simulation::SimulationLoop;
use super::state::SimulationState;
use crate::connection::Connection;
use crate::core::{ConnectionOp, Result, SimulatorConfig, TelemetryError};
use crate::observability::{MetricsSnapshot, PipelineMetrics, PipelineMonitor};

/// Summary returned when a run ends through a stop request
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub duration: Option<Duration>,
    pub metrics: MetricsSnapshot,
}

type Worker = JoinHandle<(SimulationLoop, TelemetryError)>;

/// SimulationController drives the Idle -> Running -> Stopping -> Idle cycle.
///
/// It owns the connection while idle, lends it to the worker task for the
/// duration of a run and closes it when the worker has finished.
pub struct SimulationController {
    config: SimulatorConfig,

    /// Present while idle; held by the worker while running
    connection: Option<Box<dyn Connection>>,

    state: SimulationState,

    /// Stop request sender for the current run
    cancel: Option<CancelHandle>,

    worker: Option<Worker>,

    /// Metrics of the current (or last) run
    metrics: Arc<PipelineMetrics>,
}

impl SimulationController {
    pub fn new(config: SimulatorConfig, connection: Box<dyn Connection>) -> Self {
        Self {
            config,
            connection: Some(connection),
            state: SimulationState::Idle,
            cancel: None,
            worker: None,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    pub fn monitor(&self) -> PipelineMonitor {
        PipelineMonitor::new(self.metrics.clone())
    }

    /// True once the worker has exited on its own (after a failure)
    pub fn is_halted(&self) -> bool {
        self.worker.as_ref().map_or(false, |w| w.is_finished())
    }

    fn transition_to(&mut self, new_state: SimulationState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(TelemetryError::InvalidState(format!(
                "Invalid state transition: {} -> {}",
                self.state.name(),
                new_state.name()
            )));
        }
        self.state = new_state;
        Ok(())
    }

    /// Open the connection and spawn the tick loop.
    /// On open failure the controller stays Idle.
    pub async fn start(&mut self) -> Result<()> {
        if !self.state.is_idle() {
            return Err(TelemetryError::InvalidState(format!(
                "Cannot start simulation in state {}",
                self.state.name()
            )));
        }
        self.config.validate()?;

        let mut connection = self
            .connection
            .take()
            .ok_or_else(|| TelemetryError::InvalidState("Connection unavailable".to_string()))?;

        if let Err(e) = connection.open().await {
            let err = TelemetryError::connection(ConnectionOp::Open, e);
            error!("{}", err);
            self.connection = Some(connection);
            return Err(err);
        }
        info!("Connected to {}", connection.target());

        self.metrics = Arc::new(PipelineMetrics::new());
        let mut simulation = SimulationLoop::new(&self.config, connection, self.metrics.clone())?;
        let (cancel, mut signal) = cancel_pair();

        let worker = tokio::spawn(async move {
            let exit = match simulation.run(&mut signal).await {
                Ok(never) => match never {},
                Err(e) => e,
            };
            (simulation, exit)
        });

        self.cancel = Some(cancel);
        self.worker = Some(worker);
        self.transition_to(SimulationState::Running {
            start_time: Some(Instant::now()),
        })
    }

    /// Request cancellation, wait for the worker and close the connection.
    ///
    /// Returns the run summary on the expected cancellation path, or the
    /// error that ended the run if the worker had already failed.
    pub async fn stop(&mut self) -> Result<RunSummary> {
        if self.state.is_idle() {
            return Ok(self.summary(None));
        }

        let duration = self.run_duration();
        self.transition_to(SimulationState::Stopping)?;
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }

        let worker = self
            .worker
            .take()
            .ok_or_else(|| TelemetryError::InvalidState("No worker for running simulation".to_string()))?;
        let joined = worker.await;
        self.finish(joined, duration).await
    }

    /// Wait for the current run to end without requesting a stop.
    /// Only resolves once the worker fails. Safe to drop before completion.
    pub async fn wait(&mut self) -> Result<RunSummary> {
        if !self.state.is_running() {
            return Err(TelemetryError::InvalidState(format!(
                "No simulation running (state {})",
                self.state.name()
            )));
        }

        let worker = self
            .worker
            .as_mut()
            .ok_or_else(|| TelemetryError::InvalidState("No worker for running simulation".to_string()))?;
        let joined = worker.await;
        self.worker = None;
        self.cancel = None;

        let duration = self.run_duration();
        self.transition_to(SimulationState::Stopping)?;
        self.finish(joined, duration).await
    }

    async fn finish(
        &mut self,
        joined: std::result::Result<(SimulationLoop, TelemetryError), tokio::task::JoinError>,
        duration: Option<Duration>,
    ) -> Result<RunSummary> {
        let (simulation, exit) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                // Connection is lost with the task if the worker panicked
                self.transition_to(SimulationState::Idle)?;
                return Err(e.into());
            }
        };

        let mut connection = simulation.into_connection();
        let closed = connection.close().await;
        self.connection = Some(connection);
        self.transition_to(SimulationState::Idle)?;

        if !exit.is_cancellation() {
            error!("Simulation halted: {}", exit);
            if let Err(e) = closed {
                warn!("Failed to close connection after failure: {}", e);
            }
            return Err(exit);
        }

        closed.map_err(|e| TelemetryError::connection(ConnectionOp::Close, e))?;
        info!("Disconnected");
        Ok(self.summary(duration))
    }

    fn run_duration(&self) -> Option<Duration> {
        match &self.state {
            SimulationState::Running { start_time } => start_time.map(|t| t.elapsed()),
            _ => None,
        }
    }

    fn summary(&self, duration: Option<Duration>) -> RunSummary {
        RunSummary {
            duration,
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Dropping a running controller only signals the worker; call `stop()`
/// to close the connection.
impl Drop for SimulationController {
    fn drop(&mut self) {
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
    }
}
