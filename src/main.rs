use accelsim::connection::TcpConnection;
use accelsim::core::SimulatorConfig;
use accelsim::engine::SimulationController;
use anyhow::{Context, Result};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional JSON config path as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => SimulatorConfig::load(&path)
            .await
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => SimulatorConfig::default(),
    };

    info!(
        "Device simulator: batch size {}, tick {}ms, target {}",
        config.batch_size, config.tick_interval_ms, config.connection_target
    );
    if let Some(dir) = config.persist_dir() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        info!("Storing frames in {}", dir.display());
    }

    let connection = TcpConnection::new(config.connection_target.clone());
    let mut controller = SimulationController::new(config, Box::new(connection));
    controller.start().await.context("Failed to start simulation")?;
    info!("Press Ctrl-C to stop");

    // wait() only resolves if the run fails; Ctrl-C drops it and stops cleanly
    let halted = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            None
        }
        halted = controller.wait() => Some(halted),
    };
    let outcome = match halted {
        Some(outcome) => outcome,
        None => controller.stop().await,
    };

    let report = controller.monitor().generate_report();
    match outcome {
        Ok(summary) => {
            info!("Stopped after {:?}", summary.duration.unwrap_or_default());
            println!("\n{}", report);
            Ok(())
        }
        Err(e) => {
            error!("Simulation ended with error: {}", e);
            println!("\n{}", report);
            Err(e.into())
        }
    }
}
