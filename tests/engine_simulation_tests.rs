use accelsim::connection::{Connection, MockConnection};
use accelsim::core::{ConnectionOp, SimulatorConfig, TelemetryError};
use accelsim::engine::{cancel_pair, SimulationLoop};
use accelsim::nodes::{decompress, FrameEncoder, Oscillator, SignalGenerator};
use accelsim::observability::PipelineMetrics;
use serde_json::json;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

async fn open_mock(mock: MockConnection) -> (MockConnection, Box<dyn Connection>) {
    let mut conn = mock.clone();
    conn.open().await.unwrap();
    (mock, Box::new(conn))
}

fn config(value: serde_json::Value) -> SimulatorConfig {
    SimulatorConfig::from_json(value).unwrap()
}

#[tokio::test]
async fn test_250_samples_send_two_frames() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(json!({
        "batchSize": 100,
        "persistEnabled": false,
        "persistDirectory": dir.path()
    }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let metrics = Arc::new(PipelineMetrics::new());
    let mut sim = SimulationLoop::new(&cfg, conn, metrics.clone()).unwrap();

    let mut receipts = Vec::new();
    for _ in 0..250 {
        if let Some(receipt) = sim.tick().await.unwrap() {
            receipts.push(receipt);
        }
    }

    assert_eq!(receipts.len(), 2);
    assert_eq!(sim.pending_samples(), 50);
    assert_eq!(metrics.samples_generated(), 250);
    assert_eq!(metrics.frames_sent(), 2);

    let sent = mock.sent_messages();
    assert_eq!(sent.len(), 2);
    for message in &sent {
        assert_eq!(message.metadata.len(), 1);
        assert_eq!(message.metadata.get("data-type").map(String::as_str), Some("gzip"));

        let samples = FrameEncoder::decode(&decompress(&message.payload).unwrap()).unwrap();
        assert_eq!(samples.len(), 100);
    }

    // Persistence disabled: nothing written even though a directory is configured
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert!(receipts.iter().all(|r| r.stored_at.is_none()));
}

#[tokio::test]
async fn test_frames_sent_in_sample_order() {
    let cfg = config(json!({ "batchSize": 10 }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let mut sim = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new())).unwrap();

    for _ in 0..50 {
        sim.tick().await.unwrap();
    }

    let ticks: Vec<i64> = mock
        .sent_messages()
        .iter()
        .flat_map(|m| FrameEncoder::decode(&decompress(&m.payload).unwrap()).unwrap())
        .map(|s| s.timestamp.ticks())
        .collect();
    assert_eq!(ticks.len(), 50);
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_cancel_mid_batch_discards_buffer() {
    let cfg = config(json!({ "batchSize": 100 }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let metrics = Arc::new(PipelineMetrics::new());
    let mut sim = SimulationLoop::new(&cfg, conn, metrics.clone()).unwrap();

    for _ in 0..37 {
        assert!(sim.tick().await.unwrap().is_none());
    }
    assert_eq!(sim.pending_samples(), 37);

    let (handle, mut signal) = cancel_pair();
    handle.cancel();
    let exit = sim.run(&mut signal).await.unwrap_err();

    assert!(exit.is_cancellation());
    assert_eq!(sim.pending_samples(), 0);
    assert_eq!(metrics.snapshot().samples_discarded, 37);
    assert!(mock.sent_messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_paces_ticks_until_cancelled() {
    let cfg = config(json!({ "batchSize": 5, "tickIntervalMs": 10 }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let metrics = Arc::new(PipelineMetrics::new());
    let mut sim = SimulationLoop::new(&cfg, conn, metrics.clone()).unwrap();
    let (handle, mut signal) = cancel_pair();

    let worker = tokio::spawn(async move {
        let exit = sim.run(&mut signal).await.unwrap_err();
        (sim, exit)
    });

    sleep(Duration::from_millis(500)).await;
    handle.cancel();
    let (sim, exit) = worker.await.unwrap();

    assert!(exit.is_cancellation());
    assert_eq!(sim.pending_samples(), 0);

    // Roughly one sample per 10ms
    let generated = metrics.samples_generated();
    assert!(generated >= 40 && generated <= 51, "generated {}", generated);
    assert_eq!(mock.sent_messages().len() as u64, metrics.frames_sent());
    assert!(metrics.frames_sent() >= 8);
}

#[tokio::test]
async fn test_send_failure_propagates() {
    let cfg = config(json!({ "batchSize": 10 }));
    let (mock, conn) = open_mock(MockConnection::new().failing_send_at(1)).await;
    let mut sim = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new())).unwrap();

    for _ in 0..10 {
        sim.tick().await.unwrap();
    }
    for _ in 0..9 {
        sim.tick().await.unwrap();
    }
    let err = sim.tick().await.unwrap_err();

    assert!(matches!(
        err,
        TelemetryError::Connection { operation: ConnectionOp::Send, .. }
    ));
    assert_eq!(mock.sent_messages().len(), 1);
}

#[tokio::test]
async fn test_send_failure_ends_run() {
    let cfg = config(json!({ "batchSize": 3, "tickIntervalMs": 0 }));
    let (_mock, conn) = open_mock(MockConnection::new().failing_send_at(0)).await;
    let mut sim = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new())).unwrap();
    let (_handle, mut signal) = cancel_pair();

    let exit = sim.run(&mut signal).await.unwrap_err();
    assert!(!exit.is_cancellation());
    assert!(matches!(exit, TelemetryError::Connection { .. }));
}

#[tokio::test]
async fn test_persisted_file_matches_transmitted_frame() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(json!({
        "batchSize": 100,
        "persistEnabled": true,
        "persistDirectory": dir.path()
    }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let metrics = Arc::new(PipelineMetrics::new());
    let mut sim = SimulationLoop::new(&cfg, conn, metrics.clone()).unwrap();

    let mut receipt = None;
    for _ in 0..100 {
        if let Some(r) = sim.tick().await.unwrap() {
            receipt = Some(r);
        }
    }
    let receipt = receipt.expect("one full batch");

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(receipt.stored_at.as_ref(), Some(&files[0]));

    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert_eq!(name.len(), "yyyyMMddHHmmss.gzip".len());
    assert!(name.ends_with(".gzip"));
    assert!(name[..14].chars().all(|c| c.is_ascii_digit()));

    let stored = std::fs::read(&files[0]).unwrap();
    assert_eq!(stored, mock.sent_messages()[0].payload);
    assert_eq!(metrics.frames_stored(), 1);
}

#[tokio::test]
async fn test_persistence_failure_does_not_abort_send() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-created");
    let cfg = config(json!({
        "batchSize": 5,
        "persistEnabled": true,
        "persistDirectory": missing
    }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let metrics = Arc::new(PipelineMetrics::new());
    let mut sim = SimulationLoop::new(&cfg, conn, metrics.clone()).unwrap();

    let mut receipts = Vec::new();
    for _ in 0..10 {
        if let Some(r) = sim.tick().await.unwrap() {
            receipts.push(r);
        }
    }

    assert_eq!(receipts.len(), 2);
    assert_eq!(mock.sent_messages().len(), 2);
    for receipt in &receipts {
        assert!(receipt.stored_at.is_none());
        assert!(matches!(receipt.persist_error, Some(TelemetryError::Persistence { .. })));
    }
    assert_eq!(metrics.persist_failures(), 2);
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let cfg = SimulatorConfig {
        batch_size: 0,
        ..SimulatorConfig::default()
    };
    let (_mock, conn) = open_mock(MockConnection::new()).await;
    let result = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new()));
    assert!(matches!(result, Err(TelemetryError::Config(_))));
}

#[tokio::test]
async fn test_compression_failure_ends_run() {
    // Smaller than a gzip header, so every frame fails to compress
    let cfg = config(json!({ "batchSize": 4, "tickIntervalMs": 0, "maxFrameBytes": 8 }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let mut sim = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new())).unwrap();
    let (_handle, mut signal) = cancel_pair();

    let exit = sim.run(&mut signal).await.unwrap_err();

    assert!(!exit.is_cancellation());
    assert!(matches!(exit, TelemetryError::Compression(_)));
    assert!(mock.sent_messages().is_empty());
    assert_eq!(sim.metrics().samples_generated(), 4);
    assert_eq!(sim.metrics().frames_sent(), 0);
}

#[tokio::test]
async fn test_frames_carry_generator_values() {
    let cfg = config(json!({ "batchSize": 3 }));
    let (mock, conn) = open_mock(MockConnection::new()).await;
    let mut sim = SimulationLoop::new(&cfg, conn, Arc::new(PipelineMetrics::new()))
        .unwrap()
        .with_generator(SignalGenerator::from_state(
            Oscillator::new(0.5, 1.0),
            Oscillator::new(-0.5, -1.0),
            Oscillator::new(0.0, 1.0),
            0.25,
        ));

    for _ in 0..3 {
        sim.tick().await.unwrap();
    }

    let sent = mock.sent_messages();
    assert_eq!(sent.len(), 1);
    let samples = FrameEncoder::decode(&decompress(&sent[0].payload).unwrap()).unwrap();
    let xs: Vec<f64> = samples.iter().map(|s| s.x).collect();
    assert_eq!(xs, vec![0.75, 1.0, 0.75]);
}
