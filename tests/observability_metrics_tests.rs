use accelsim::observability::{PipelineMetrics, PipelineMonitor};
use std::sync::Arc;

#[test]
fn test_metrics_counters() {
    let metrics = PipelineMetrics::new();

    for _ in 0..10 {
        metrics.record_sample();
    }
    let start = metrics.start_send();
    metrics.record_frame_sent(200, 50, start);
    metrics.record_stored();
    metrics.record_discarded(3);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.samples_generated, 10);
    assert_eq!(snapshot.frames_sent, 1);
    assert_eq!(snapshot.encoded_bytes, 200);
    assert_eq!(snapshot.compressed_bytes, 50);
    assert_eq!(snapshot.frames_stored, 1);
    assert_eq!(snapshot.samples_discarded, 3);
    assert!((snapshot.compression_ratio() - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_empty_metrics() {
    let metrics = PipelineMetrics::new();
    assert_eq!(metrics.avg_send_latency_us(), 0);
    assert_eq!(metrics.snapshot().compression_ratio(), 0.0);
}

#[test]
fn test_report_counts_failures() {
    let metrics = Arc::new(PipelineMetrics::new());
    metrics.record_persist_failure();

    let report = PipelineMonitor::new(metrics).generate_report();
    assert!(report.contains("=== Telemetry Metrics ==="));
    assert!(report.contains("1 failure"));
}
