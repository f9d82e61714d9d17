use std::sync::Arc;

use super::PipelineMetrics;

pub struct PipelineMonitor {
    metrics: Arc<PipelineMetrics>,
}

impl PipelineMonitor {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }

    pub fn generate_report(&self) -> String {
        let snapshot = self.metrics.snapshot();

        let mut report = String::from("=== Telemetry Metrics ===\n");
        report.push_str(&format!(
            "  Samples: {} generated, {} discarded\n",
            snapshot.samples_generated, snapshot.samples_discarded
        ));
        report.push_str(&format!(
            "  Frames: {} sent ({} bytes encoded, {} bytes compressed, ratio {:.2})\n",
            snapshot.frames_sent,
            snapshot.encoded_bytes,
            snapshot.compressed_bytes,
            snapshot.compression_ratio()
        ));
        report.push_str(&format!(
            "  Stored: {} frame{}, {}\n",
            snapshot.frames_stored,
            if snapshot.frames_stored == 1 { "" } else { "s" },
            if snapshot.persist_failures > 0 {
                format!(
                    "{} failure{}",
                    snapshot.persist_failures,
                    if snapshot.persist_failures == 1 { "" } else { "s" }
                )
            } else {
                "0 failures".to_string()
            }
        ));
        report.push_str(&format!("  Avg Send Latency: {}μs\n", snapshot.avg_send_latency_us));

        report
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }
}
