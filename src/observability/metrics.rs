use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters for one simulation run, shared between worker and controller
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    samples_generated: AtomicU64,
    samples_discarded: AtomicU64,
    frames_sent: AtomicU64,
    encoded_bytes: AtomicU64,
    compressed_bytes: AtomicU64,
    frames_stored: AtomicU64,
    persist_failures: AtomicU64,
    total_send_latency_us: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub samples_generated: u64,
    pub samples_discarded: u64,
    pub frames_sent: u64,
    pub encoded_bytes: u64,
    pub compressed_bytes: u64,
    pub frames_stored: u64,
    pub persist_failures: u64,
    pub avg_send_latency_us: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&self) {
        self.samples_generated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self, count: usize) {
        self.samples_discarded.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn start_send(&self) -> Instant {
        Instant::now()
    }

    pub fn record_frame_sent(&self, encoded: usize, compressed: usize, start: Instant) {
        let latency_us = start.elapsed().as_micros() as u64;
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        self.encoded_bytes.fetch_add(encoded as u64, Ordering::Relaxed);
        self.compressed_bytes.fetch_add(compressed as u64, Ordering::Relaxed);
        self.total_send_latency_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    pub fn record_stored(&self) {
        self.frames_stored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn samples_generated(&self) -> u64 {
        self.samples_generated.load(Ordering::Relaxed)
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn frames_stored(&self) -> u64 {
        self.frames_stored.load(Ordering::Relaxed)
    }

    pub fn persist_failures(&self) -> u64 {
        self.persist_failures.load(Ordering::Relaxed)
    }

    pub fn avg_send_latency_us(&self) -> u64 {
        let frames = self.frames_sent();
        if frames == 0 {
            return 0;
        }
        self.total_send_latency_us.load(Ordering::Relaxed) / frames
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_generated: self.samples_generated(),
            samples_discarded: self.samples_discarded.load(Ordering::Relaxed),
            frames_sent: self.frames_sent(),
            encoded_bytes: self.encoded_bytes.load(Ordering::Relaxed),
            compressed_bytes: self.compressed_bytes.load(Ordering::Relaxed),
            frames_stored: self.frames_stored(),
            persist_failures: self.persist_failures(),
            avg_send_latency_us: self.avg_send_latency_us(),
        }
    }
}

impl MetricsSnapshot {
    /// Compressed size over encoded size, 0.0 before the first frame
    pub fn compression_ratio(&self) -> f64 {
        if self.encoded_bytes == 0 {
            return 0.0;
        }
        self.compressed_bytes as f64 / self.encoded_bytes as f64
    }
}
