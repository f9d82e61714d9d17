use crate::core::{Batch, EncodedFrame, Result, Sample, TelemetryError, Timestamp};

/// Bytes per encoded sample: i64 ticks + 3 x f32
pub const SAMPLE_RECORD_SIZE: usize = 8 + 3 * 4;

/// Fixed little-endian layout, no header or padding:
///
/// ```text
/// [ticks: i64][x: f32][y: f32][z: f32]  repeated per sample
/// ```
pub struct FrameEncoder;

impl FrameEncoder {
    pub fn encode(batch: &Batch) -> EncodedFrame {
        let mut buf = Vec::with_capacity(batch.len() * SAMPLE_RECORD_SIZE);
        for sample in batch.samples() {
            buf.extend_from_slice(&sample.timestamp.ticks().to_le_bytes());
            buf.extend_from_slice(&(sample.x as f32).to_le_bytes());
            buf.extend_from_slice(&(sample.y as f32).to_le_bytes());
            buf.extend_from_slice(&(sample.z as f32).to_le_bytes());
        }
        EncodedFrame::new(buf)
    }

    /// Inverse of [`FrameEncoder::encode`]; axes come back at f32 precision
    pub fn decode(bytes: &[u8]) -> Result<Vec<Sample>> {
        if bytes.len() % SAMPLE_RECORD_SIZE != 0 {
            return Err(TelemetryError::Frame(format!(
                "length {} is not a multiple of {}",
                bytes.len(),
                SAMPLE_RECORD_SIZE
            )));
        }

        let samples = bytes
            .chunks_exact(SAMPLE_RECORD_SIZE)
            .map(|record| {
                let ticks = i64::from_le_bytes(le_array(&record[0..8]));
                let x = f32::from_le_bytes(le_array(&record[8..12]));
                let y = f32::from_le_bytes(le_array(&record[12..16]));
                let z = f32::from_le_bytes(le_array(&record[16..20]));
                Sample::new(
                    Timestamp::from_ticks(ticks),
                    f64::from(x),
                    f64::from(y),
                    f64::from(z),
                )
            })
            .collect();
        Ok(samples)
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}
