use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

use crate::core::{CompressedFrame, EncodedFrame, Result, TelemetryError};

/// Gzip stage of the pipeline
pub struct FrameCompressor {
    level: Compression,
    max_output: Option<usize>,
}

impl Default for FrameCompressor {
    fn default() -> Self {
        Self::new(6)
    }
}

impl FrameCompressor {
    /// `level` is clamped to the gzip range 0-9
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
            max_output: None,
        }
    }

    /// Fail compression once the gzip output would exceed `limit` bytes
    pub fn with_max_output(mut self, limit: usize) -> Self {
        self.max_output = Some(limit);
        self
    }

    pub fn compress(&self, frame: &EncodedFrame) -> Result<CompressedFrame> {
        let sink = BoundedSink {
            buf: Vec::with_capacity(frame.len() / 2),
            limit: self.max_output.unwrap_or(usize::MAX),
        };
        let sink = self
            .compress_into(frame.as_bytes(), sink)
            .map_err(TelemetryError::Compression)?;
        Ok(CompressedFrame::gzip(sink.buf))
    }

    /// Writes a complete gzip member into `writer` and returns it once the
    /// trailer has been flushed.
    pub fn compress_into<W: Write>(&self, bytes: &[u8], writer: W) -> std::io::Result<W> {
        let mut encoder = GzEncoder::new(writer, self.level);
        encoder.write_all(bytes)?;
        encoder.finish()
    }
}

struct BoundedSink {
    buf: Vec<u8>,
    limit: usize,
}

impl Write for BoundedSink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len().saturating_add(data.len()) > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("compressed frame exceeds {} bytes", self.limit),
            ));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| TelemetryError::Frame(format!("gzip decode failed: {}", e)))?;
    Ok(out)
}
