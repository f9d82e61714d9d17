use std::collections::BTreeMap;

use super::Sample;

/// Metadata key identifying the payload encoding
pub const DATA_TYPE_KEY: &str = "data-type";

/// Metadata value for gzip payloads
pub const GZIP_DATA_TYPE: &str = "gzip";

/// Message properties sent alongside a payload
pub type Metadata = BTreeMap<String, String>;

/// Full, ordered run of samples released by the batcher
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    samples: Vec<Sample>,
}

impl Batch {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

/// Raw little-endian sample records, 20 bytes each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    bytes: Vec<u8>,
}

impl EncodedFrame {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Gzip payload ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFrame {
    bytes: Vec<u8>,
    metadata: Metadata,
}

impl CompressedFrame {
    /// Wraps gzip bytes and tags them with `data-type=gzip`
    pub fn gzip(bytes: Vec<u8>) -> Self {
        let mut metadata = Metadata::new();
        metadata.insert(DATA_TYPE_KEY.to_string(), GZIP_DATA_TYPE.to_string());
        Self { bytes, metadata }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
