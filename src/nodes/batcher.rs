use crate::core::{Batch, Sample};

/// Accumulates samples and releases them in fixed-size batches
pub struct FrameBatcher {
    batch_size: usize,
    buffer: Vec<Sample>,
}

impl FrameBatcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    pub fn add(&mut self, sample: Sample) {
        self.buffer.push(sample);
    }

    /// Takes the oldest `batch_size` samples once that many are buffered.
    /// Anything beyond them stays buffered for the next call.
    pub fn try_take_full(&mut self) -> Option<Batch> {
        if self.batch_size == 0 || self.buffer.len() < self.batch_size {
            return None;
        }

        let rest = self.buffer.split_off(self.batch_size);
        let full = std::mem::replace(&mut self.buffer, rest);
        if self.buffer.capacity() < self.batch_size {
            self.buffer.reserve(self.batch_size - self.buffer.len());
        }
        Some(Batch::from_samples(full))
    }

    /// Drop buffered samples without producing a batch
    pub fn discard(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
