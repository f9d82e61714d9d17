use crate::core::{Sample, Timestamp};

/// One axis of the triangular waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    pub value: f64,
    /// +1.0 while rising, -1.0 while falling
    pub direction: f64,
}

impl Oscillator {
    pub fn new(value: f64, direction: f64) -> Self {
        Self { value, direction }
    }

    /// Advance by `step` and reverse direction at the [-1, 1] bounds.
    /// The value is pinned to the bound it crosses, so accumulated
    /// rounding never carries it outside the range.
    pub fn advance(&mut self, step: f64) -> f64 {
        self.value += step * self.direction;
        if self.direction > 0.0 && self.value >= 1.0 {
            self.value = 1.0;
            self.direction = -1.0;
        } else if self.direction < 0.0 && self.value <= -1.0 {
            self.value = -1.0;
            self.direction = 1.0;
        }
        self.value
    }
}

/// Synthetic 3-axis accelerometer
pub struct SignalGenerator {
    x: Oscillator,
    y: Oscillator,
    z: Oscillator,
    step: f64,
    samples_generated: u64,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator {
    pub fn new() -> Self {
        Self::with_step(0.01)
    }

    /// Default phases with a custom per-tick increment
    pub fn with_step(step: f64) -> Self {
        Self::from_state(
            Oscillator::new(-1.0, 1.0),
            Oscillator::new(1.0, -1.0),
            Oscillator::new(0.0, 1.0),
            step,
        )
    }

    pub fn from_state(x: Oscillator, y: Oscillator, z: Oscillator, step: f64) -> Self {
        Self {
            x,
            y,
            z,
            step,
            samples_generated: 0,
        }
    }

    /// Next sample stamped with the local wall clock
    pub fn next(&mut self) -> Sample {
        self.next_at(Timestamp::now())
    }

    pub fn next_at(&mut self, timestamp: Timestamp) -> Sample {
        let x = self.x.advance(self.step);
        let y = self.y.advance(self.step);
        let z = self.z.advance(self.step);
        self.samples_generated += 1;
        Sample::new(timestamp, x, y, z)
    }

    pub fn state(&self) -> [Oscillator; 3] {
        [self.x, self.y, self.z]
    }

    pub fn samples_generated(&self) -> u64 {
        self.samples_generated
    }
}
