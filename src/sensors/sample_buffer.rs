//! Per-signal sample accumulator with single-outlier rejection.
//!
//! A buffer is created empty at the start of a sampling phase, filled with
//! one [`RawSample`] per acquisition and consumed exactly once by
//! [`SampleBuffer::trimmed_mean`].  The highest and the lowest sample are
//! discarded (one occurrence each) before averaging, which suppresses a
//! single spike from the time-of-flight or light sensor without needing a
//! longer filter history.

use heapless::Vec;

use super::{RawSample, Signal};
use crate::error::{Error, Result};

/// Hard upper bound on samples per signal per cycle.
pub const MAX_SAMPLES: usize = 32;

#[derive(Debug, Clone)]
pub struct SampleBuffer {
    signal: Signal,
    values: Vec<f32, MAX_SAMPLES>,
}

impl SampleBuffer {
    pub fn new(signal: Signal) -> Self {
        Self {
            signal,
            values: Vec::new(),
        }
    }

    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append one acquisition.
    ///
    /// Rejects samples tagged with another signal, non-finite values and
    /// pushes beyond [`MAX_SAMPLES`].
    pub fn add(&mut self, sample: RawSample) -> Result<()> {
        if sample.signal != self.signal || !sample.value.is_finite() {
            return Err(Error::SampleRejected);
        }
        self.values
            .push(sample.value)
            .map_err(|_| Error::SampleRejected)
    }

    /// Drop one maximum and one minimum (when more than two samples are
    /// held), then return the mean rounded to `decimals` places.
    pub fn trimmed_mean(mut self, decimals: u8) -> Result<f32> {
        if self.values.is_empty() {
            return Err(Error::EmptySampleSet);
        }

        if self.values.len() > 2 {
            let hi = index_of_first(&self.values, |candidate, best| candidate > best);
            self.values.swap_remove(hi);
            let lo = index_of_first(&self.values, |candidate, best| candidate < best);
            self.values.swap_remove(lo);
        }

        let sum: f64 = self.values.iter().map(|&v| v as f64).sum();
        Ok(round_half_even(sum / self.values.len() as f64, decimals))
    }
}

/// Index of the first element that wins every `beats` comparison.
fn index_of_first(values: &[f32], beats: impl Fn(f32, f32) -> bool) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if beats(v, values[best]) {
            best = i;
        }
    }
    best
}

/// Round to `decimals` places, ties to even.
pub fn round_half_even(value: f64, decimals: u8) -> f32 {
    let scale = 10f64.powi(decimals as i32);
    ((value * scale).round_ties_even() / scale) as f32
}
