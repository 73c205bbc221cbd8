//! Moving-average high-pass filter for DC and drift removal.
//!
//! Subtracts the mean of a circular window of `H` raw samples from the sample
//! sitting in the middle of that window. The result is a half-window delayed
//! copy of the input with everything below roughly `fs / H` removed, a linear
//! approximation of a high-pass filter with a very low cutoff.
//!
//! ```text
//! sum    += x[n] - buf[cursor]
//! buf[cursor] = x[n]
//! y      = buf[(cursor + H/2) mod H] - sum / H
//! cursor = (cursor + 1) mod H
//! ```
//!
//! The first `H - 1` samples only fill the window and produce no output.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Circular moving-average DC remover for one channel.
///
/// State is owned by the caller, one instance per channel per measurement
/// run. The running sum is kept in `f64` so that it tracks the buffered
/// values over millions of updates.
///
/// # Example
///
/// ```rust
/// use sonoqc_core::MovingAverageHighPass;
///
/// let mut filter = MovingAverageHighPass::new(8);
///
/// // Seven samples prime the window.
/// for _ in 0..7 {
///     assert_eq!(filter.process(1.0), None);
/// }
/// assert!(filter.process(1.0).unwrap().abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverageHighPass {
    buffer: Vec<f32>,
    sum: f64,
    cursor: usize,
    primed: bool,
}

impl MovingAverageHighPass {
    /// Smallest usable window length.
    pub const MIN_LEN: usize = 2;

    /// Create a filter with a window of `len` samples (at least [`Self::MIN_LEN`]).
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(Self::MIN_LEN)],
            sum: 0.0,
            cursor: 0,
            primed: false,
        }
    }

    /// Create a filter whose window spans a tenth of a second.
    pub fn for_sample_rate(sample_rate: f32) -> Self {
        Self::new(Self::len_for_sample_rate(sample_rate))
    }

    /// Window length used for a sample rate: `round(sample_rate / 10)`.
    pub fn len_for_sample_rate(sample_rate: f32) -> usize {
        let len = libm::roundf(sample_rate / 10.0);
        if len.is_finite() && len > 0.0 {
            (len as usize).max(Self::MIN_LEN)
        } else {
            Self::MIN_LEN
        }
    }

    /// Window length `H`.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always false; the window holds at least [`Self::MIN_LEN`] samples.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of raw samples consumed before the first output.
    pub fn priming_len(&self) -> usize {
        self.len() - 1
    }

    /// Whether the window has been filled and outputs are being produced.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Current running sum of the buffered samples.
    pub fn running_sum(&self) -> f64 {
        self.sum
    }

    /// Buffered raw samples in storage order.
    pub fn buffered(&self) -> &[f32] {
        &self.buffer
    }

    /// Feed one raw sample.
    ///
    /// Returns `None` while the first `H - 1` samples prime the window and
    /// the filtered, half-window delayed sample afterwards.
    #[inline]
    pub fn process(&mut self, input: f32) -> Option<f32> {
        let len = self.buffer.len();

        if !self.primed {
            self.buffer[self.cursor] = input;
            self.sum += f64::from(input);
            self.cursor += 1;
            if self.cursor == len - 1 {
                self.primed = true;
            }
            return None;
        }

        self.sum += f64::from(input) - f64::from(self.buffer[self.cursor]);
        self.buffer[self.cursor] = input;

        let centre = self.buffer[(self.cursor + len / 2) % len];
        let output = (f64::from(centre) - self.sum / len as f64) as f32;

        self.cursor = (self.cursor + 1) % len;
        Some(output)
    }

    /// Recompute the running sum exactly from the buffered samples.
    pub fn resync(&mut self) {
        self.sum = self.buffer.iter().map(|&v| f64::from(v)).sum();
    }

    /// Clear the window; the next `H - 1` samples prime it again.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.sum = 0.0;
        self.cursor = 0;
        self.primed = false;
    }
}
