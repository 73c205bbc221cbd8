//! Real-input FFT with half-complex output packing.
//!
//! For `N` real samples the transform produces `N` reals:
//!
//! ```text
//! out[0]          DC
//! out[1..N/2]     real (cosine) parts of bins 1..N/2-1
//! out[N/2]        Nyquist
//! out[N/2+1..N]   imaginary (sine) parts of bins 1..N/2-1
//! ```
//!
//! so that bin `k` in `1..N/2` is the pair `(out[k], out[k + N/2])`.

use crate::error::{AnalysisError, Result};
use rustfft::{FftPlanner, num_complex::Complex};
use std::sync::Arc;

/// Power-of-two real FFT with preallocated buffers.
///
/// Built on a `rustfft` plan; the complex work buffer and scratch space are
/// allocated once and reused for every transform.
pub struct RealFft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl RealFft {
    /// Smallest supported transform length.
    pub const MIN_SIZE: usize = 4;

    /// Create a transform of `size` points.
    ///
    /// `size` must be a power of two and at least [`Self::MIN_SIZE`].
    pub fn new(size: usize) -> Result<Self> {
        if size < Self::MIN_SIZE || !size.is_power_of_two() {
            return Err(AnalysisError::InvalidFftSize(size));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            size,
        })
    }

    /// Transform length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform `input` into half-complex `output`.
    ///
    /// Both slices must be exactly [`size`](Self::size) long.
    pub fn forward(&mut self, input: &[f32], output: &mut [f32]) -> Result<()> {
        let n = self.size;
        if input.len() != n {
            return Err(AnalysisError::length_mismatch(n, input.len()));
        }
        if output.len() != n {
            return Err(AnalysisError::length_mismatch(n, output.len()));
        }

        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let half = n / 2;
        output[0] = self.buffer[0].re;
        output[half] = self.buffer[half].re;
        for k in 1..half {
            output[k] = self.buffer[k].re;
            output[k + half] = self.buffer[k].im;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rejects_invalid_sizes() {
        for size in [0, 1, 2, 3, 6, 1000] {
            assert!(
                matches!(RealFft::new(size), Err(AnalysisError::InvalidFftSize(s)) if s == size),
                "size {size} should be rejected"
            );
        }
        assert!(RealFft::new(4).is_ok());
    }

    #[test]
    fn dc_and_nyquist_land_in_edges() {
        let mut fft = RealFft::new(8).unwrap();
        let mut out = vec![0.0; 8];

        fft.forward(&[1.0; 8], &mut out).unwrap();
        assert!((out[0] - 8.0).abs() < 1e-5);
        assert!(out[1..].iter().all(|v| v.abs() < 1e-5));

        let alternating: Vec<f32> = (0..8).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        fft.forward(&alternating, &mut out).unwrap();
        assert!((out[4] - 8.0).abs() < 1e-5);
        assert!(out[0].abs() < 1e-5);
    }

    #[test]
    fn cosine_and_sine_pair_up() {
        let n = 64;
        let k = 5;
        let mut fft = RealFft::new(n).unwrap();
        let mut out = vec![0.0; n];

        let cosine: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).cos())
            .collect();
        fft.forward(&cosine, &mut out).unwrap();
        assert!((out[k] - n as f32 / 2.0).abs() < 1e-3);
        assert!(out[k + n / 2].abs() < 1e-3);

        let sine: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        fft.forward(&sine, &mut out).unwrap();
        assert!(out[k].abs() < 1e-3);
        assert!((out[k + n / 2].abs() - n as f32 / 2.0).abs() < 1e-3);
    }

    #[test]
    fn parseval_holds() {
        let n = 256;
        let mut fft = RealFft::new(n).unwrap();
        let input: Vec<f32> = (0..n).map(|i| ((i * 7919) % 97) as f32 / 97.0 - 0.5).collect();
        let mut out = vec![0.0; n];
        fft.forward(&input, &mut out).unwrap();

        let time: f64 = input.iter().map(|&x| f64::from(x * x)).sum();
        let half = n / 2;
        let mut freq = f64::from(out[0] * out[0]) + f64::from(out[half] * out[half]);
        for k in 1..half {
            freq += 2.0 * f64::from(out[k] * out[k] + out[k + half] * out[k + half]);
        }
        freq /= n as f64;

        assert!((time - freq).abs() / time < 1e-4, "{time} vs {freq}");
    }

    #[test]
    fn length_mismatch_is_reported() {
        let mut fft = RealFft::new(16).unwrap();
        let mut out = vec![0.0; 16];
        assert!(matches!(
            fft.forward(&[0.0; 8], &mut out),
            Err(AnalysisError::LengthMismatch {
                expected: 16,
                actual: 8
            })
        ));
    }
}
