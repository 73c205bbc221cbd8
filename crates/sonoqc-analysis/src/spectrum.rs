//! Averaged amplitude spectrum.
//!
//! [`SpectrumAccumulator`] windows and transforms `averages` back-to-back
//! blocks per channel and sums their normalized power per bin. The
//! normalization makes the finished amplitude independent of both the
//! transform length and the averaging count:
//!
//! ```text
//! k = 0, N/2 :  P[k] += f[k]^2                    / (N^2 * averages)
//! otherwise  :  P[k] += (f[k]^2 + f[k + N/2]^2)   / (N^2 / 4 * averages)
//! ```
//!
//! The factor 4 on interior bins folds the energy of the cosine/sine pair of
//! one physical frequency onto the scale of the unpaired DC and Nyquist bins.
//! [`SpectrumAccumulator::finish`] takes the square root of every bin.

use crate::error::{AnalysisError, Result};
use crate::fft::RealFft;
use sonoqc_core::{Channel, StereoBlock, WindowKind};
use std::ops::RangeInclusive;

/// Accumulates windowed power spectra over a fixed number of passes.
pub struct SpectrumAccumulator {
    fft: RealFft,
    window: WindowKind,
    averages: usize,
    passes: usize,
    windowed: Vec<f32>,
    coeffs: Vec<f32>,
    power: [Vec<f64>; 2],
}

impl SpectrumAccumulator {
    /// Create an accumulator for `averages` passes of `fft_size` samples.
    ///
    /// Uses the Hanning window unless changed with [`with_window`](Self::with_window).
    pub fn new(fft_size: usize, averages: usize) -> Result<Self> {
        if averages == 0 {
            return Err(AnalysisError::ZeroAverages);
        }
        let fft = RealFft::new(fft_size)?;
        let bins = fft_size / 2 + 1;

        Ok(Self {
            fft,
            window: WindowKind::Hanning,
            averages,
            passes: 0,
            windowed: vec![0.0; fft_size],
            coeffs: vec![0.0; fft_size],
            power: [vec![0.0; bins], vec![0.0; bins]],
        })
    }

    /// Set the analysis window.
    pub fn with_window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    /// Transform length.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    /// Configured averaging count.
    pub fn averages(&self) -> usize {
        self.averages
    }

    /// Passes accumulated so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Whether every configured pass has been accumulated.
    pub fn is_complete(&self) -> bool {
        self.passes == self.averages
    }

    /// Window applied before each transform.
    pub fn window(&self) -> WindowKind {
        self.window
    }

    /// Accumulate one pass from both channels of `block`.
    pub fn add_pass(&mut self, block: &StereoBlock) -> Result<()> {
        if self.is_complete() {
            return Err(AnalysisError::TooManyPasses(self.averages));
        }
        if block.len() != self.fft_size() {
            return Err(AnalysisError::length_mismatch(self.fft_size(), block.len()));
        }

        for channel in Channel::ALL {
            self.accumulate(channel, block.channel(channel))?;
        }
        self.passes += 1;
        tracing::debug!(pass = self.passes, of = self.averages, "accumulated pass");
        Ok(())
    }

    /// Accumulated (unfinished) power for one channel.
    pub fn power(&self, channel: Channel) -> &[f64] {
        &self.power[channel.index()]
    }

    /// Finish the average into an amplitude spectrum.
    ///
    /// Bins of passes never supplied count as zero.
    pub fn finish(self, sample_rate: f32) -> Spectrum {
        if !self.is_complete() {
            tracing::warn!(
                passes = self.passes,
                averages = self.averages,
                "finishing spectrum before all passes were accumulated"
            );
        }
        let fft_size = self.fft_size();
        let [left, right] = self.power.map(|bins| {
            bins.into_iter()
                .map(|p| p.sqrt() as f32)
                .collect::<Vec<f32>>()
        });
        Spectrum {
            sample_rate,
            fft_size,
            bins: [left, right],
        }
    }

    fn accumulate(&mut self, channel: Channel, samples: &[f32]) -> Result<()> {
        self.windowed.copy_from_slice(samples);
        self.window.apply(&mut self.windowed);
        self.fft.forward(&self.windowed, &mut self.coeffs)?;

        let n = self.fft_size() as f64;
        let averages = self.averages as f64;
        let edge_scale = n * n * averages;
        let interior_scale = averages * n * n / 4.0;
        let half = self.fft_size() / 2;
        let f = &self.coeffs;

        for (k, cell) in self.power[channel.index()].iter_mut().enumerate() {
            if k == 0 || k == half {
                let re = f64::from(f[k]);
                *cell += re * re / edge_scale;
            } else {
                let re = f64::from(f[k]);
                let im = f64::from(f[k + half]);
                *cell += (re * re + im * im) / interior_scale;
            }
        }
        Ok(())
    }
}

/// Finished amplitude spectrum for both channels, bins `0..=N/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    sample_rate: f32,
    fft_size: usize,
    bins: [Vec<f32>; 2],
}

impl Spectrum {
    /// Build a spectrum from precomputed amplitudes (`fft_size / 2 + 1` each).
    pub fn from_amplitudes(
        sample_rate: f32,
        fft_size: usize,
        left: Vec<f32>,
        right: Vec<f32>,
    ) -> Result<Self> {
        let bins = fft_size / 2 + 1;
        for channel in [&left, &right] {
            if channel.len() != bins {
                return Err(AnalysisError::length_mismatch(bins, channel.len()));
            }
        }
        Ok(Self {
            sample_rate,
            fft_size,
            bins: [left, right],
        })
    }

    /// Sample rate the spectrum was measured at.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Transform length `N`.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins per channel (`N/2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Bin spacing in Hz (`fs / N`).
    pub fn bin_width(&self) -> f32 {
        self.sample_rate / self.fft_size as f32
    }

    /// Centre frequency of bin `k`.
    pub fn bin_frequency(&self, k: usize) -> f32 {
        k as f32 * self.sample_rate / self.fft_size as f32
    }

    /// Nearest bin to `freq_hz`, rounding halves up.
    pub fn bin_for_frequency(&self, freq_hz: f32) -> usize {
        bin_for_frequency(freq_hz, self.bin_width())
    }

    /// Bins from `low_hz` to `high_hz` (nearest bins), clamped to Nyquist.
    pub fn band(&self, low_hz: f32, high_hz: f32) -> RangeInclusive<usize> {
        let nyquist = self.num_bins() - 1;
        let low = self.bin_for_frequency(low_hz);
        let high = self.bin_for_frequency(high_hz).min(nyquist);
        low..=high
    }

    /// Amplitudes for one channel.
    pub fn channel(&self, channel: Channel) -> &[f32] {
        &self.bins[channel.index()]
    }

}

/// Bin with the largest non-zero amplitude in `range` (first one on ties).
///
/// Bins past the end of `bins` are ignored.
pub fn peak_bin(bins: &[f32], range: RangeInclusive<usize>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for k in range {
        let Some(&amp) = bins.get(k) else { break };
        if amp > best.map_or(0.0, |(_, a)| a) {
            best = Some((k, amp));
        }
    }
    best.map(|(k, _)| k)
}

/// Nearest bin to `freq_hz` for a bin spacing, rounding halves up.
pub fn bin_for_frequency(freq_hz: f32, bin_width: f32) -> usize {
    let bin = (freq_hz / bin_width + 0.5).floor();
    if bin.is_finite() && bin > 0.0 {
        bin as usize
    } else {
        0
    }
}
