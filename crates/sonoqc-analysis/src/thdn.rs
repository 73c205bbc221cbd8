//! THD+n reduction of an amplitude spectrum.
//!
//! The analysis band runs from the bin nearest 20 Hz up to Nyquist. Inside
//! it, the bins within `half_width` of the fundamental are signal and every
//! other bin is noise plus distortion:
//!
//! ```text
//! THD+n % = 100 * sqrt(Σ noise bins²) / sqrt(Σ signal bins²)
//! ```
//!
//! A spectrum without signal energy reports 100 %.

use crate::spectrum::{Spectrum, bin_for_frequency, peak_bin};
use serde::Serialize;
use sonoqc_core::Channel;

/// Per-channel THD+n measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThdnResult {
    /// Fundamental bin used for the signal band, if one was found.
    pub fundamental_bin: Option<usize>,
    /// Centre frequency of the fundamental bin in Hz.
    pub fundamental_hz: Option<f32>,
    /// Sum of squared amplitudes in the signal band.
    pub signal_power: f64,
    /// Sum of squared amplitudes outside the signal band.
    pub noise_power: f64,
    /// Signal amplitude (`sqrt(signal_power)`, 0 without signal).
    pub signal: f64,
    /// Noise plus distortion amplitude (`sqrt(noise_power)`).
    pub noise: f64,
    /// THD+n as a percentage of the signal amplitude.
    pub thdn_percent: f64,
}

impl ThdnResult {
    /// Whether a signal was detected in the signal band.
    pub fn has_signal(&self) -> bool {
        self.signal_power > 0.0
    }
}

/// THD+n analyzer for one channel of a finished spectrum.
///
/// # Example
///
/// ```rust
/// use sonoqc_analysis::{Spectrum, ThdnAnalyzer};
/// use sonoqc_core::Channel;
///
/// let mut left = vec![0.0; 513];
/// left[100] = 1.0;
/// left[300] = 0.01;
/// let spectrum = Spectrum::from_amplitudes(48000.0, 1024, left, vec![0.0; 513])?;
///
/// let result = ThdnAnalyzer::new().analyze(&spectrum, Channel::Left);
/// assert_eq!(result.fundamental_bin, Some(100));
/// assert!((result.thdn_percent - 1.0).abs() < 1e-6);
/// # Ok::<(), sonoqc_analysis::AnalysisError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThdnAnalyzer {
    half_width: usize,
    fundamental_hz: Option<f32>,
    min_frequency_hz: f32,
}

impl Default for ThdnAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ThdnAnalyzer {
    /// Bins on either side of the fundamental counted as signal by default.
    pub const DEFAULT_HALF_WIDTH: usize = 6;

    /// Lower edge of the analysis band.
    pub const MIN_FREQUENCY_HZ: f32 = 20.0;

    /// Analyzer with automatic fundamental detection.
    pub fn new() -> Self {
        Self {
            half_width: Self::DEFAULT_HALF_WIDTH,
            fundamental_hz: None,
            min_frequency_hz: Self::MIN_FREQUENCY_HZ,
        }
    }

    /// Set the signal band half-width in bins.
    pub fn with_half_width(mut self, half_width: usize) -> Self {
        self.half_width = half_width;
        self
    }

    /// Use a known fundamental frequency. `None` or `0.0` selects the
    /// strongest bin in the analysis band.
    pub fn with_fundamental(mut self, fundamental_hz: Option<f32>) -> Self {
        self.fundamental_hz = fundamental_hz.filter(|&f| f != 0.0);
        self
    }

    /// Signal band half-width in bins.
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Analyze one channel of `spectrum`.
    pub fn analyze(&self, spectrum: &Spectrum, channel: Channel) -> ThdnResult {
        self.analyze_bins(spectrum.channel(channel), spectrum.bin_width())
    }

    /// Analyze amplitude bins `0..=N/2` with the given bin spacing.
    pub fn analyze_bins(&self, amplitudes: &[f32], bin_width: f32) -> ThdnResult {
        let Some(nyquist) = amplitudes.len().checked_sub(1) else {
            return Self::reduce(None, 0.0, 0.0, bin_width);
        };
        let low = bin_for_frequency(self.min_frequency_hz, bin_width);

        let fundamental = match self.fundamental_hz {
            Some(freq) => Some(bin_for_frequency(freq, bin_width)),
            None => peak_bin(amplitudes, low..=nyquist),
        };

        let mut signal_power = 0.0f64;
        let mut noise_power = 0.0f64;
        for k in low..=nyquist {
            let power = f64::from(amplitudes[k]) * f64::from(amplitudes[k]);
            let in_band = fundamental.is_some_and(|f| k.abs_diff(f) <= self.half_width);
            if in_band {
                signal_power += power;
            } else {
                noise_power += power;
            }
        }

        tracing::debug!(
            ?fundamental,
            band_low = low,
            band_high = nyquist,
            signal_power,
            noise_power,
            "thd+n reduction"
        );
        Self::reduce(fundamental, signal_power, noise_power, bin_width)
    }

    fn reduce(
        fundamental_bin: Option<usize>,
        signal_power: f64,
        noise_power: f64,
        bin_width: f32,
    ) -> ThdnResult {
        let noise = noise_power.sqrt();
        let (signal, thdn_percent) = if signal_power > 0.0 {
            let signal = signal_power.sqrt();
            (signal, 100.0 * noise / signal)
        } else {
            (0.0, 100.0)
        };

        ThdnResult {
            fundamental_bin,
            fundamental_hz: fundamental_bin.map(|k| k as f32 * bin_width),
            signal_power,
            noise_power,
            signal,
            noise,
            thdn_percent,
        }
    }
}
