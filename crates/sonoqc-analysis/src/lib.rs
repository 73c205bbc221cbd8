//! sonoqc Analysis - spectral and level measurements for audio path QC
//!
//! This crate reduces a stream of stereo frames to QC figures:
//!
//! - [`fft`] - real FFT with half-complex output packing
//! - [`spectrum`] - windowed, averaged amplitude spectrum
//! - [`thdn`] - THD+n reduction around a single fundamental
//! - [`rms`] - time-domain RMS level meter
//! - [`verdict`] - limit checks and exit-status flags
//! - [`export`] - CSV export of spectra
//! - [`measure`] - drivers that pull frames from a [`FrameSource`](sonoqc_io::FrameSource)
//!
//! ## THD+n Workflow
//!
//! ```rust
//! use sonoqc_analysis::{Limits, SpectrumAccumulator, ThdnAnalyzer, measure::measure_spectrum};
//! use sonoqc_core::Channel;
//! use sonoqc_io::{PcmReader, SampleWidth, StereoFrame, encode_frames};
//!
//! // A 4687.5 Hz tone (bin 100 at 48 kHz / 1024) on the left channel.
//! let frames = (0..1024).map(|i| {
//!     let phase = 2.0 * std::f32::consts::PI * 100.0 * i as f32 / 1024.0;
//!     StereoFrame::new(0.5 * phase.sin(), 0.0)
//! });
//! let bytes = encode_frames(frames, SampleWidth::Bits32);
//! let reader = PcmReader::new(&bytes[..], SampleWidth::Bits32);
//!
//! let spectrum = measure_spectrum(reader, SpectrumAccumulator::new(1024, 1)?, 48000.0, |_| {})?;
//! let left = ThdnAnalyzer::new().analyze(&spectrum, Channel::Left);
//!
//! assert_eq!(left.fundamental_bin, Some(100));
//! assert!(Limits::max(1.0).evaluate(Channel::Left, left.thdn_percent).is_empty());
//! # Ok::<(), sonoqc_analysis::AnalysisError>(())
//! ```

pub mod error;
pub mod export;
pub mod fft;
pub mod measure;
pub mod rms;
pub mod spectrum;
pub mod thdn;
pub mod verdict;

// Re-export main types
pub use error::{AnalysisError, Result};
pub use export::{export_spectrum_csv, write_spectrum_csv};
pub use fft::RealFft;
pub use measure::{measure_rms, measure_spectrum};
pub use rms::{RmsMeter, RmsResult};
pub use spectrum::{Spectrum, SpectrumAccumulator, bin_for_frequency, peak_bin};
pub use thdn::{ThdnAnalyzer, ThdnResult};
pub use verdict::{FailFlags, Limits};
