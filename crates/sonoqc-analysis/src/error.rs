//! Error types for analysis operations.

use thiserror::Error;

/// Errors that can occur while setting up or running a measurement.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// FFT length is not a power of two of at least 4.
    #[error("FFT size must be a power of two of at least 4, got {0}")]
    InvalidFftSize(usize),

    /// A buffer does not match the configured transform length.
    #[error("buffer length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length the analyzer was configured for.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Averaging count of zero.
    #[error("averaging count must be at least 1")]
    ZeroAverages,

    /// More passes supplied than the accumulator was configured for.
    #[error("all {0} averaging passes have already been accumulated")]
    TooManyPasses(usize),

    /// Sample rate is not a positive finite number.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Reading the input stream failed.
    #[error(transparent)]
    Input(#[from] sonoqc_io::Error),
}

impl AnalysisError {
    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        AnalysisError::LengthMismatch { expected, actual }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
