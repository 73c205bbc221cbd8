//! Measurement configuration validation.
//!
//! Every check runs before any input is read, and all failures are reported
//! together.
//!
//! # Example
//!
//! ```rust
//! use sonoqc_config::{MeasurementConfig, ValidationError, validate_config};
//!
//! let mut config = MeasurementConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.fft_size = 1000;
//! assert_eq!(validate_config(&config), Err(ValidationError::InvalidFftSize(1000)));
//! ```

use crate::measurement::MeasurementConfig;
use sonoqc_core::{Channel, WindowKind};
use thiserror::Error;

/// Smallest accepted transform length.
pub const MIN_FFT_SIZE: usize = 4;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// FFT length is not a power of two of at least [`MIN_FFT_SIZE`].
    #[error("FFT size must be a power of two of at least {MIN_FFT_SIZE}, got {0}")]
    InvalidFftSize(usize),

    /// Sample rate is not positive and finite.
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(f32),

    /// Averaging count of zero.
    #[error("averaging count must be at least 1")]
    ZeroAverages,

    /// Sample width other than 16 or 32 bits.
    #[error("sample width must be 16 or 32 bits, got {0}")]
    UnsupportedBits(u16),

    /// A duration or skip is negative or not finite.
    #[error("'{name}' must be a non-negative number of seconds, got {value}")]
    InvalidDuration {
        /// Name of the setting.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Window name or parameters could not be parsed.
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Target frequency is negative or not finite.
    #[error("{channel} frequency must be a non-negative number of Hz, got {value}")]
    InvalidFrequency {
        /// Channel the frequency belongs to.
        channel: Channel,
        /// The rejected value.
        value: f32,
    },

    /// A limit is negative or not finite.
    #[error("{channel} limit '{name}' must be a non-negative number, got {value}")]
    InvalidLimit {
        /// Channel the limit belongs to.
        channel: Channel,
        /// Name of the limit.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Minimum limit above maximum.
    #[error("{channel} RMS minimum {min} exceeds maximum {max}")]
    InvertedLimits {
        /// Channel the limits belong to.
        channel: Channel,
        /// Minimum limit.
        min: f64,
        /// Maximum limit.
        max: f64,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check every setting of `config`.
///
/// Returns the single error found, or [`ValidationError::Multiple`] when
/// several settings are wrong.
pub fn validate_config(config: &MeasurementConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.fft_size < MIN_FFT_SIZE || !config.fft_size.is_power_of_two() {
        errors.push(ValidationError::InvalidFftSize(config.fft_size));
    }
    if !(config.sample_rate.is_finite() && config.sample_rate > 0.0) {
        errors.push(ValidationError::InvalidSampleRate(config.sample_rate));
    }
    if config.averages == 0 {
        errors.push(ValidationError::ZeroAverages);
    }
    if !matches!(config.bits, 16 | 32) {
        errors.push(ValidationError::UnsupportedBits(config.bits));
    }
    for (name, value) in [
        ("skip_seconds", config.skip_seconds),
        ("rms_duration", config.rms_duration),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(ValidationError::InvalidDuration { name, value });
        }
    }
    if let Err(e) = config.window.parse::<WindowKind>() {
        errors.push(ValidationError::InvalidWindow(e.to_string()));
    }

    for channel in Channel::ALL {
        let settings = config.channel(channel);
        if let Some(value) = settings.frequency
            && !(value.is_finite() && value >= 0.0)
        {
            errors.push(ValidationError::InvalidFrequency { channel, value });
        }
        for (name, value) in [
            ("max_thdn", settings.max_thdn),
            ("min_rms", settings.min_rms),
            ("max_rms", settings.max_rms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ValidationError::InvalidLimit {
                    channel,
                    name,
                    value,
                });
            }
        }
        if settings.min_rms > settings.max_rms {
            errors.push(ValidationError::InvertedLimits {
                channel,
                min: settings.min_rms,
                max: settings.max_rms,
            });
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&MeasurementConfig::default()), Ok(()));
    }

    #[test]
    fn fft_size_must_be_power_of_two() {
        for size in [0, 2, 3, 12, 1000] {
            let config = MeasurementConfig {
                fft_size: size,
                ..Default::default()
            };
            assert_eq!(
                validate_config(&config),
                Err(ValidationError::InvalidFftSize(size))
            );
        }
        let config = MeasurementConfig {
            fft_size: 4,
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_bad_scalars() {
        let config = MeasurementConfig {
            sample_rate: 0.0,
            averages: 0,
            bits: 24,
            skip_seconds: -1.0,
            window: "gaussian".to_string(),
            ..Default::default()
        };
        let Err(ValidationError::Multiple(errors)) = validate_config(&config) else {
            panic!("expected multiple errors");
        };
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::InvalidSampleRate(0.0)));
        assert!(errors.contains(&ValidationError::ZeroAverages));
        assert!(errors.contains(&ValidationError::UnsupportedBits(24)));
        assert!(errors.contains(&ValidationError::InvalidDuration {
            name: "skip_seconds",
            value: -1.0
        }));
    }

    #[test]
    fn rejects_bad_channel_settings() {
        let mut config = MeasurementConfig::default();
        config.left.frequency = Some(f32::NAN);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFrequency {
                channel: Channel::Left,
                ..
            }
        ));

        let mut config = MeasurementConfig::default();
        config.right.min_rms = 60.0;
        config.right.max_rms = 40.0;
        assert_eq!(
            validate_config(&config),
            Err(ValidationError::InvertedLimits {
                channel: Channel::Right,
                min: 60.0,
                max: 40.0
            })
        );

        let mut config = MeasurementConfig::default();
        config.left.max_thdn = -1.0;
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidLimit {
                name: "max_thdn",
                ..
            })
        ));
    }

    #[test]
    fn zero_frequency_means_auto_and_is_valid() {
        let mut config = MeasurementConfig::default();
        config.left.frequency = Some(0.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::ZeroAverages,
            ValidationError::UnsupportedBits(8),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: averaging count must be at least 1; sample width must be 16 or 32 bits, got 8"
        );
    }
}
