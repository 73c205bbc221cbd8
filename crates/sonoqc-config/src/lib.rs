//! Measurement configuration for sonoqc.
//!
//! A [`MeasurementConfig`] holds everything one QC run needs: stream format,
//! transform settings, skips, per-channel targets and pass/fail limits. It
//! loads from TOML, fills unspecified fields with the defaults of the legacy
//! bench tool, and is checked with [`MeasurementConfig::validate`] before any
//! input is read.
//!
//! # Example
//!
//! ```rust
//! use sonoqc_config::{ChannelSelection, MeasurementConfig};
//!
//! let config = MeasurementConfig::from_toml(
//!     r#"
//!     fft_size = 4096
//!     averages = 4
//!     channels = "left"
//!
//!     [left]
//!     frequency = 1000.0
//!     max_thdn = 0.1
//!     "#,
//! )?;
//! config.validate()?;
//!
//! assert_eq!(config.channels, ChannelSelection::Left);
//! assert_eq!(config.left.fundamental(), Some(1000.0));
//! # Ok::<(), sonoqc_config::ConfigError>(())
//! ```

mod error;
mod measurement;

/// Configuration validation.
pub mod validation;

pub use error::ConfigError;
pub use measurement::{ChannelSelection, ChannelSettings, MeasurementConfig, ShortRead};
pub use validation::{MIN_FFT_SIZE, ValidationError, ValidationResult, validate_config};
