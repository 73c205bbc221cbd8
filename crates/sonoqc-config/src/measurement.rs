//! Measurement configuration file format.

use serde::{Deserialize, Serialize};
use sonoqc_core::{Channel, WindowKind};
use sonoqc_io::{SampleWidth, ShortReadPolicy};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::validation::{ValidationError, ValidationResult, validate_config};

/// Which channels a measurement reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelection {
    /// Left channel only.
    Left,
    /// Right channel only.
    Right,
    /// Both channels, left first.
    #[default]
    Both,
}

impl ChannelSelection {
    /// Whether `channel` is selected.
    pub fn includes(self, channel: Channel) -> bool {
        match self {
            ChannelSelection::Both => true,
            ChannelSelection::Left => channel == Channel::Left,
            ChannelSelection::Right => channel == Channel::Right,
        }
    }

    /// Selected channels in output order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            ChannelSelection::Left => &[Channel::Left],
            ChannelSelection::Right => &[Channel::Right],
            ChannelSelection::Both => &Channel::ALL,
        }
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelSelection::Left => "left",
            ChannelSelection::Right => "right",
            ChannelSelection::Both => "both",
        })
    }
}

impl FromStr for ChannelSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(ChannelSelection::Left),
            "right" | "r" => Ok(ChannelSelection::Right),
            "both" | "lr" | "stereo" => Ok(ChannelSelection::Both),
            other => Err(format!(
                "unknown channel selection '{other}' (expected left, right or both)"
            )),
        }
    }
}

/// Behaviour at end of input, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortRead {
    /// Abort the measurement.
    #[default]
    Fail,
    /// Pad missing bytes and carry on.
    Pad,
}

impl From<ShortRead> for ShortReadPolicy {
    fn from(value: ShortRead) -> Self {
        match value {
            ShortRead::Fail => ShortReadPolicy::Fail,
            ShortRead::Pad => ShortReadPolicy::Pad,
        }
    }
}

/// Per-channel analysis targets and limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    /// Fundamental frequency in Hz. Absent or `0` detects the strongest bin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f32>,

    /// Bins on either side of the fundamental counted as signal.
    pub half_width: usize,

    /// Highest passing THD+n, in percent.
    pub max_thdn: f64,

    /// Lowest passing RMS level, in percent of full scale.
    pub min_rms: f64,

    /// Highest passing RMS level, in percent of full scale.
    pub max_rms: f64,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            frequency: None,
            half_width: 6,
            max_thdn: 1.0,
            min_rms: 0.0,
            max_rms: 100.0,
        }
    }
}

impl ChannelSettings {
    /// Fundamental to search around; `None` for automatic detection.
    pub fn fundamental(&self) -> Option<f32> {
        self.frequency.filter(|&f| f > 0.0)
    }
}

/// Complete description of a measurement run.
///
/// Every field has a default, so a configuration file only needs to name
/// what differs.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000.0
/// fft_size = 16384
/// averages = 4
/// bits = 16
/// channels = "both"
/// skip_seconds = 0.5
/// window = "blackman"
///
/// [left]
/// frequency = 1000.0
/// max_thdn = 0.5
///
/// [right]
/// frequency = 1000.0
/// half_width = 8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    /// Sample rate of the stream in Hz.
    pub sample_rate: f32,

    /// Transform length per averaging pass.
    pub fft_size: usize,

    /// Number of back-to-back passes averaged.
    pub averages: usize,

    /// Seconds discarded after the byte skip, through the filter chain.
    pub skip_seconds: f32,

    /// Bytes discarded at the start of the stream.
    pub skip_bytes: u64,

    /// Sample width in bits (16 or 32).
    pub bits: u16,

    /// Channels reported.
    pub channels: ChannelSelection,

    /// Print signal and noise levels alongside THD+n.
    pub verbose: bool,

    /// Remove DC before measuring. Absent uses the command's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_pass: Option<bool>,

    /// Analysis window name, with optional parameters (`exponential:0.5`).
    pub window: String,

    /// What to do when the input ends early.
    pub short_read: ShortRead,

    /// Seconds of audio measured by the RMS meter.
    pub rms_duration: f32,

    /// Left channel settings.
    pub left: ChannelSettings,

    /// Right channel settings.
    pub right: ChannelSettings,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            fft_size: 16384,
            averages: 1,
            skip_seconds: 0.0,
            skip_bytes: 0,
            bits: 32,
            channels: ChannelSelection::Both,
            verbose: false,
            high_pass: None,
            window: WindowKind::Hanning.to_string(),
            short_read: ShortRead::Fail,
            rms_duration: 1.0,
            left: ChannelSettings::default(),
            right: ChannelSettings::default(),
        }
    }
}

impl MeasurementConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every setting. See [`validate_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Settings for one channel.
    pub fn channel(&self, channel: Channel) -> &ChannelSettings {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }

    /// Mutable settings for one channel.
    pub fn channel_mut(&mut self, channel: Channel) -> &mut ChannelSettings {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }

    /// Decoder sample width.
    pub fn sample_width(&self) -> ValidationResult<SampleWidth> {
        SampleWidth::from_bits(self.bits).map_err(|_| ValidationError::UnsupportedBits(self.bits))
    }

    /// Parsed analysis window.
    pub fn window_kind(&self) -> ValidationResult<WindowKind> {
        self.window
            .parse()
            .map_err(|e: sonoqc_core::ParseWindowError| ValidationError::InvalidWindow(e.to_string()))
    }

    /// Decoder short-read policy.
    pub fn short_read_policy(&self) -> ShortReadPolicy {
        self.short_read.into()
    }

    /// Frames discarded by the duration skip.
    pub fn skip_frames(&self) -> u64 {
        seconds_to_frames(self.skip_seconds, self.sample_rate)
    }

    /// Frames measured by the RMS meter.
    pub fn rms_frames(&self) -> u64 {
        seconds_to_frames(self.rms_duration, self.sample_rate)
    }

    /// Whether DC removal is enabled, given the command's default.
    pub fn high_pass_or(&self, default: bool) -> bool {
        self.high_pass.unwrap_or(default)
    }
}

fn seconds_to_frames(seconds: f32, sample_rate: f32) -> u64 {
    let frames = (f64::from(seconds) * f64::from(sample_rate)).round();
    if frames.is_finite() && frames > 0.0 {
        frames as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_tool() {
        let config = MeasurementConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.fft_size, 16384);
        assert_eq!(config.averages, 1);
        assert_eq!(config.bits, 32);
        assert_eq!(config.channels, ChannelSelection::Both);
        assert_eq!(config.window, "hanning");
        assert_eq!(config.left.half_width, 6);
        assert_eq!(config.right.max_thdn, 1.0);
        assert_eq!(config.rms_frames(), 48000);
        assert_eq!(config.skip_frames(), 0);
        assert_eq!(config.short_read_policy(), ShortReadPolicy::Fail);
    }

    #[test]
    fn durations_round_to_nearest_frame() {
        assert_eq!(seconds_to_frames(1.0, 48000.0), 48000);
        assert_eq!(seconds_to_frames(0.5, 44100.0), 22050);
        assert_eq!(seconds_to_frames(0.00001, 48000.0), 0);
        assert_eq!(seconds_to_frames(-1.0, 48000.0), 0);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = MeasurementConfig::from_toml(
            r#"
            fft_size = 1024
            channels = "right"
            short_read = "pad"

            [right]
            frequency = 1000.0
            "#,
        )
        .unwrap();

        assert_eq!(config.fft_size, 1024);
        assert_eq!(config.sample_rate, 48000.0);
        assert_eq!(config.channels, ChannelSelection::Right);
        assert_eq!(config.short_read_policy(), ShortReadPolicy::Pad);
        assert_eq!(config.right.fundamental(), Some(1000.0));
        assert_eq!(config.right.half_width, 6);
        assert_eq!(config.left, ChannelSettings::default());
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = MeasurementConfig {
            averages: 8,
            high_pass: Some(false),
            window: "exponential:0.5".to_string(),
            ..Default::default()
        };
        config.left.frequency = Some(997.0);

        let text = config.to_toml().unwrap();
        assert_eq!(MeasurementConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn unknown_selection_is_rejected() {
        assert!(MeasurementConfig::from_toml("channels = \"centre\"").is_err());
        assert!("centre".parse::<ChannelSelection>().is_err());
        assert_eq!("L".parse::<ChannelSelection>(), Ok(ChannelSelection::Left));
    }

    #[test]
    fn selection_channels() {
        assert_eq!(ChannelSelection::Both.channels(), &Channel::ALL);
        assert_eq!(ChannelSelection::Right.channels(), &[Channel::Right]);
        assert!(ChannelSelection::Left.includes(Channel::Left));
        assert!(!ChannelSelection::Left.includes(Channel::Right));
    }

    #[test]
    fn derived_settings() {
        let config = MeasurementConfig {
            sample_rate: 44100.0,
            skip_seconds: 0.5,
            bits: 16,
            window: "force:0.1:2".to_string(),
            ..Default::default()
        };
        assert_eq!(config.skip_frames(), 22050);
        assert_eq!(config.sample_width().unwrap(), SampleWidth::Bits16);
        assert_eq!(
            config.window_kind().unwrap(),
            WindowKind::Force {
                constant: 0.1,
                ratio: 2.0
            }
        );
        assert!(config.high_pass_or(true));
    }

    #[test]
    fn zero_frequency_is_auto() {
        let settings = ChannelSettings {
            frequency: Some(0.0),
            ..Default::default()
        };
        assert_eq!(settings.fundamental(), None);
    }
}
