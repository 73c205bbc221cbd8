//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sonoqc_analysis::SpectrumAccumulator;
use sonoqc_config::{ChannelSelection, MeasurementConfig, ShortRead};
use sonoqc_io::{FrameSource, HighPassSource, PcmReader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Input stream, stream format and output options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Raw interleaved stereo PCM, `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,

    /// Load settings from a TOML file; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Sample rate in Hz [default: 48000]
    #[arg(short = 'r', long)]
    pub sample_rate: Option<f32>,

    /// Bits per sample, 16 or 32 [default: 32]
    #[arg(short, long)]
    pub bits: Option<u16>,

    /// Channels to measure: left, right or both [default: both]
    #[arg(short, long)]
    pub channels: Option<ChannelSelection>,

    /// Seconds of audio to discard before measuring
    #[arg(short, long, value_name = "SECONDS")]
    pub skip: Option<f32>,

    /// Bytes to discard at the start of the stream
    #[arg(short = 'e', long, value_name = "BYTES")]
    pub skip_bytes: Option<u64>,

    /// Remove DC with the moving-average high-pass filter
    #[arg(short = 'H', long, overrides_with = "no_high_pass")]
    pub high_pass: bool,

    /// Measure raw samples without DC removal
    #[arg(long, overrides_with = "high_pass")]
    pub no_high_pass: bool,

    /// Pad a truncated stream with 0xFF bytes instead of failing
    #[arg(long)]
    pub pad: bool,

    /// Show a progress bar on stderr
    #[arg(long)]
    pub progress: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

impl InputArgs {
    /// Load the configuration file (or defaults) and apply flag overrides.
    pub fn load_config(&self) -> anyhow::Result<MeasurementConfig> {
        let mut config = match &self.config {
            Some(path) => MeasurementConfig::load(path)?,
            None => MeasurementConfig::default(),
        };

        if let Some(sample_rate) = self.sample_rate {
            config.sample_rate = sample_rate;
        }
        if let Some(bits) = self.bits {
            config.bits = bits;
        }
        if let Some(channels) = self.channels {
            config.channels = channels;
        }
        if let Some(skip) = self.skip {
            config.skip_seconds = skip;
        }
        if let Some(skip_bytes) = self.skip_bytes {
            config.skip_bytes = skip_bytes;
        }
        if self.high_pass {
            config.high_pass = Some(true);
        } else if self.no_high_pass {
            config.high_pass = Some(false);
        }
        if self.pad {
            config.short_read = ShortRead::Pad;
        }
        Ok(config)
    }

    /// Open the input as a frame source positioned after both skips.
    ///
    /// The byte skip applies to the raw stream. The duration skip is taken
    /// through the high-pass filter when it is enabled, so the filter is
    /// settled by the time measurement starts.
    pub fn open_source(
        &self,
        config: &MeasurementConfig,
        high_pass: bool,
    ) -> anyhow::Result<Box<dyn FrameSource>> {
        let width = config.sample_width()?;
        let mut reader = PcmReader::new(open_input(&self.input)?, width)
            .with_policy(config.short_read_policy());
        reader
            .skip_bytes(config.skip_bytes)
            .context("failed to skip leading bytes")?;

        let mut source: Box<dyn FrameSource> = if high_pass {
            Box::new(HighPassSource::for_sample_rate(reader, config.sample_rate))
        } else {
            Box::new(reader)
        };

        let skip = config.skip_frames();
        source
            .skip_frames(skip)
            .with_context(|| format!("failed to skip {skip} leading frames"))?;

        tracing::info!(
            input = %self.input.display(),
            sample_rate = config.sample_rate,
            bits = config.bits,
            high_pass,
            skip_frames = skip,
            "input opened"
        );
        Ok(source)
    }
}

/// Transform settings shared by the spectral commands.
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// FFT length, a power of two [default: 16384]
    #[arg(short = 'p', long, value_name = "POINTS")]
    pub fft_size: Option<usize>,

    /// Number of back-to-back passes averaged [default: 1]
    #[arg(short = 'n', long)]
    pub averages: Option<usize>,

    /// Analysis window, e.g. hanning, flattop, exponential:0.5 [default: hanning]
    #[arg(long)]
    pub window: Option<String>,
}

impl AnalysisArgs {
    /// Apply flag overrides to `config`.
    pub fn apply(&self, config: &mut MeasurementConfig) {
        if let Some(fft_size) = self.fft_size {
            config.fft_size = fft_size;
        }
        if let Some(averages) = self.averages {
            config.averages = averages;
        }
        if let Some(window) = &self.window {
            config.window.clone_from(window);
        }
    }
}

/// Build the spectrum accumulator described by a validated `config`.
pub fn accumulator(config: &MeasurementConfig) -> anyhow::Result<SpectrumAccumulator> {
    Ok(SpectrumAccumulator::new(config.fft_size, config.averages)?.with_window(config.window_kind()?))
}

/// Validate `config`, printing it instead when requested.
///
/// Returns `false` when the command should stop after printing.
pub fn check_config(config: &MeasurementConfig, print: bool) -> anyhow::Result<bool> {
    config.validate()?;
    if print {
        print!("{}", config.to_toml()?);
        return Ok(false);
    }
    Ok(true)
}

/// Progress bar over averaging passes, hidden unless `enabled`.
pub fn pass_progress(passes: usize, enabled: bool) -> anyhow::Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(passes as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passes ({eta})")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_input(path: &Path) -> anyhow::Result<BufReader<Box<dyn Read>>> {
    let inner: Box<dyn Read> = if path == Path::new("-") {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed to open input '{}'", path.display()))?;
        Box::new(file)
    };
    Ok(BufReader::new(inner))
}
