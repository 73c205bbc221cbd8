//! THD+n measurement command.

use super::common::{self, AnalysisArgs, InputArgs};
use clap::Args;
use serde::Serialize;
use sonoqc_analysis::{FailFlags, Limits, Spectrum, ThdnAnalyzer, ThdnResult, measure_spectrum};
use sonoqc_config::MeasurementConfig;
use sonoqc_core::Channel;

#[derive(Args, Debug)]
pub struct ThdnArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    analysis: AnalysisArgs,

    /// Fundamental frequency for both channels in Hz, 0 for auto
    #[arg(long, value_name = "HZ")]
    freq: Option<f32>,

    /// Left fundamental frequency in Hz, 0 for auto
    #[arg(short = 'f', long, value_name = "HZ")]
    left_freq: Option<f32>,

    /// Right fundamental frequency in Hz, 0 for auto
    #[arg(short = 'F', long, value_name = "HZ")]
    right_freq: Option<f32>,

    /// Bins on either side of the fundamental counted as signal [default: 6]
    #[arg(short = 'w', long, value_name = "BINS")]
    half_width: Option<usize>,

    /// Maximum passing THD+n for both channels, in percent
    #[arg(long, value_name = "PERCENT")]
    max: Option<f64>,

    /// Maximum passing left THD+n, in percent [default: 1]
    #[arg(short = 'x', long, value_name = "PERCENT")]
    left_max: Option<f64>,

    /// Maximum passing right THD+n, in percent [default: 1]
    #[arg(short = 'X', long, value_name = "PERCENT")]
    right_max: Option<f64>,
}

impl ThdnArgs {
    fn apply(&self, config: &mut MeasurementConfig) {
        self.analysis.apply(config);
        for channel in Channel::ALL {
            let (freq, max) = match channel {
                Channel::Left => (self.left_freq, self.left_max),
                Channel::Right => (self.right_freq, self.right_max),
            };
            let settings = config.channel_mut(channel);
            if let Some(freq) = freq.or(self.freq) {
                settings.frequency = Some(freq);
            }
            if let Some(max) = max.or(self.max) {
                settings.max_thdn = max;
            }
            if let Some(half_width) = self.half_width {
                settings.half_width = half_width;
            }
        }
    }
}

#[derive(Serialize)]
struct ChannelReport {
    channel: &'static str,
    #[serde(flatten)]
    result: ThdnResult,
    max_thdn: f64,
    pass: bool,
}

#[derive(Serialize)]
struct ThdnReport {
    sample_rate: f32,
    fft_size: usize,
    averages: usize,
    window: String,
    high_pass: bool,
    channels: Vec<ChannelReport>,
    fail_flags: FailFlags,
}

pub fn run(args: ThdnArgs, verbose: bool) -> anyhow::Result<FailFlags> {
    let mut config = args.input.load_config()?;
    args.apply(&mut config);
    config.verbose |= verbose;
    if !common::check_config(&config, args.input.print_config)? {
        return Ok(FailFlags::NONE);
    }

    let high_pass = config.high_pass_or(true);
    let accumulator = common::accumulator(&config)?;
    let source = args.input.open_source(&config, high_pass)?;

    let pb = common::pass_progress(config.averages, args.input.progress)?;
    let spectrum = measure_spectrum(source, accumulator, config.sample_rate, |pass| {
        pb.set_position(pass as u64);
    })?;
    pb.finish_and_clear();

    let (reports, flags) = evaluate(&config, &spectrum);

    if args.input.json {
        common::print_json(&ThdnReport {
            sample_rate: config.sample_rate,
            fft_size: config.fft_size,
            averages: config.averages,
            window: config.window.clone(),
            high_pass,
            channels: reports,
            fail_flags: flags,
        })?;
    } else if config.verbose {
        for report in &reports {
            eprintln!(
                "{:<5}  Signal: {:7.5}   HD+n: {:7.5}",
                report.channel, report.result.signal, report.result.noise
            );
        }
        for report in &reports {
            eprintln!("{:<5} THD+n: {:7.3}%", report.channel, report.result.thdn_percent);
        }
    } else {
        let values: Vec<String> = reports
            .iter()
            .map(|r| format!("{:7.3}", r.result.thdn_percent))
            .collect();
        println!("{}", values.join(","));
    }

    Ok(flags)
}

fn evaluate(config: &MeasurementConfig, spectrum: &Spectrum) -> (Vec<ChannelReport>, FailFlags) {
    let mut flags = FailFlags::NONE;
    let mut reports = Vec::new();

    for &channel in config.channels.channels() {
        let settings = config.channel(channel);
        let result = ThdnAnalyzer::new()
            .with_half_width(settings.half_width)
            .with_fundamental(settings.fundamental())
            .analyze(spectrum, channel);
        let verdict = Limits::max(settings.max_thdn).evaluate(channel, result.thdn_percent);
        tracing::info!(
            %channel,
            fundamental_bin = ?result.fundamental_bin,
            thdn_percent = result.thdn_percent,
            "thd+n measured"
        );

        flags |= verdict;
        reports.push(ChannelReport {
            channel: channel.name(),
            result,
            max_thdn: settings.max_thdn,
            pass: verdict.is_empty(),
        });
    }
    (reports, flags)
}
