//! RMS level command.

use super::common::{self, InputArgs};
use clap::Args;
use serde::Serialize;
use sonoqc_analysis::{FailFlags, Limits, RmsResult, measure_rms};
use sonoqc_config::MeasurementConfig;
use sonoqc_core::Channel;

#[derive(Args, Debug)]
pub struct RmsArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Seconds of audio to measure [default: 1]
    #[arg(short, long, value_name = "SECONDS")]
    duration: Option<f32>,

    /// Minimum passing left RMS, in percent of full scale [default: 0]
    #[arg(short = 'm', long, value_name = "PERCENT")]
    left_min: Option<f64>,

    /// Minimum passing right RMS, in percent of full scale [default: 0]
    #[arg(short = 'M', long, value_name = "PERCENT")]
    right_min: Option<f64>,

    /// Maximum passing left RMS, in percent of full scale [default: 100]
    #[arg(short = 'x', long, value_name = "PERCENT")]
    left_max: Option<f64>,

    /// Maximum passing right RMS, in percent of full scale [default: 100]
    #[arg(short = 'X', long, value_name = "PERCENT")]
    right_max: Option<f64>,
}

impl RmsArgs {
    fn apply(&self, config: &mut MeasurementConfig) {
        if let Some(duration) = self.duration {
            config.rms_duration = duration;
        }
        for (channel, min, max) in [
            (Channel::Left, self.left_min, self.left_max),
            (Channel::Right, self.right_min, self.right_max),
        ] {
            let settings = config.channel_mut(channel);
            if let Some(min) = min {
                settings.min_rms = min;
            }
            if let Some(max) = max {
                settings.max_rms = max;
            }
        }
    }
}

#[derive(Serialize)]
struct RmsReport {
    sample_rate: f32,
    high_pass: bool,
    #[serde(flatten)]
    result: RmsResult,
    fail_flags: FailFlags,
}

pub fn run(args: RmsArgs) -> anyhow::Result<FailFlags> {
    let mut config = args.input.load_config()?;
    args.apply(&mut config);
    if !common::check_config(&config, args.input.print_config)? {
        return Ok(FailFlags::NONE);
    }

    let high_pass = config.high_pass_or(false);
    let source = args.input.open_source(&config, high_pass)?;
    let result = measure_rms(source, config.rms_frames())?;
    let flags = evaluate(&config, &result);

    if args.input.json {
        common::print_json(&RmsReport {
            sample_rate: config.sample_rate,
            high_pass,
            result,
            fail_flags: flags,
        })?;
    } else {
        let values: Vec<String> = config
            .channels
            .channels()
            .iter()
            .map(|&channel| format!("{:.6}", result.percent(channel)))
            .collect();
        println!("{}", values.join(","));
    }

    Ok(flags)
}

fn evaluate(config: &MeasurementConfig, result: &RmsResult) -> FailFlags {
    let mut flags = FailFlags::NONE;
    for &channel in config.channels.channels() {
        let settings = config.channel(channel);
        flags |= Limits::range(settings.min_rms, settings.max_rms)
            .evaluate(channel, result.percent(channel));
    }
    flags
}
