//! Averaged spectrum CSV command.

use super::common::{self, AnalysisArgs, InputArgs};
use anyhow::Context;
use clap::Args;
use sonoqc_analysis::{FailFlags, export_spectrum_csv, measure_spectrum, write_spectrum_csv};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SpectrumArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    analysis: AnalysisArgs,

    /// Write the CSV to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

pub fn run(args: SpectrumArgs) -> anyhow::Result<FailFlags> {
    let mut config = args.input.load_config()?;
    args.analysis.apply(&mut config);
    if !common::check_config(&config, args.input.print_config)? {
        return Ok(FailFlags::NONE);
    }
    if args.input.json {
        tracing::warn!("--json has no effect on spectrum output");
    }

    let accumulator = common::accumulator(&config)?;
    let source = args.input.open_source(&config, config.high_pass_or(false))?;

    let pb = common::pass_progress(config.averages, args.input.progress)?;
    let spectrum = measure_spectrum(source, accumulator, config.sample_rate, |pass| {
        pb.set_position(pass as u64);
    })?;
    pb.finish_and_clear();

    let channels = config.channels.channels();
    match &args.output {
        Some(path) => {
            export_spectrum_csv(&spectrum, channels, path)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), bins = spectrum.num_bins(), "spectrum written");
        }
        None => write_spectrum_csv(&spectrum, channels, std::io::stdout().lock())?,
    }

    Ok(FailFlags::NONE)
}
