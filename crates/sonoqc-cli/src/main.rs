//! sonoqc CLI - QC measurements on captured two-channel PCM streams.
//!
//! The exit status carries the verdict: bit 0 left below minimum, bit 1
//! left above maximum, bit 2 right below minimum, bit 3 right above maximum.
//! Any error exits with [`ERROR_EXIT`].

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for configuration, input and I/O errors.
const ERROR_EXIT: u8 = 16;

#[derive(Parser)]
#[command(name = "sonoqc")]
#[command(author, version, about = "Two-channel audio path QC measurements", long_about = None)]
struct Cli {
    /// Verbose report; -vv adds info logging, -vvv debug logging
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure THD+n per channel
    Thdn(commands::thdn::ThdnArgs),

    /// Write the averaged amplitude spectrum as CSV
    Spectrum(commands::spectrum::SpectrumArgs),

    /// Measure RMS level per channel
    Rms(commands::rms::RmsArgs),
}

/// Default log filter for a `-v` count.
///
/// A single `-v` only enables the verbose measurement report, so its lines
/// are not interleaved with log output.
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 | 1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level(verbose).into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and are not failures.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(ERROR_EXIT)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_tracing(cli.verbose);

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::Thdn(args) => commands::thdn::run(args, verbose),
        Commands::Spectrum(args) => commands::spectrum::run(args),
        Commands::Rms(args) => commands::rms::run(args),
    };

    match result {
        Ok(flags) => ExitCode::from(flags.bits()),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(ERROR_EXIT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_verbose_flag_keeps_logging_quiet() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "warn");
        assert_eq!(log_level(2), "info");
        assert_eq!(log_level(3), "debug");
        assert_eq!(log_level(u8::MAX), "debug");
    }

    #[test]
    fn verbose_count_is_global() {
        let cli = Cli::try_parse_from(["sonoqc", "thdn", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
