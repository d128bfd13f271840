//! `omop-survey` command-line entry point.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use survey_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_all, run_codebook, run_key, run_normalize, run_pivot, run_recode, run_scale, run_surveys,
};
use crate::summary::{print_normalization_table, print_scale_summary, print_summary, print_surveys};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let reference_dir = cli.reference_dir.as_deref();
    let outcome = match &cli.command {
        Command::Run(args) => run_all(args, reference_dir).map(|result| print_summary(&result)),
        Command::Normalize(args) => {
            run_normalize(args, reference_dir).map(|stats| print_normalization_table(&stats))
        }
        Command::Recode(args) => run_recode(args),
        Command::Pivot(args) => run_pivot(args).map(|paths| {
            for path in paths {
                println!("wrote {}", path.display());
            }
        }),
        Command::Scale(args) => run_scale(args).map(|summary| print_scale_summary(&summary)),
        Command::Surveys(args) => run_surveys(args).map(|surveys| print_surveys(&surveys)),
        Command::Codebook(args) => run_codebook(args, reference_dir),
        Command::Key { command } => run_key(command, reference_dir),
    };
    if let Err(error) = outcome {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
