//! primgen feature resolver CLI.

use clap::{ColorChoice, Parser};
use primgen_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_check, run_resolve, run_template, run_types};
use crate::summary::{print_decisions, print_diagnostics, print_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Types => exit_on(run_types()),
        Command::Resolve(args) => match run_resolve(&args) {
            Ok(report) => {
                if args.show_nodes {
                    for decisions in &report.decisions {
                        print_decisions(decisions);
                    }
                }
                print_report(&report);
                if report.has_conflicts() && !args.allow_conflicts {
                    1
                } else {
                    0
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Check(args) => match run_check(&args) {
            Ok(diagnostics) => {
                print_diagnostics(&diagnostics);
                if diagnostics.is_empty() {
                    println!("No conflicting settings.");
                    0
                } else {
                    1
                }
            }
            Err(error) => report_error(&error),
        },
        Command::Template(args) => exit_on(run_template(&args)),
    };
    std::process::exit(exit_code);
}

fn exit_on(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(error) => report_error(&error),
    }
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level_filter(level_filter)
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()))
        .with_format(format)
        .with_timestamps(cli.log_timestamps)
        .with_target(cli.log_target)
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi)
}
