//! `omnistream` command line front-end.
mod cli;
mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use engine_logging::{engine_error, LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use omnistream_engine::EngineConfig;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = PathBuf::from(DEFAULT_LOG_FILE);
    let (destination, level) = if cli.verbose {
        (LogDestination::Both(log_file), LevelFilter::Debug)
    } else {
        (LogDestination::File(log_file), LevelFilter::Info)
    };
    engine_logging::initialize(destination, level);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<commands::Outcome> {
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    commands::run(cli.command, &config, &cli.state_dir)
}
