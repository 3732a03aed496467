use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use rejviz::config::load_config;

mod builder_cmd;
mod cli;
mod dry_run;
mod install_cmd;

use cli::{Cli, Command};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let dry_run = cli.dry_run.then_some(cli.format);

    match cli.command {
        Command::Builder(wrapped) => builder_cmd::run_builder(&config, dry_run, wrapped.args),
        Command::Install(wrapped) => install_cmd::run_install(&config, dry_run, wrapped.args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`, `debug` with
/// `--verbose`).
fn install_tracing(verbose: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter_layer = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let format = fmt::format().without_time().with_target(false).compact();
    let fmt_layer = fmt::layer()
        .event_format(format)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
