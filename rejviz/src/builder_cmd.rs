use std::path::Path;
use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use rejviz::command_run::CommandRun;
use rejviz::config::Config;
use rejviz::scratch::ScratchDir;
use rejviz_core::args::rewrite_builder_args;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::dry_run;

/// Run virt-builder with every `--nic` replaced by an ifcfg upload.
///
/// The scratch directory holding the generated files lives exactly as long as
/// this call: it is removed after virt-builder exits, and also when the
/// arguments cannot be rewritten.
pub fn run_builder(
    config: &Config,
    dry_run: Option<OutputFormat>,
    args: Vec<String>,
) -> Result<ExitCode> {
    let scratch = ScratchDir::create(&config.scratch)?;
    let result = rewrite_and_run(config, dry_run, &args, scratch.path());
    let closed = scratch.close();
    let code = result?;
    closed?;
    Ok(code)
}

fn rewrite_and_run(
    config: &Config,
    dry_run: Option<OutputFormat>,
    args: &[String],
    scratch_dir: &Path,
) -> Result<ExitCode> {
    let rewrite = rewrite_builder_args(args, scratch_dir, config.nic.separators())
        .context("failed to process --nic arguments")?;
    for nic in &rewrite.interfaces {
        debug!("NIC {}: {:?}", nic.name, nic);
    }

    let program = &config.tools.virt_builder;
    if let Some(format) = dry_run {
        println!(
            "{}",
            dry_run::render(format, program, &rewrite.args, &rewrite.interfaces)?
        );
        return Ok(ExitCode::SUCCESS);
    }

    info!("Calling virt-builder: {} {}", program, rewrite.args.join(" "));
    Command::new(program).args(&rewrite.args).run_passthrough()
}
