use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use rejviz::command_run::CommandRun;
use rejviz::config::Config;
use rejviz::{image, libvirt};
use rejviz_core::args::install::auto_nic_mappings_enabled;
use rejviz_core::args::{has_nic_mapping_args, map_and_rewrite};
use rejviz_core::disk::image_args_from_disks;
use rejviz_core::DiscoveredNic;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::dry_run;

/// Run virt-install with NIC mapping flags turned into `--network` flags.
pub fn run_install(
    config: &Config,
    dry_run: Option<OutputFormat>,
    args: Vec<String>,
) -> Result<ExitCode> {
    let (final_args, nics) = process_nic_mappings(config, args)?;

    let program = &config.tools.virt_install;
    if let Some(format) = dry_run {
        println!("{}", dry_run::render(format, program, &final_args, &nics)?);
        return Ok(ExitCode::SUCCESS);
    }

    info!("Calling virt-install: {} {}", program, final_args.join(" "));
    Command::new(program).args(&final_args).run_passthrough()
}

/// Inspect the disk image and rewrite the mapping flags.
///
/// Without any mapping flag the arguments are returned untouched and no
/// external tool is run.
fn process_nic_mappings(
    config: &Config,
    args: Vec<String>,
) -> Result<(Vec<String>, Vec<DiscoveredNic>)> {
    if !has_nic_mapping_args(&args) {
        return Ok((args, Vec::new()));
    }

    let image_args = image_args_from_disks(&args)?;
    info!("Looking for NIC configurations in the image...");
    let nics = image::fetch_nics(&config.tools, &image_args)?;
    let names: Vec<&str> = nics.iter().map(|nic| nic.name.as_str()).collect();
    info!("NICs found: {}", names.join(", "));
    for nic in &nics {
        debug!("NIC {}: {:?}", nic.name, nic);
    }

    let networks = if auto_nic_mappings_enabled(&args) {
        libvirt::list_networks(config)?
    } else {
        Vec::new()
    };

    let (rewritten, mapped) = map_and_rewrite(&args, &nics, &networks)
        .context("failed to process NIC mapping arguments")?;
    Ok((rewritten, mapped))
}
