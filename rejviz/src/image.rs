//! Inspecting a guest disk image with libguestfs tools.

use std::process::Command;

use anyhow::{Context, Result};
use rejviz_core::guestfish::{
    fetch_script, filter_ethernet, nic_names_from_listing, parse_nics_output,
};
use rejviz_core::ifcfg::NIC_CONFIG_DIR;
use rejviz_core::DiscoveredNic;
use tracing::debug;

use crate::command_run::CommandRun;
use crate::config::Tools;

/// Names of interfaces with an `ifcfg-*` file in the image.
pub fn list_nic_names(tools: &Tools, image_args: &[String]) -> Result<Vec<String>> {
    let listing = Command::new(&tools.virt_ls)
        .args(image_args)
        .arg(NIC_CONFIG_DIR)
        .run_get_string()
        .with_context(|| format!("failed to list {NIC_CONFIG_DIR} in the image"))?;
    Ok(nic_names_from_listing(&listing))
}

/// Ethernet NICs configured in the image, in the order the image lists them.
pub fn fetch_nics(tools: &Tools, image_args: &[String]) -> Result<Vec<DiscoveredNic>> {
    let names = list_nic_names(tools, image_args)?;
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let script = fetch_script(&names);
    debug!("guestfish script:\n{script}");
    let output = Command::new(&tools.guestfish)
        .args(["-i", "--ro"])
        .args(image_args)
        .run_with_stdin(&script)
        .context("failed to read NIC configuration with guestfish")?;
    debug!("guestfish returned:\n{output}");

    Ok(filter_ethernet(parse_nics_output(&output)))
}
