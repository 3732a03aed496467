//! Enumerating libvirt virtual networks through `virsh`.

use std::process::Command;

use anyhow::{Context, Result};
use rejviz_core::network::parse_network_xml;
use rejviz_core::VirtualNetwork;
use tracing::debug;

use crate::command_run::CommandRun;
use crate::config::Config;

/// Create a virsh command with optional connection URI
fn virsh_command(config: &Config) -> Command {
    let mut cmd = Command::new(&config.tools.virsh);
    if let Some(uri) = &config.libvirt.connect {
        cmd.arg("-c").arg(uri);
    }
    cmd
}

/// All defined networks (active or not) that have an IPv4 address range.
pub fn list_networks(config: &Config) -> Result<Vec<VirtualNetwork>> {
    let names = virsh_command(config)
        .args(["net-list", "--all", "--name"])
        .run_get_string()
        .context("failed to list libvirt networks")?;

    let mut networks = Vec::new();
    for name in names.lines().map(str::trim).filter(|n| !n.is_empty()) {
        let xml = virsh_command(config)
            .args(["net-dumpxml", name])
            .run_get_string()
            .with_context(|| format!("failed to read definition of network {name}"))?;
        match parse_network_xml(&xml, name)
            .with_context(|| format!("failed to parse definition of network {name}"))?
        {
            Some(network) => {
                debug!(
                    "libvirt network {}: {}/{}",
                    network.name, network.network, network.netmask
                );
                networks.push(network);
            }
            None => debug!("libvirt network {name} has no IPv4 range, skipping"),
        }
    }
    Ok(networks)
}
