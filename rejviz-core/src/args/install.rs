//! Rewrite `--nic-mappings` / `--auto-nic-mappings` in virt-install arguments
//! into `--network` flags for NICs found in the disk image.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::scan::{self, scan, Marker, MarkerValue, Scanned};
use crate::error::NicError;
use crate::guestfish::DiscoveredNic;
use crate::keyvals::{keys_in_order, Separators};
use crate::mapper::{map_nics_auto, map_nics_manual, parse_manual_mappings, ManualMappings};
use crate::network::VirtualNetwork;

/// Explicit `name=network,...` mappings.
pub const MANUAL_MARKER: Marker = Marker {
    flag: "--nic-mappings",
    value: MarkerValue::Next,
};

/// Map every remaining image NIC by network address.
pub const AUTO_MARKER: Marker = Marker {
    flag: "--auto-nic-mappings",
    value: MarkerValue::None,
};

/// virt-install flag attaching a NIC to a network.
pub const NETWORK_FLAG: &str = "--network";

/// Whether `args` asks for any NIC mapping, i.e. whether the image must be
/// inspected at all.
pub fn has_nic_mapping_args(args: &[String]) -> bool {
    scan::contains(args, MANUAL_MARKER) || scan::contains(args, AUTO_MARKER)
}

/// Whether `--auto-nic-mappings` is present.
pub fn auto_nic_mappings_enabled(args: &[String]) -> bool {
    scan::contains(args, AUTO_MARKER)
}

/// The table from the first `--nic-mappings` value, empty if there is none.
pub fn manual_mappings_from_args(args: &[String]) -> Result<ManualMappings, NicError> {
    match scan::values(args, MANUAL_MARKER)?.first() {
        Some(value) => parse_manual_mappings(value),
        None => Ok(ManualMappings::new()),
    }
}

/// Map image NICs to networks and rewrite `args` accordingly.
///
/// The automatic pass runs only when `--auto-nic-mappings` is present; the
/// manual table is applied afterwards so it wins. Returns the rewritten
/// arguments together with the mapped NICs.
pub fn map_and_rewrite(
    args: &[String],
    nics: &[DiscoveredNic],
    networks: &[VirtualNetwork],
) -> Result<(Vec<String>, Vec<DiscoveredNic>), NicError> {
    let mut mapped = nics.to_vec();
    if auto_nic_mappings_enabled(args) {
        mapped = map_nics_auto(&mapped, networks);
    }
    mapped = map_nics_manual(&mapped, &manual_mappings_from_args(args)?);

    for nic in &mapped {
        debug!(
            "NIC {} -> {}",
            nic.name,
            nic.libvirt_network.as_deref().unwrap_or("<unmapped>")
        );
    }

    let rewritten = rewrite_install_args(args, &mapped)?;
    Ok((rewritten, mapped))
}

/// Replace the mapping flags in `args` with `--network` flags.
///
/// Every `--nic-mappings <value>` becomes one `--network` pair per NIC it
/// names, in the order named. Every `--auto-nic-mappings` becomes one pair per
/// mapped NIC not inserted yet, in image order. Other arguments are kept in
/// place.
pub fn rewrite_install_args(
    args: &[String],
    mapped: &[DiscoveredNic],
) -> Result<Vec<String>, NicError> {
    let mut inserted: BTreeSet<String> = BTreeSet::new();

    let mut manual_pass = Vec::with_capacity(args.len());
    for item in scan(args, MANUAL_MARKER) {
        match item? {
            Scanned::Plain(arg) => manual_pass.push(arg.to_string()),
            Scanned::Marker(value) => {
                let names = keys_in_order(value.unwrap_or_default(), Separators::default());
                for name in &names {
                    manual_pass.extend(network_args(nic_by_name(name, mapped)?)?);
                }
                inserted.extend(names);
            }
        }
    }

    let mut auto_pass = Vec::with_capacity(manual_pass.len());
    for item in scan(&manual_pass, AUTO_MARKER) {
        match item? {
            Scanned::Plain(arg) => auto_pass.push(arg.to_string()),
            Scanned::Marker(_) => {
                for nic in mapped {
                    if inserted.insert(nic.name.clone()) {
                        info!("Attaching NIC {} automatically", nic.name);
                        auto_pass.extend(network_args(nic)?);
                    }
                }
            }
        }
    }

    Ok(auto_pass)
}

/// `--network network=<net>,mac=<mac>,model=virtio` for one mapped NIC.
pub fn network_args(nic: &DiscoveredNic) -> Result<[String; 2], NicError> {
    let incomplete = |field| NicError::IncompleteNic {
        name: nic.name.clone(),
        field,
    };
    let network = nic
        .libvirt_network
        .as_deref()
        .ok_or_else(|| incomplete("libvirt network"))?;
    let hwaddr = nic.hwaddr.as_deref().ok_or_else(|| incomplete("HWADDR"))?;

    Ok([
        NETWORK_FLAG.to_string(),
        format!("network={network},mac={hwaddr},model=virtio"),
    ])
}

fn nic_by_name<'a>(name: &str, nics: &'a [DiscoveredNic]) -> Result<&'a DiscoveredNic, NicError> {
    nics.iter()
        .find(|nic| nic.name == name)
        .ok_or_else(|| NicError::UnknownNicReference(name.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{has_nic_mapping_args, manual_mappings_from_args, network_args, rewrite_install_args};
    use crate::error::NicError;
    use crate::guestfish::DiscoveredNic;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn mapped(name: &str, network: Option<&str>, mac: &str) -> DiscoveredNic {
        DiscoveredNic {
            name: name.to_string(),
            nic_type: Some("Ethernet".to_string()),
            hwaddr: Some(mac.to_string()),
            libvirt_network: network.map(str::to_string),
            ..DiscoveredNic::default()
        }
    }

    #[test]
    fn detects_mapping_flags() {
        assert!(has_nic_mapping_args(&args(&["--disk", "/image", "--auto-nic-mappings"])));
        assert!(has_nic_mapping_args(&args(&["--nic-mappings", "eth0=default"])));
        assert!(!has_nic_mapping_args(&args(&["--disk", "/image", "--network", "default"])));
    }

    #[test]
    fn manual_table_comes_from_first_occurrence() {
        let table = manual_mappings_from_args(&args(&[
            "--nic-mappings",
            "eth0=a,eth1=b",
            "--nic-mappings",
            "eth0=c",
        ]))
        .expect("table");
        assert_eq!(table.get("eth0").map(String::as_str), Some("a"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn manual_names_keep_their_order() {
        let nics = vec![
            mapped("eth0", Some("net0"), "52:54:00:00:00:01"),
            mapped("eth1", Some("net1"), "52:54:00:00:00:02"),
        ];
        let out = rewrite_install_args(&args(&["--nic-mappings", "eth1=net1,eth0=net0"]), &nics)
            .expect("rewrite");
        assert_eq!(
            out,
            args(&[
                "--network",
                "network=net1,mac=52:54:00:00:00:02,model=virtio",
                "--network",
                "network=net0,mac=52:54:00:00:00:01,model=virtio",
            ])
        );
    }

    #[test]
    fn auto_follows_image_order_and_skips_inserted() {
        let nics = vec![
            mapped("eth2", Some("c"), "52:54:00:00:00:03"),
            mapped("eth0", Some("a"), "52:54:00:00:00:01"),
            mapped("eth1", Some("b"), "52:54:00:00:00:02"),
        ];
        let out = rewrite_install_args(
            &args(&["--auto-nic-mappings", "--nic-mappings", "eth0=a", "--x"]),
            &nics,
        )
        .expect("rewrite");
        assert_eq!(
            out,
            args(&[
                "--network",
                "network=c,mac=52:54:00:00:00:03,model=virtio",
                "--network",
                "network=b,mac=52:54:00:00:00:02,model=virtio",
                "--network",
                "network=a,mac=52:54:00:00:00:01,model=virtio",
                "--x",
            ])
        );
    }

    #[test]
    fn repeated_auto_flag_inserts_nothing_new() {
        let nics = vec![mapped("eth0", Some("a"), "52:54:00:00:00:01")];
        let out = rewrite_install_args(
            &args(&["--auto-nic-mappings", "--auto-nic-mappings"]),
            &nics,
        )
        .expect("rewrite");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn manual_name_not_in_image_is_unknown() {
        let nics = vec![mapped("eth0", Some("a"), "52:54:00:00:00:01")];
        let err = rewrite_install_args(&args(&["--nic-mappings", "eth7=a"]), &nics)
            .expect_err("should fail");
        assert!(matches!(err, NicError::UnknownNicReference(name) if name == "eth7"));
    }

    #[test]
    fn trailing_manual_flag_is_a_syntax_error() {
        let err = rewrite_install_args(&args(&["--abc", "--nic-mappings"]), &[])
            .expect_err("should fail");
        assert!(matches!(err, NicError::ArgumentSyntax(_)));
    }

    #[test]
    fn unmapped_nic_cannot_become_a_network_flag() {
        let err = network_args(&mapped("eth3", None, "52:54:00:00:00:09")).expect_err("unmapped");
        assert!(matches!(err, NicError::IncompleteNic { name, .. } if name == "eth3"));
    }
}
