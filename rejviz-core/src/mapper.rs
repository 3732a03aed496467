use std::collections::BTreeMap;

use tracing::debug;

use crate::error::NicError;
use crate::guestfish::DiscoveredNic;
use crate::keyvals::{parse_keyvals, Separators};
use crate::network::VirtualNetwork;

/// NIC name to virtual network name, as given by `--nic-mappings`.
pub type ManualMappings = BTreeMap<String, String>;

/// Parse a `--nic-mappings` value such as `eth0=default,eth1=storage`.
pub fn parse_manual_mappings(value: &str) -> Result<ManualMappings, NicError> {
    parse_keyvals(value, Separators::default())
}

/// Attach each NIC to the first network whose derived address equals the
/// NIC's `NETWORK`. NICs without a network or without a match are unchanged.
pub fn map_nics_auto(nics: &[DiscoveredNic], networks: &[VirtualNetwork]) -> Vec<DiscoveredNic> {
    let mut mapped = nics.to_vec();
    for nic in &mut mapped {
        let Some(address) = nic.network.as_deref() else {
            continue;
        };
        if let Some(network) = networks.iter().find(|net| net.network == address) {
            debug!("NIC {} matches network {}", nic.name, network.name);
            nic.libvirt_network = Some(network.name.clone());
        }
    }
    mapped
}

/// Apply explicit mappings, overriding any automatic match.
pub fn map_nics_manual(nics: &[DiscoveredNic], mappings: &ManualMappings) -> Vec<DiscoveredNic> {
    let mut mapped = nics.to_vec();
    for nic in &mut mapped {
        if let Some(network) = mappings.get(&nic.name).filter(|n| !n.is_empty()) {
            nic.libvirt_network = Some(network.clone());
        }
    }
    mapped
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{map_nics_auto, map_nics_manual, parse_manual_mappings};
    use crate::guestfish::DiscoveredNic;
    use crate::network::VirtualNetwork;

    fn nic(name: &str, network: Option<&str>) -> DiscoveredNic {
        DiscoveredNic {
            name: name.to_string(),
            nic_type: Some("Ethernet".to_string()),
            network: network.map(str::to_string),
            ..DiscoveredNic::default()
        }
    }

    fn net(name: &str, network: &str) -> VirtualNetwork {
        VirtualNetwork {
            name: name.to_string(),
            dhcp: true,
            netmask: "255.255.255.0".to_string(),
            network: network.to_string(),
        }
    }

    fn mapped_to(nics: &[DiscoveredNic]) -> Vec<Option<&str>> {
        nics.iter().map(|n| n.libvirt_network.as_deref()).collect()
    }

    #[test]
    fn auto_matches_on_network_address() {
        let nics = vec![
            nic("eth0", Some("192.168.122.0")),
            nic("eth1", Some("10.0.0.0")),
            nic("eth2", None),
        ];
        let networks = vec![net("default", "192.168.122.0"), net("other", "172.16.0.0")];

        let mapped = map_nics_auto(&nics, &networks);
        assert_eq!(mapped_to(&mapped), vec![Some("default"), None, None]);
        assert_eq!(mapped_to(&nics), vec![None, None, None]);
    }

    #[test]
    fn auto_prefers_first_matching_network() {
        let nics = vec![nic("eth0", Some("10.1.0.0"))];
        let networks = vec![net("first", "10.1.0.0"), net("second", "10.1.0.0")];
        assert_eq!(mapped_to(&map_nics_auto(&nics, &networks)), vec![Some("first")]);
    }

    #[test]
    fn manual_overrides_auto() {
        let nics = map_nics_auto(
            &[nic("eth0", Some("192.168.122.0")), nic("eth1", None)],
            &[net("default", "192.168.122.0")],
        );
        let manual = parse_manual_mappings("eth0=storage").expect("parse");

        let mapped = map_nics_manual(&nics, &manual);
        assert_eq!(mapped_to(&mapped), vec![Some("storage"), None]);
    }

    #[test]
    fn manual_names_unknown_nics_harmlessly() {
        let manual = parse_manual_mappings("eth9=default").expect("parse");
        let mapped = map_nics_manual(&[nic("eth0", None)], &manual);
        assert_eq!(mapped_to(&mapped), vec![None]);
    }
}
