use pretty_assertions::assert_eq;
use rejviz_core::args::map_and_rewrite;
use rejviz_core::{DiscoveredNic, NicError, VirtualNetwork};

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn image_nic(name: &str, mac: &str, network: Option<&str>) -> DiscoveredNic {
    DiscoveredNic {
        name: name.to_string(),
        nic_type: Some("Ethernet".to_string()),
        hwaddr: Some(mac.to_string()),
        bootproto: Some(if network.is_some() { "static" } else { "dhcp" }.to_string()),
        network: network.map(str::to_string),
        netmask: network.map(|_| "255.255.255.0".to_string()),
        libvirt_network: None,
    }
}

fn libvirt_net(name: &str, network: &str) -> VirtualNetwork {
    VirtualNetwork {
        name: name.to_string(),
        dhcp: false,
        netmask: "255.255.255.0".to_string(),
        network: network.to_string(),
    }
}

#[test]
fn manual_then_auto_mappings_become_network_flags() {
    let nics = vec![
        image_nic("eth0", "52:54:00:12:34:56", None),
        image_nic("eth1", "52:54:00:12:34:78", Some("192.168.123.0")),
    ];
    let networks = vec![
        libvirt_net("default", "192.168.122.0"),
        libvirt_net("net1", "192.168.123.0"),
    ];
    let input = args(&[
        "--abc",
        "--nic-mappings",
        "eth0=net0",
        "--auto-nic-mappings",
        "--def",
    ]);

    let (rewritten, mapped) = map_and_rewrite(&input, &nics, &networks).expect("rewrite");

    assert_eq!(
        rewritten,
        args(&[
            "--abc",
            "--network",
            "network=net0,mac=52:54:00:12:34:56,model=virtio",
            "--network",
            "network=net1,mac=52:54:00:12:34:78,model=virtio",
            "--def",
        ])
    );
    let targets: Vec<Option<&str>> = mapped
        .iter()
        .map(|n| n.libvirt_network.as_deref())
        .collect();
    assert_eq!(targets, vec![Some("net0"), Some("net1")]);
    assert_eq!(nics[1].libvirt_network, None);
}

#[test]
fn auto_matching_is_skipped_without_auto_flag() {
    let nics = vec![
        image_nic("eth0", "52:54:00:12:34:56", None),
        image_nic("eth1", "52:54:00:12:34:78", Some("192.168.123.0")),
    ];
    let networks = vec![libvirt_net("net1", "192.168.123.0")];

    let (rewritten, mapped) =
        map_and_rewrite(&args(&["--nic-mappings", "eth0=net0"]), &nics, &networks)
            .expect("rewrite");

    assert_eq!(
        rewritten,
        args(&["--network", "network=net0,mac=52:54:00:12:34:56,model=virtio"])
    );
    assert_eq!(mapped[1].libvirt_network, None);
}

#[test]
fn manual_mapping_overrides_address_match() {
    let nics = vec![image_nic("eth1", "52:54:00:12:34:78", Some("192.168.123.0"))];
    let networks = vec![libvirt_net("net1", "192.168.123.0")];

    let (rewritten, _) = map_and_rewrite(
        &args(&["--auto-nic-mappings", "--nic-mappings", "eth1=storage"]),
        &nics,
        &networks,
    )
    .expect("rewrite");

    assert_eq!(
        rewritten,
        args(&["--network", "network=storage,mac=52:54:00:12:34:78,model=virtio"])
    );
}

#[test]
fn auto_with_unmatched_nic_fails() {
    let nics = vec![image_nic("eth0", "52:54:00:12:34:56", None)];

    let err = map_and_rewrite(&args(&["--auto-nic-mappings"]), &nics, &[])
        .expect_err("eth0 has no network");

    assert!(matches!(err, NicError::IncompleteNic { name, .. } if name == "eth0"));
}

#[test]
fn malformed_manual_mapping_is_rejected() {
    let err = map_and_rewrite(&args(&["--nic-mappings", "eth0"]), &[], &[])
        .expect_err("no '=' in mapping");
    assert!(matches!(err, NicError::MalformedDescriptor(_)));
}
