use std::fmt::Write as _;

use crate::nic::{Addressing, NicDescriptor};

/// Directory holding interface configuration files inside the guest.
pub const NIC_CONFIG_DIR: &str = "/etc/sysconfig/network-scripts";
/// File name prefix of interface configuration files.
pub const NIC_CONFIG_PREFIX: &str = "ifcfg-";

/// Absolute guest path of the configuration file for interface `name`.
pub fn guest_config_path(name: &str) -> String {
    format!("{NIC_CONFIG_DIR}/{NIC_CONFIG_PREFIX}{name}")
}

/// Render the `ifcfg-<name>` file body for a resolved NIC.
pub fn render(nic: &NicDescriptor) -> String {
    let mut out = String::new();
    line(&mut out, "TYPE", "Ethernet");
    line(&mut out, "BOOTPROTO", nic.bootproto());
    line(&mut out, "DEFROUTE", "yes");
    line(&mut out, "IPV4_FAILURE_FATAL", "no");
    line(&mut out, "IPV6INIT", "yes");
    line(&mut out, "IPV6_AUTOCONF", "yes");
    line(&mut out, "IPV6_DEFROUTE", "yes");
    line(&mut out, "IPV6_FAILURE_FATAL", "no");
    line(&mut out, "NAME", &nic.name);
    line(&mut out, "DEVICE", &nic.name);
    line(&mut out, "ONBOOT", "yes");
    line(&mut out, "HWADDR", &nic.hwaddr);

    if let Addressing::Static(addr) = &nic.addressing {
        line(&mut out, "IPADDR", &addr.ipaddr);
        line(&mut out, "NETWORK", &addr.network);
        line(&mut out, "NETMASK", &addr.netmask);
        line(&mut out, "BROADCAST", &addr.broadcast);
        for (key, value) in [
            ("GATEWAY", &addr.gateway),
            ("DNS1", &addr.dns1),
            ("DNS2", &addr.dns2),
        ] {
            if let Some(value) = value {
                line(&mut out, key, value);
            }
        }
    }
    out
}

fn line(out: &mut String, key: &str, value: &str) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{key}={value}");
}
