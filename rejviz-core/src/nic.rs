//! Declarative NIC descriptors for the builder path.
//!
//! A descriptor arrives as a raw key-value map (`name=eth0;ipaddr=10.0.0.5`)
//! and is resolved into a [`NicDescriptor`]: a hardware address is generated
//! when missing, the boot protocol is defaulted, and for static addressing the
//! network, netmask and broadcast addresses are derived from the IP address
//! assuming a `/24` network.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::error::NicError;

/// Locally administered prefix reserved for KVM/QEMU guests.
pub const KVM_MAC_PREFIX: &str = "52:54:00";

const DEFAULT_NETMASK: &str = "255.255.255.0";

/// A fully resolved NIC description, ready to be rendered as `ifcfg-<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NicDescriptor {
    pub name: String,
    pub hwaddr: String,
    #[serde(flatten)]
    pub addressing: Addressing,
}

/// How the interface obtains its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "bootproto", rename_all = "lowercase")]
pub enum Addressing {
    Dhcp,
    Static(StaticAddress),
}

/// Static IPv4 settings. Only present when `bootproto=static`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticAddress {
    pub ipaddr: String,
    pub network: String,
    pub netmask: String,
    pub broadcast: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns2: Option<String>,
}

impl NicDescriptor {
    /// Resolve a raw key-value descriptor, filling in defaults.
    ///
    /// Fails with [`NicError::MalformedDescriptor`] when `name` is missing or
    /// not a plain file name component, or when `bootproto=static` is
    /// requested without an `ipaddr`. Any boot
    /// protocol other than `static` resolves to DHCP, and the static-only
    /// fields are dropped.
    pub fn resolve(raw: &BTreeMap<String, String>) -> Result<Self, NicError> {
        let name = field(raw, "name")
            .ok_or_else(|| NicError::MalformedDescriptor("NIC has no name".to_string()))?;
        check_name(name)?;
        let name = name.to_string();

        let hwaddr = match field(raw, "hwaddr") {
            Some(hwaddr) => hwaddr.to_string(),
            None => generate_hwaddr(),
        };

        let ipaddr = field(raw, "ipaddr");
        // An explicit but empty bootproto is not "absent": it falls back to DHCP.
        let bootproto = match raw.get("bootproto") {
            Some(bootproto) => Some(bootproto.as_str()),
            None => ipaddr.map(|_| "static"),
        };

        let addressing = if bootproto == Some("static") {
            let ipaddr = ipaddr.ok_or_else(|| {
                NicError::MalformedDescriptor(format!(
                    "NIC '{name}' uses bootproto=static but has no ipaddr"
                ))
            })?;
            let prefix = address_prefix(ipaddr);
            Addressing::Static(StaticAddress {
                ipaddr: ipaddr.to_string(),
                network: owned_or(raw, "network", || format!("{prefix}0")),
                netmask: owned_or(raw, "netmask", || DEFAULT_NETMASK.to_string()),
                broadcast: owned_or(raw, "broadcast", || format!("{prefix}255")),
                gateway: field(raw, "gateway").map(str::to_string),
                dns1: field(raw, "dns1").map(str::to_string),
                dns2: field(raw, "dns2").map(str::to_string),
            })
        } else {
            Addressing::Dhcp
        };

        Ok(Self {
            name,
            hwaddr,
            addressing,
        })
    }

    /// The `BOOTPROTO` value for this interface.
    pub fn bootproto(&self) -> &'static str {
        match self.addressing {
            Addressing::Dhcp => "dhcp",
            Addressing::Static(_) => "static",
        }
    }

    /// Flatten back into the raw key-value form accepted by [`resolve`].
    ///
    /// [`resolve`]: NicDescriptor::resolve
    pub fn to_keyvals(&self) -> BTreeMap<String, String> {
        let mut raw = BTreeMap::new();
        raw.insert("name".to_string(), self.name.clone());
        raw.insert("hwaddr".to_string(), self.hwaddr.clone());
        raw.insert("bootproto".to_string(), self.bootproto().to_string());
        if let Addressing::Static(addr) = &self.addressing {
            raw.insert("ipaddr".to_string(), addr.ipaddr.clone());
            raw.insert("network".to_string(), addr.network.clone());
            raw.insert("netmask".to_string(), addr.netmask.clone());
            raw.insert("broadcast".to_string(), addr.broadcast.clone());
            for (key, value) in [
                ("gateway", &addr.gateway),
                ("dns1", &addr.dns1),
                ("dns2", &addr.dns2),
            ] {
                if let Some(value) = value {
                    raw.insert(key.to_string(), value.clone());
                }
            }
        }
        raw
    }
}

/// Generate a MAC address under [`KVM_MAC_PREFIX`] with a random suffix.
pub fn generate_hwaddr() -> String {
    let mut rng = rand::rng();
    let suffix: [u8; 3] = rng.random();
    format!(
        "{KVM_MAC_PREFIX}:{:02x}:{:02x}:{:02x}",
        suffix[0], suffix[1], suffix[2]
    )
}

/// Reject names that would leave `network-scripts` or break the
/// `host:guest` upload pair.
fn check_name(name: &str) -> Result<(), NicError> {
    if name == "." || name == ".." || name.contains(['/', ':', '\0']) {
        return Err(NicError::MalformedDescriptor(format!(
            "invalid NIC name '{}'",
            name.escape_default()
        )));
    }
    Ok(())
}

/// Everything up to and including the last dot: `192.168.1.10` -> `192.168.1.`.
fn address_prefix(ipaddr: &str) -> &str {
    match ipaddr.rfind('.') {
        Some(idx) => &ipaddr[..=idx],
        None => "",
    }
}

fn field<'a>(raw: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    raw.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn owned_or(
    raw: &BTreeMap<String, String>,
    key: &str,
    default: impl FnOnce() -> String,
) -> String {
    field(raw, key).map_or_else(default, str::to_string)
}
