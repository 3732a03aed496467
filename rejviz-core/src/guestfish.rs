//! Reading NIC configuration out of a disk image with guestfish.
//!
//! The script produced by [`fetch_script`] echoes `@<field>` before each
//! augeas lookup and `@-----` after each interface. `-aug-get` prints nothing
//! when a key is absent, so a field line directly followed by another `@`
//! line means the value is null.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::warn;

use crate::ifcfg::{NIC_CONFIG_DIR, NIC_CONFIG_PREFIX};

/// Line closing one interface record.
pub const RECORD_SEPARATOR: &str = "@-----";

/// Record fields and the ifcfg keys they are read from.
const FETCHED_FIELDS: [(&str, &str); 5] = [
    ("type", "TYPE"),
    ("hwaddr", "HWADDR"),
    ("bootproto", "BOOTPROTO"),
    ("network", "NETWORK"),
    ("netmask", "NETMASK"),
];

/// A NIC configuration found inside a disk image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveredNic {
    pub name: String,
    #[serde(rename = "type")]
    pub nic_type: Option<String>,
    pub hwaddr: Option<String>,
    pub bootproto: Option<String>,
    pub network: Option<String>,
    pub netmask: Option<String>,
    /// Virtual network the NIC is attached to, once mapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libvirt_network: Option<String>,
}

impl DiscoveredNic {
    fn from_fields(mut fields: BTreeMap<String, Option<String>>) -> Option<Self> {
        let name = fields.remove("name").flatten()?;
        let mut take = |key: &str| fields.remove(key).flatten();
        Some(Self {
            name,
            nic_type: take("type"),
            hwaddr: take("hwaddr"),
            bootproto: take("bootproto"),
            network: take("network"),
            netmask: take("netmask"),
            libvirt_network: None,
        })
    }

    /// Whether the image configures this interface as Ethernet.
    pub fn is_ethernet(&self) -> bool {
        self.nic_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("ethernet"))
    }
}

/// NIC names from a listing of the network-scripts directory.
///
/// Keeps `ifcfg-*` entries and strips the prefix. Names containing
/// whitespace cannot be spliced into the guestfish script and are skipped.
pub fn nic_names_from_listing(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|entry| entry.trim().strip_prefix(NIC_CONFIG_PREFIX))
        .filter(|name| !name.is_empty())
        .filter(|name| {
            let usable = !name.contains(char::is_whitespace);
            if !usable {
                warn!("skipping {NIC_CONFIG_PREFIX}{name}: name contains whitespace");
            }
            usable
        })
        .map(str::to_string)
        .collect()
}

/// Build the guestfish script that prints the config of every named NIC.
pub fn fetch_script(nic_names: &[String]) -> String {
    let mut script = String::from("aug-init / 0\n");
    for name in nic_names {
        let file = format!("/files{NIC_CONFIG_DIR}/{NIC_CONFIG_PREFIX}{name}");
        // Writing into a String cannot fail.
        let _ = writeln!(script, "echo @name\necho {name}");
        for (field, key) in FETCHED_FIELDS {
            let _ = writeln!(script, "echo @{field}\n-aug-get {file}/{key}");
        }
        let _ = writeln!(script, "echo {RECORD_SEPARATOR}");
    }
    script
}

/// Parse guestfish output into NIC records, in output order.
///
/// A record still open at the end of the output is discarded, as is any
/// record without a `name`.
pub fn parse_nics_output(output: &str) -> Vec<DiscoveredNic> {
    let lines: Vec<&str> = output.lines().collect();
    let mut nics = Vec::new();
    let mut current: BTreeMap<String, Option<String>> = BTreeMap::new();

    for (idx, line) in lines.iter().enumerate() {
        if *line == RECORD_SEPARATOR {
            let fields = std::mem::take(&mut current);
            match DiscoveredNic::from_fields(fields) {
                Some(nic) => nics.push(nic),
                None => warn!("skipping NIC record without a name"),
            }
            continue;
        }

        let Some(field) = line.strip_prefix('@') else {
            continue;
        };
        let value = lines
            .get(idx + 1)
            .filter(|next| !next.is_empty() && !next.starts_with('@'))
            .map(|next| next.to_string());
        current.insert(field.to_string(), value);
    }

    nics
}

/// Keep only NICs whose type is Ethernet, which drops loopback and the like.
pub fn filter_ethernet(nics: Vec<DiscoveredNic>) -> Vec<DiscoveredNic> {
    nics.into_iter().filter(DiscoveredNic::is_ethernet).collect()
}
