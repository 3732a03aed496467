use std::net::Ipv4Addr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;

/// A libvirt virtual network, reduced to what NIC mapping needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualNetwork {
    pub name: String,
    pub dhcp: bool,
    pub netmask: String,
    /// Network address derived from the gateway, see [`gateway_to_network`].
    pub network: String,
}

/// Errors raised while reading a libvirt network definition.
#[derive(Debug, Error)]
pub enum NetworkXmlError {
    #[error("failed to parse network XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to decode network XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("failed to decode network XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("invalid UTF-8 in network XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("network {network}: <ip> element has no {attribute} attribute")]
    MissingAttribute {
        network: String,
        attribute: &'static str,
    },
    #[error("gateway address '{0}' cannot be turned into a network address")]
    Gateway(String),
}

/// Network address for a gateway by decrementing its last octet.
///
/// This assumes the gateway is the first host of the network, which holds for
/// the usual libvirt layouts (`192.168.122.1` -> `192.168.122.0`) but is not a
/// real subnet computation.
pub fn gateway_to_network(gateway: &str) -> Result<String, NetworkXmlError> {
    let addr: Ipv4Addr = gateway
        .parse()
        .map_err(|_| NetworkXmlError::Gateway(gateway.to_string()))?;
    let [a, b, c, d] = addr.octets();
    let d = d
        .checked_sub(1)
        .ok_or_else(|| NetworkXmlError::Gateway(gateway.to_string()))?;
    Ok(Ipv4Addr::new(a, b, c, d).to_string())
}

/// Parse `virsh net-dumpxml` output.
///
/// Only the first IPv4 `<ip>` element is considered. Returns `Ok(None)` for a
/// network without one, since such a network can never be matched by address.
/// `fallback_name` is used when the document has no `<name>`.
pub fn parse_network_xml(
    xml: &str,
    fallback_name: &str,
) -> Result<Option<VirtualNetwork>, NetworkXmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut found = Collected::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = tag_name(&e)?;
                found.open(&tag, &e, &path)?;
                path.push(tag);
            }
            Event::Empty(e) => {
                let tag = tag_name(&e)?;
                found.open(&tag, &e, &path)?;
                found.close(&tag);
            }
            Event::Text(e) => {
                if path.len() == 2 && path[1] == "name" && found.name.is_none() {
                    found.name = Some(e.unescape()?.into_owned());
                }
            }
            Event::End(_) => {
                if let Some(tag) = path.pop() {
                    found.close(&tag);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let name = found.name.unwrap_or_else(|| fallback_name.to_string());
    let Some(ip) = found.ip else {
        return Ok(None);
    };
    let address = ip.address.ok_or_else(|| NetworkXmlError::MissingAttribute {
        network: name.clone(),
        attribute: "address",
    })?;
    let netmask = ip.netmask.ok_or_else(|| NetworkXmlError::MissingAttribute {
        network: name.clone(),
        attribute: "netmask",
    })?;

    Ok(Some(VirtualNetwork {
        network: gateway_to_network(&address)?,
        name,
        dhcp: found.dhcp,
        netmask,
    }))
}

#[derive(Debug, Default)]
struct Collected {
    name: Option<String>,
    ip: Option<IpElement>,
    in_first_ip: bool,
    dhcp: bool,
}

#[derive(Debug)]
struct IpElement {
    address: Option<String>,
    netmask: Option<String>,
}

impl Collected {
    /// `path` holds the tags enclosing `tag`, outermost first.
    fn open(
        &mut self,
        tag: &str,
        e: &BytesStart<'_>,
        path: &[String],
    ) -> Result<(), NetworkXmlError> {
        match tag {
            "ip" if path.len() == 1 && self.ip.is_none() => {
                if attribute(e, "family")?.as_deref() == Some("ipv6") {
                    return Ok(());
                }
                self.ip = Some(IpElement {
                    address: attribute(e, "address")?,
                    netmask: attribute(e, "netmask")?,
                });
                self.in_first_ip = true;
            }
            "dhcp" if self.in_first_ip && path.last().map(String::as_str) == Some("ip") => {
                self.dhcp = true;
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, tag: &str) {
        if tag == "ip" {
            self.in_first_ip = false;
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> Result<String, NetworkXmlError> {
    Ok(std::str::from_utf8(e.name().as_ref())?.to_string())
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>, NetworkXmlError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
