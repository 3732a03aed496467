//! NIC configuration and NIC-to-network mapping for libvirt provisioning.
//!
//! Two pipelines live here, both free of process spawning:
//!
//! - **Builder path**: `--nic name=eth0;ipaddr=...` descriptors given to
//!   virt-builder are parsed ([`keyvals`]), resolved ([`nic`]), rendered as
//!   `ifcfg-*` files ([`ifcfg`]) and replaced by `--upload` arguments
//!   ([`args::builder`]).
//! - **Installer path**: NIC configs read out of a disk image by guestfish
//!   ([`guestfish`]) are matched against libvirt networks ([`network`],
//!   [`mapper`]) and `--nic-mappings` / `--auto-nic-mappings` given to
//!   virt-install are replaced by `--network` arguments ([`args::install`]).
//!
//! Running the external tools is left to the caller.

pub mod args;
pub mod disk;
pub mod error;
pub mod guestfish;
pub mod ifcfg;
pub mod keyvals;
pub mod mapper;
pub mod network;
pub mod nic;

pub use error::NicError;
pub use guestfish::DiscoveredNic;
pub use keyvals::{parse_keyvals, Separators};
pub use network::{NetworkXmlError, VirtualNetwork};
pub use nic::NicDescriptor;
