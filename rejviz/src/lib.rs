//! virt-builder and virt-install wrappers with NIC configuration support.
//!
//! The pure NIC logic lives in `rejviz-core`; this crate adds the parts that
//! touch the outside world:
//!
//! - [`config`]: optional TOML settings (tool paths, libvirt URI, scratch dir)
//! - [`scratch`]: owner-only scratch directory for generated `ifcfg-*` files
//! - [`command_run`]: running external tools and capturing their output
//! - [`image`]: reading NIC configs out of a disk image (virt-ls, guestfish)
//! - [`libvirt`]: listing virtual networks (virsh)

pub mod command_run;
pub mod config;
pub mod image;
pub mod libvirt;
pub mod scratch;
