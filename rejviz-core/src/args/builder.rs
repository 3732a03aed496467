//! Rewrite `--nic` descriptors in virt-builder arguments into `--upload`
//! instructions for generated `ifcfg-*` files.

use std::fs::{DirBuilder, OpenOptions};
use std::io::Write as _;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::scan::{scan, Marker, MarkerValue, Scanned};
use crate::error::NicError;
use crate::ifcfg;
use crate::keyvals::{parse_keyvals, Separators};
use crate::nic::NicDescriptor;

/// The flag this rewriter intercepts.
pub const NIC_MARKER: Marker = Marker {
    flag: "--nic",
    value: MarkerValue::NextOrJoined,
};

/// virt-builder flag used to copy a host file into the image.
pub const UPLOAD_FLAG: &str = "--upload";

/// Result of rewriting a virt-builder argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderRewrite {
    /// Arguments to hand to virt-builder.
    pub args: Vec<String>,
    /// NICs resolved from `--nic` flags, in argument order.
    pub interfaces: Vec<NicDescriptor>,
}

/// Replace every `--nic <descriptor>` / `--nic=<descriptor>` in `args`.
///
/// Each descriptor is resolved, rendered into
/// `<scratch_dir>/etc/sysconfig/network-scripts/ifcfg-<name>`, and replaced by
/// `--upload <file>:/etc/sysconfig/network-scripts/ifcfg-<name>`. All other
/// arguments keep their position.
pub fn rewrite_builder_args(
    args: &[String],
    scratch_dir: &Path,
    separators: Separators,
) -> Result<BuilderRewrite, NicError> {
    let mut rewritten = Vec::with_capacity(args.len());
    let mut interfaces = Vec::new();

    for item in scan(args, NIC_MARKER) {
        match item? {
            Scanned::Plain(arg) => rewritten.push(arg.to_string()),
            Scanned::Marker(value) => {
                let descriptor = value.unwrap_or_default();
                let nic = NicDescriptor::resolve(&parse_keyvals(descriptor, separators)?)?;
                let guest_path = ifcfg::guest_config_path(&nic.name);
                let host_path = write_nic_config(scratch_dir, &guest_path, &nic)?;
                debug!("NIC {}: wrote {}", nic.name, host_path.display());

                rewritten.push(UPLOAD_FLAG.to_string());
                rewritten.push(format!("{}:{guest_path}", host_path.display()));
                interfaces.push(nic);
            }
        }
    }

    Ok(BuilderRewrite {
        args: rewritten,
        interfaces,
    })
}

/// Write the rendered config under `scratch_dir`, mirroring `guest_path`.
fn write_nic_config(
    scratch_dir: &Path,
    guest_path: &str,
    nic: &NicDescriptor,
) -> Result<PathBuf, NicError> {
    let host_path = scratch_dir.join(guest_path.trim_start_matches('/'));
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| NicError::Io { path, source }
    };

    if let Some(parent) = host_path.parent() {
        DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(parent)
            .map_err(io_err(parent))?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(&host_path)
        .map_err(io_err(&host_path))?;
    file.write_all(ifcfg::render(nic).as_bytes())
        .map_err(io_err(&host_path))?;

    Ok(host_path)
}
