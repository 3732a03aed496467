use crate::args::scan::{values, Marker, MarkerValue};
use crate::error::NicError;

/// virt-install flag describing a disk.
pub const DISK_MARKER: Marker = Marker {
    flag: "--disk",
    value: MarkerValue::NextOrJoined,
};

/// Image path named by one `--disk` value.
///
/// The path is either the leading option without `=`
/// (`/img.qcow2,bus=virtio`) or the `path=` option (`bus=virtio,path=/img`).
pub fn disk_path(value: &str) -> Option<&str> {
    value.split(',').find_map(|opt| match opt.split_once('=') {
        None if !opt.is_empty() => Some(opt),
        Some(("path", path)) if !path.is_empty() => Some(path),
        _ => None,
    })
}

/// libguestfs `-a <image>` arguments for every disk in virt-install `args`.
pub fn image_args_from_disks(args: &[String]) -> Result<Vec<String>, NicError> {
    let mut image_args = Vec::new();
    for value in values(args, DISK_MARKER)? {
        if let Some(path) = disk_path(value) {
            image_args.push("-a".to_string());
            image_args.push(path.to_string());
        }
    }
    if image_args.is_empty() {
        return Err(NicError::MissingDisk);
    }
    Ok(image_args)
}
