use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving NIC descriptors or rewriting wrapped tool
/// arguments.
#[derive(Debug, Error)]
pub enum NicError {
    /// A key-value string or NIC descriptor could not be understood.
    #[error("malformed NIC descriptor: {0}")]
    MalformedDescriptor(String),
    /// A NIC name was referenced that is not among the NICs found in the image.
    #[error("NIC with name '{0}' not found")]
    UnknownNicReference(String),
    /// A flag that requires a value was the last argument.
    #[error("flag {0} requires a value")]
    ArgumentSyntax(String),
    /// A NIC selected for a `--network` flag lacks a field the flag needs.
    #[error("NIC '{name}' has no {field}; cannot build a --network argument")]
    IncompleteNic { name: String, field: &'static str },
    /// NIC mapping was requested but no `--disk` names an image to inspect.
    #[error("NIC mapping requires a --disk argument with an image path")]
    MissingDisk,
    /// Writing a generated interface configuration file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
