use std::fs;
use std::path::{Path, PathBuf};

use rejviz_core::Separators;
use serde::Deserialize;
use thiserror::Error;

/// Settings for the wrappers, read from an optional TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tools: Tools,
    pub libvirt: LibvirtConfig,
    pub scratch: ScratchConfig,
    pub nic: NicConfig,
}

/// Executables invoked by the wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tools {
    pub virt_builder: String,
    pub virt_install: String,
    pub guestfish: String,
    pub virt_ls: String,
    pub virsh: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            virt_builder: "virt-builder".to_string(),
            virt_install: "virt-install".to_string(),
            guestfish: "guestfish".to_string(),
            virt_ls: "virt-ls".to_string(),
            virsh: "virsh".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibvirtConfig {
    /// Connection URI handed to `virsh -c`.
    pub connect: Option<String>,
}

/// Where the builder keeps generated files while virt-builder runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScratchConfig {
    /// Parent directory; the system temp dir when unset.
    pub base_dir: Option<PathBuf>,
    pub prefix: String,
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            prefix: "rejviz-builder-".to_string(),
        }
    }
}

impl ScratchConfig {
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Separators for `--nic` descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NicConfig {
    pub item_separator: char,
    pub value_separator: char,
}

impl Default for NicConfig {
    fn default() -> Self {
        Self {
            item_separator: ';',
            value_separator: '=',
        }
    }
}

impl NicConfig {
    pub fn separators(&self) -> Separators {
        Separators {
            item: self.item_separator,
            key_value: self.value_separator,
        }
    }
}

/// Errors returned when loading a config file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load the config at `path`, or the built-in defaults when there is none.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigLoadError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw, path.display().to_string())
}

fn parse_config(raw: &str, path: String) -> Result<Config, ConfigLoadError> {
    toml::from_str(raw).map_err(|source| ConfigLoadError::Parse { path, source })
}
