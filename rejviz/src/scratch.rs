use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::debug;

use crate::config::ScratchConfig;

/// Owner-only working directory for one wrapper invocation.
///
/// The directory is removed when the value is dropped; [`ScratchDir::close`]
/// does the same but reports failures.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn create(config: &ScratchConfig) -> Result<Self> {
        let base = config.base_dir();
        let dir = tempfile::Builder::new()
            .prefix(&config.prefix)
            .tempdir_in(&base)
            .with_context(|| format!("failed to create scratch directory in {}", base.display()))?;
        fs::set_permissions(dir.path(), Permissions::from_mode(0o700))
            .with_context(|| format!("chmod {}", dir.path().display()))?;
        debug!("Created scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .with_context(|| format!("failed to remove scratch directory {}", path.display()))?;
        debug!("Removed scratch directory {}", path.display());
        Ok(())
    }
}
