//! Host map storage — trait + JSON file implementation.
//!
//! State is a flat JSON object mapping MAC to IP. Saves go through a sibling
//! temp file that is fsynced and renamed over the target, so a failed save
//! never clobbers the previous state.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use netmon_core::HostMap;

/// Errors that can occur during state storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("State file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for host map persistence backends.
pub trait StateStore {
    /// True when no baseline exists yet. An empty backing record counts as absent.
    fn is_first_run(&self) -> bool;

    /// Read the persisted host map.
    fn load(&self) -> Result<HostMap, StoreError>;

    /// Replace the persisted host map with `hosts`.
    fn save(&self, hosts: &HostMap) -> Result<(), StoreError>;
}

/// File-system backed state store holding a single JSON document.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `results.json` -> `results.json.tmp`, in the same directory so the
    /// final rename stays on one filesystem.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StateStore for FileStateStore {
    fn is_first_run(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }

    fn load(&self) -> Result<HostMap, StoreError> {
        let json = fs::read_to_string(&self.path).map_err(|e| self.io_error(&self.path, e))?;
        let hosts: HostMap = serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            hosts = hosts.len(),
            "State loaded"
        );

        Ok(hosts)
    }

    fn save(&self, hosts: &HostMap) -> Result<(), StoreError> {
        let json = serde_json::to_vec(hosts)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(parent, e))?;
            }
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &json) {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(&temp_path, e));
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            self.io_error(&self.path, e)
        })?;

        tracing::debug!(
            path = %self.path.display(),
            hosts = hosts.len(),
            "State saved"
        );

        Ok(())
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
