//! Error types for the netmon-discover crate.

use netmon_state::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Nmap not found at path: {path}")]
    NmapNotFound { path: String },

    #[error("Nmap exited with code {code}: {stderr}")]
    NmapFailed { code: i32, stderr: String },

    #[error("Failed to parse nmap XML output: {0}")]
    XmlParse(String),

    #[error("Persisted state is unreadable, refusing to continue: {0}")]
    StateCorrupt(#[source] StoreError),

    #[error("Failed to persist state: {0}")]
    Persist(#[source] StoreError),

    #[error("Config error: {0}")]
    Config(String),
}

impl DiscoverError {
    /// Errors that must stop the monitor rather than wait for the next tick.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StateCorrupt(_))
    }
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
