//! Error types for figvault

use std::path::PathBuf;
use thiserror::Error;

/// Error types for import operations
#[derive(Debug, Error)]
pub enum ImportError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration, fatal before any file is touched
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be fingerprinted
    #[error("Read error: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A planned copy into the destination failed
    #[error("Copy error: {from} -> {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The audit log could not be opened or appended to
    #[error("Audit log error: {path}: {reason}")]
    Audit { path: PathBuf, reason: String },
}

impl ImportError {
    /// Check if this error aborts the run before any file is processed
    pub fn is_config_error(&self) -> bool {
        matches!(self, ImportError::Config(_))
    }
}
