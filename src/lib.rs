//! # figvault - Content-addressed font importer
//!
//! Never overwrite, never duplicate.
//!
//! Copies FIGlet/TOIlet font files from a source tree into a font library so
//! that no two files in the library share the same bytes, while a name clash
//! with different content is resolved with a `_vNN` versioned name instead of
//! an overwrite. Every decision is appended to a JSON-lines audit log.

// Module declarations
pub mod audit;
pub mod commands;
pub mod config;
pub mod executor;
pub mod hash;
pub mod logging;
pub mod planner;
pub mod scanner;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use commands::import::ImportSummary;
pub use config::Config;
pub use types::{ContentDigest, DestinationIndex, HashAlgorithm, ImportError, PlacementAction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
