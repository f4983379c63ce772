//! Font file allow-list

use crate::types::ImportError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// File name patterns recognized as importable fonts (FIGlet and TOIlet)
pub const FONT_PATTERNS: &[&str] = &["*.flf", "*.tlf"];

/// Extension assumed when a candidate name carries none
pub const DEFAULT_EXTENSION: &str = ".flf";

/// Case-insensitive matcher over [`FONT_PATTERNS`]
#[derive(Debug, Clone)]
pub struct FontFilter {
    set: GlobSet,
}

impl FontFilter {
    pub fn new() -> Result<Self, ImportError> {
        Self::from_patterns(FONT_PATTERNS)
    }

    pub fn from_patterns(patterns: &[&str]) -> Result<Self, ImportError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    ImportError::Config(format!("Invalid font pattern '{}': {}", pattern, e))
                })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| ImportError::Config(format!("Failed to build font filter: {}", e)))?;
        Ok(Self { set })
    }

    /// Check the final path component against the allow-list
    pub fn is_font(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.set.is_match(Path::new(name)))
    }
}
