//! CandidateFile - A source file eligible for import

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A font file discovered in the source tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path in the source tree
    pub path: PathBuf,

    /// Final path component (`standard.flf`)
    pub file_name: String,

    /// Extension without the dot, as written on disk
    pub extension: Option<String>,
}

impl CandidateFile {
    /// Build a candidate from a path, `None` if it has no UTF-8 file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_string);
        Some(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
        })
    }

    /// Processing order: case-insensitive file name, full path as tie-break
    pub fn processing_order(&self, other: &Self) -> Ordering {
        self.file_name
            .to_lowercase()
            .cmp(&other.file_name.to_lowercase())
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Sort candidates into the deterministic processing order
pub fn sort_for_processing(candidates: &mut [CandidateFile]) {
    candidates.sort_by(CandidateFile::processing_order);
}
