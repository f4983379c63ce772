//! DestinationIndex - Digest to canonical destination path

use super::ContentDigest;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Map of every distinct content digest present in the destination tree.
///
/// Holds exactly one path per digest: the first file seen with that content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationIndex {
    entries: HashMap<ContentDigest, PathBuf>,
}

impl DestinationIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the digest is already present.
    ///
    /// Returns `false` when an earlier path already owns this content.
    pub fn insert_first(&mut self, digest: ContentDigest, path: PathBuf) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(digest) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(path);
                true
            }
        }
    }

    /// Record content that was just placed into the destination
    pub fn record_copy(&mut self, digest: ContentDigest, path: PathBuf) {
        self.entries.insert(digest, path);
    }

    /// Canonical destination path carrying this content, if any
    pub fn get(&self, digest: &ContentDigest) -> Option<&Path> {
        self.entries.get(digest).map(PathBuf::as_path)
    }

    pub fn contains(&self, digest: &ContentDigest) -> bool {
        self.entries.contains_key(digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
