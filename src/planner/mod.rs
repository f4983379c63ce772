//! Placement planning - where (and whether) a candidate goes

use crate::scanner::DEFAULT_EXTENSION;
use crate::types::{ContentDigest, DestinationIndex, PlacementDecision};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// First version number tried when the plain name is taken
pub const FIRST_VERSION: u32 = 2;

/// Answers whether a destination name is already taken
pub trait NameOccupancy {
    fn is_occupied(&self, path: &Path) -> bool;
}

/// Occupancy as seen on the real filesystem.
///
/// Uses `symlink_metadata`, so a dangling symlink still counts as taken and
/// is never replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOccupancy;

impl NameOccupancy for FsOccupancy {
    fn is_occupied(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok()
    }
}

/// Filesystem occupancy plus names claimed by planned-but-unwritten copies
#[derive(Debug, Clone, Default)]
pub struct SimulatedOccupancy {
    claimed: HashSet<PathBuf>,
}

impl SimulatedOccupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, path: PathBuf) {
        self.claimed.insert(path);
    }
}

impl NameOccupancy for SimulatedOccupancy {
    fn is_occupied(&self, path: &Path) -> bool {
        self.claimed.contains(path) || FsOccupancy.is_occupied(path)
    }
}

/// Split a file name into stem and dotted extension (`.flf` when missing)
pub fn split_name(name: &str) -> (String, String) {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string();
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{ext}"),
        _ => DEFAULT_EXTENSION.to_string(),
    };
    (stem, ext)
}

/// Versioned file name: `{stem}_v{n:02}{ext}`
pub fn versioned_name(stem: &str, version: u32, ext: &str) -> String {
    format!("{stem}_v{version:02}{ext}")
}

/// Smallest free versioned path, scanning upward from `_v02`
pub fn next_versioned_path(
    target_dir: &Path,
    stem: &str,
    ext: &str,
    names: &impl NameOccupancy,
) -> PathBuf {
    (FIRST_VERSION..)
        .map(|n| target_dir.join(versioned_name(stem, n, ext)))
        .find(|candidate| !names.is_occupied(candidate))
        .unwrap_or_else(|| target_dir.join(versioned_name(stem, u32::MAX, ext)))
}

/// Decide the placement of one candidate
///
/// 1. Digest already indexed -> `SkipDuplicate`
/// 2. `{stem}{ext}` free in `target_dir` -> `Copy`
/// 3. Otherwise -> `CopyRenamed` to the first free `{stem}_vNN{ext}`, NN from 02
///
/// Must be called with the current index and occupancy for every candidate;
/// earlier copies in the same run change both.
///
/// # Example
/// ```
/// use figvault::planner::{plan, FsOccupancy};
/// use figvault::types::{ContentDigest, DestinationIndex, HashAlgorithm, PlacementAction};
/// use std::path::Path;
///
/// let index = DestinationIndex::new();
/// let digest = ContentDigest::new(HashAlgorithm::Blake3, [0; 32]);
/// let decision = plan(Path::new("/nonexistent/out"), "big.flf", &digest, &index, &FsOccupancy);
/// assert_eq!(decision.action, PlacementAction::Copy);
/// ```
pub fn plan(
    target_dir: &Path,
    candidate_name: &str,
    digest: &ContentDigest,
    index: &DestinationIndex,
    names: &impl NameOccupancy,
) -> PlacementDecision {
    if index.contains(digest) {
        return PlacementDecision::skip_duplicate();
    }

    let (stem, ext) = split_name(candidate_name);
    let plain = target_dir.join(format!("{stem}{ext}"));
    if !names.is_occupied(&plain) {
        return PlacementDecision::copy(plain);
    }

    PlacementDecision::copy_renamed(next_versioned_path(target_dir, &stem, &ext, names))
}
