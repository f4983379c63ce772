//! Destination index construction

use super::filter::FontFilter;
use super::walker::{walk_fonts, WalkOptions};
use crate::executor::pool::{HashPool, HashResult};
use crate::hash::fingerprint_file;
use crate::types::{DestinationIndex, HashAlgorithm, ImportError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Counters from one indexing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Fonts hashed successfully
    pub indexed_files: usize,

    /// Fonts that could not be hashed (left out of the index)
    pub unreadable_files: usize,

    /// Fonts whose content matched an earlier, canonical file
    pub preexisting_duplicates: usize,

    pub duration: Duration,
}

/// Walk the whole destination root and index every font by content
///
/// Runs to completion before any source file is evaluated. The walk is
/// recursive and sorted, so on digest collisions the first file in walk
/// order stays canonical. Unreadable files are logged and treated as absent.
///
/// # Arguments
/// * `root` - Destination root (need not exist yet)
/// * `algorithm` - Hash function for the run
/// * `filter` - Font allow-list
/// * `pool` - Optional hashing pool; hashing is inline when `None`
pub fn build_destination_index(
    root: &Path,
    algorithm: HashAlgorithm,
    filter: &FontFilter,
    pool: Option<&HashPool>,
) -> Result<(DestinationIndex, IndexStats), ImportError> {
    let start = Instant::now();
    let mut index = DestinationIndex::new();
    let mut stats = IndexStats::default();

    if !root.exists() {
        return Ok((index, stats));
    }

    let options = WalkOptions {
        recursive: true,
        exclude: None,
    };
    let paths: Vec<PathBuf> = walk_fonts(root, &options, filter).collect();

    let digests: Vec<HashResult> = match pool {
        Some(pool) => {
            let (digests, pool_stats) = pool.fingerprint_ordered(&paths);
            debug!(
                "Index hashing: {} of {} file(s) on {} worker(s)",
                pool_stats.hashed, pool_stats.submitted, pool_stats.workers
            );
            digests
        }
        None => paths
            .iter()
            .map(|path| fingerprint_file(path, algorithm))
            .collect(),
    };

    for (path, digest) in paths.into_iter().zip(digests) {
        match digest {
            Ok(digest) => {
                stats.indexed_files += 1;
                if let Some(canonical) = index.get(&digest) {
                    warn!(
                        "Existing duplicate in output: {} has the same content as {}",
                        path.display(),
                        canonical.display()
                    );
                    stats.preexisting_duplicates += 1;
                    continue;
                }
                index.insert_first(digest, path);
            }
            Err(e) => {
                warn!("Failed to hash existing file, treating it as absent: {}", e);
                stats.unreadable_files += 1;
            }
        }
    }

    stats.duration = start.elapsed();
    debug!(
        "Found {} existing font(s) in output ({} distinct) in {:?}",
        stats.indexed_files,
        index.len(),
        stats.duration
    );

    Ok((index, stats))
}
