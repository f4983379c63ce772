//! Font enumeration over a directory tree

use super::filter::FontFilter;
use crate::config::{normalize, Config};
use crate::types::{sort_for_processing, CandidateFile, ImportError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Options for a single font walk
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Descend into subdirectories
    pub recursive: bool,

    /// Subtree to prune entirely (a destination nested in the source)
    pub exclude: Option<PathBuf>,
}

/// Lazily walk `root` yielding allow-listed font files
///
/// Entries come out sorted by file name within each directory. Symlinks are
/// not followed into directories; a symlink to a regular file counts as a file.
/// Walk errors (permission denied, vanished entries) are logged and skipped.
pub fn walk_fonts(
    root: &Path,
    options: &WalkOptions,
    filter: &FontFilter,
) -> impl Iterator<Item = PathBuf> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .max_depth(if options.recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b));

    if let Some(excluded) = options.exclude.clone() {
        builder.filter_entry(move |entry| {
            let pruned = entry.path().starts_with(&excluded);
            if pruned && entry.path() == excluded {
                debug!("Pruning nested destination {}", excluded.display());
            }
            !pruned
        });
    }

    let filter = filter.clone();
    builder.build().filter_map(move |result| {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error during directory traversal: {}. Continuing with remaining files.", e);
                return None;
            }
        };

        let file_type = entry.file_type()?;
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file || !filter.is_font(entry.path()) {
            return None;
        }

        Some(entry.into_path())
    })
}

/// Enumerate the source tree into the deterministic processing order
///
/// When scanning recursively and the destination lies inside the source,
/// the destination subtree is excluded so previously imported files are
/// never offered back as candidates.
pub fn enumerate_candidates(
    config: &Config,
    filter: &FontFilter,
) -> Result<Vec<CandidateFile>, ImportError> {
    let source = normalize(&config.source)?;
    let destination = normalize(&config.destination)?;

    let exclude = (config.recursive && destination.starts_with(&source)).then_some(destination);
    let options = WalkOptions {
        recursive: config.recursive,
        exclude,
    };

    let mut candidates = Vec::new();
    for path in walk_fonts(&source, &options, filter) {
        match CandidateFile::from_path(&path) {
            Some(candidate) => candidates.push(candidate),
            None => warn!("Skipping font with non UTF-8 name: {}", path.display()),
        }
    }

    sort_for_processing(&mut candidates);
    Ok(candidates)
}
