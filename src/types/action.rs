//! PlacementDecision - What the planner decided for one candidate

use std::path::{Path, PathBuf};

/// Placement chosen by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementAction {
    /// New content, target name is free
    Copy,

    /// New content, target name taken by different content
    CopyRenamed,

    /// Content already present somewhere in the destination
    SkipDuplicate,
}

/// Planner output for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementDecision {
    pub action: PlacementAction,

    /// Resolved destination; `None` for `SkipDuplicate`
    pub destination: Option<PathBuf>,

    /// The unversioned target name was already occupied
    pub name_collision: bool,

    /// The digest was already in the index
    pub content_duplicate: bool,
}

impl PlacementDecision {
    pub fn copy(destination: PathBuf) -> Self {
        Self {
            action: PlacementAction::Copy,
            destination: Some(destination),
            name_collision: false,
            content_duplicate: false,
        }
    }

    pub fn copy_renamed(destination: PathBuf) -> Self {
        Self {
            action: PlacementAction::CopyRenamed,
            destination: Some(destination),
            name_collision: true,
            content_duplicate: false,
        }
    }

    pub fn skip_duplicate() -> Self {
        Self {
            action: PlacementAction::SkipDuplicate,
            destination: None,
            name_collision: false,
            content_duplicate: true,
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }
}
