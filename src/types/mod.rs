//! Core type definitions for figvault

mod action;
mod candidate;
mod digest;
mod error;
mod index;

pub use action::{PlacementAction, PlacementDecision};
pub use candidate::{sort_for_processing, CandidateFile};
pub use digest::{ContentDigest, HashAlgorithm};
pub use error::ImportError;
pub use index::DestinationIndex;
