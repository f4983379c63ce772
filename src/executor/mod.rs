//! Import executor - drives candidates through hash, plan, copy, audit

pub mod copy;
pub mod pool;

use crate::audit::{AuditAction, AuditRecord, AuditSink, REASON_DUPLICATE};
use crate::hash::fingerprint_file;
use crate::planner::{plan, FsOccupancy, SimulatedOccupancy};
use crate::types::{
    CandidateFile, ContentDigest, DestinationIndex, HashAlgorithm, ImportError, PlacementAction,
};
use pool::HashPool;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use copy::copy_file_no_clobber;

/// Aggregate counters for one import run.
///
/// Failed candidates are counted only in `failed_hash`/`failed_copy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Candidates processed (every outcome, including failures).
    pub processed: usize,
    /// `COPY` outcomes.
    pub copied: usize,
    /// `COPY_RENAMED` outcomes.
    pub renamed: usize,
    /// `SKIP_DUPLICATE` outcomes.
    pub skipped: usize,
    /// `ERROR_HASH` outcomes.
    pub failed_hash: usize,
    /// `ERROR_COPY` outcomes.
    pub failed_copy: usize,
    /// Bytes written into the destination.
    pub bytes_copied: u64,
}

impl ImportStats {
    pub fn failed(&self) -> usize {
        self.failed_hash + self.failed_copy
    }
}

/// Terminal state of one candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    CopiedNew { dest: PathBuf, bytes: u64 },
    CopiedRenamed { dest: PathBuf, bytes: u64 },
    SkippedDuplicate { duplicate_of: Option<PathBuf> },
    FailedHash(ImportError),
    FailedCopy { dest: PathBuf, error: ImportError },
}

impl CandidateOutcome {
    pub fn action(&self) -> AuditAction {
        match self {
            CandidateOutcome::CopiedNew { .. } => AuditAction::Copy,
            CandidateOutcome::CopiedRenamed { .. } => AuditAction::CopyRenamed,
            CandidateOutcome::SkippedDuplicate { .. } => AuditAction::SkipDuplicate,
            CandidateOutcome::FailedHash(_) => AuditAction::ErrorHash,
            CandidateOutcome::FailedCopy { .. } => AuditAction::ErrorCopy,
        }
    }
}

/// Events emitted while importing.
#[derive(Debug)]
pub enum ImportEvent {
    /// Candidate list is final and processing begins.
    Start { total: usize },
    /// A candidate reached its terminal state and its record is durable.
    Processed {
        index: usize,
        total: usize,
        record: AuditRecord,
    },
    /// All candidates processed.
    Complete { stats: ImportStats },
}

/// Optional callback used to receive import events.
pub type ImportCallback = dyn Fn(&ImportEvent) + Send + Sync;

/// Per-run settings the executor needs
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Directory receiving copies
    pub target_dir: PathBuf,
    /// Hash used for candidates; must match the index
    pub algorithm: HashAlgorithm,
    /// Plan against a simulated destination, write nothing
    pub dry_run: bool,
}

/// Import candidates in the given order
///
/// The caller sorts `candidates` and builds `index` from the full destination
/// beforehand. Each candidate is hashed, planned against the current index
/// and occupied names, copied, and recorded to `sink` before the next one
/// starts. Per-file failures are recorded and skipped; only an audit sink
/// failure aborts the run.
///
/// With a `pool`, digests are computed ahead in parallel but consumed in
/// candidate order, so outcomes are identical to inline hashing.
pub fn execute_import(
    candidates: &[CandidateFile],
    index: &mut DestinationIndex,
    ctx: &ImportContext,
    pool: Option<&HashPool>,
    sink: &mut dyn AuditSink,
    on_event: Option<&ImportCallback>,
) -> Result<ImportStats, ImportError> {
    let total = candidates.len();
    let mut stats = ImportStats::default();
    let mut simulated = SimulatedOccupancy::new();

    emit_event(on_event, ImportEvent::Start { total });

    let mut prehashed = pool.map(|pool| {
        let paths: Vec<PathBuf> = candidates.iter().map(|c| c.path.clone()).collect();
        let (digests, pool_stats) = pool.fingerprint_ordered(&paths);
        debug!(
            "Candidate hashing: {} ok, {} failed on {} worker(s)",
            pool_stats.hashed, pool_stats.failed, pool_stats.workers
        );
        digests.into_iter()
    });

    for (idx, candidate) in candidates.iter().enumerate() {
        let digest = match prehashed.as_mut().and_then(Iterator::next) {
            Some(result) => result,
            None => fingerprint_file(&candidate.path, ctx.algorithm),
        };

        let (outcome, record) = match digest {
            Ok(digest) => process_hashed(candidate, digest, index, ctx, &mut simulated),
            Err(err) => {
                let record = AuditRecord::new(&candidate.path, AuditAction::ErrorHash)
                    .with_error(&err);
                (CandidateOutcome::FailedHash(err), record)
            }
        };

        log_outcome(candidate, &outcome);
        tally(&mut stats, &outcome);

        sink.write_record(&record)?;
        emit_event(
            on_event,
            ImportEvent::Processed {
                index: idx + 1,
                total,
                record,
            },
        );
    }

    emit_event(
        on_event,
        ImportEvent::Complete {
            stats: stats.clone(),
        },
    );

    Ok(stats)
}

/// Plan and place one successfully hashed candidate
fn process_hashed(
    candidate: &CandidateFile,
    digest: ContentDigest,
    index: &mut DestinationIndex,
    ctx: &ImportContext,
    simulated: &mut SimulatedOccupancy,
) -> (CandidateOutcome, AuditRecord) {
    let decision = if ctx.dry_run {
        plan(&ctx.target_dir, &candidate.file_name, &digest, index, &*simulated)
    } else {
        plan(&ctx.target_dir, &candidate.file_name, &digest, index, &FsOccupancy)
    };

    let mut record = AuditRecord::new(&candidate.path, decision.action.into())
        .with_digest(&digest)
        .with_out_dir(&ctx.target_dir);
    record.existing_same_name = decision.name_collision;
    record.existing_same_content = decision.content_duplicate;

    let Some(dest) = decision.destination.clone() else {
        let duplicate_of = index.get(&digest).map(Path::to_path_buf);
        record.duplicate_of = duplicate_of.clone();
        record.reason = Some(REASON_DUPLICATE.to_string());
        return (CandidateOutcome::SkippedDuplicate { duplicate_of }, record);
    };

    let copied = if ctx.dry_run {
        simulated.claim(dest.clone());
        Ok(0)
    } else {
        copy_file_no_clobber(&candidate.path, &dest).map_err(|source| ImportError::Copy {
            from: candidate.path.clone(),
            to: dest.clone(),
            source,
        })
    };

    match copied {
        Ok(bytes) => {
            index.record_copy(digest, dest.clone());
            record.dest = Some(dest.clone());
            let outcome = match decision.action {
                PlacementAction::CopyRenamed => CandidateOutcome::CopiedRenamed { dest, bytes },
                _ => CandidateOutcome::CopiedNew { dest, bytes },
            };
            (outcome, record)
        }
        Err(error) => {
            record.action = AuditAction::ErrorCopy;
            record.error = Some(error.to_string());
            (CandidateOutcome::FailedCopy { dest, error }, record)
        }
    }
}

fn tally(stats: &mut ImportStats, outcome: &CandidateOutcome) {
    stats.processed += 1;
    match outcome {
        CandidateOutcome::CopiedNew { bytes, .. } => {
            stats.copied += 1;
            stats.bytes_copied += bytes;
        }
        CandidateOutcome::CopiedRenamed { bytes, .. } => {
            stats.renamed += 1;
            stats.bytes_copied += bytes;
        }
        CandidateOutcome::SkippedDuplicate { .. } => stats.skipped += 1,
        CandidateOutcome::FailedHash(_) => stats.failed_hash += 1,
        CandidateOutcome::FailedCopy { .. } => stats.failed_copy += 1,
    }
}

fn log_outcome(candidate: &CandidateFile, outcome: &CandidateOutcome) {
    let name = &candidate.file_name;
    match outcome {
        CandidateOutcome::CopiedNew { dest, .. } => {
            debug!("COPY: {} -> {}", name, display_name(dest));
        }
        CandidateOutcome::CopiedRenamed { dest, .. } => {
            debug!("RENAME+COPY: {} -> {}", name, display_name(dest));
        }
        CandidateOutcome::SkippedDuplicate { .. } => debug!("SKIP (dup): {}", name),
        CandidateOutcome::FailedHash(err) => debug!("Cannot hash {}: {}", name, err),
        CandidateOutcome::FailedCopy { dest, error: err } => {
            debug!("Failed to copy {} -> {}: {}", name, display_name(dest), err);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn emit_event(on_event: Option<&ImportCallback>, event: ImportEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
