//! Append-only audit log
//!
//! One JSON object per line, one line per processed candidate, written and
//! synced before the next candidate is touched. A crash leaves a valid
//! prefix of complete lines.

use crate::types::{ContentDigest, ImportError, PlacementAction};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File name prefix of audit logs written under the destination root
pub const LOG_PREFIX: &str = "figlet_import";

/// Reason attached to skipped duplicates
pub const REASON_DUPLICATE: &str = "duplicate-content";

/// Final outcome recorded for a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Copy,
    CopyRenamed,
    SkipDuplicate,
    ErrorHash,
    ErrorCopy,
}

impl From<PlacementAction> for AuditAction {
    fn from(action: PlacementAction) -> Self {
        match action {
            PlacementAction::Copy => AuditAction::Copy,
            PlacementAction::CopyRenamed => AuditAction::CopyRenamed,
            PlacementAction::SkipDuplicate => AuditAction::SkipDuplicate,
        }
    }
}

/// One self-contained audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// RFC 3339 timestamp
    pub ts: String,

    /// Source path of the candidate
    pub input: PathBuf,

    /// `algorithm:hex`; absent when hashing failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,

    /// Directory receiving copies for this run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(default)]
    pub existing_same_name: bool,

    #[serde(default)]
    pub existing_same_content: bool,

    pub action: AuditAction,

    /// File written by this run; absent on skips and failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<PathBuf>,

    /// Canonical destination file holding the same content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    /// Record stamped now, for `input`, with everything else empty
    pub fn new(input: &Path, action: AuditAction) -> Self {
        Self {
            ts: Local::now().to_rfc3339(),
            input: input.to_path_buf(),
            input_hash: None,
            out_dir: None,
            existing_same_name: false,
            existing_same_content: false,
            action,
            dest: None,
            duplicate_of: None,
            reason: None,
            error: None,
        }
    }

    pub fn with_digest(mut self, digest: &ContentDigest) -> Self {
        self.input_hash = Some(digest.to_string());
        self
    }

    pub fn with_out_dir(mut self, out_dir: &Path) -> Self {
        self.out_dir = Some(out_dir.to_path_buf());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.action, AuditAction::ErrorHash | AuditAction::ErrorCopy)
    }
}

/// Upper bound on `_N` suffixes tried for same-second runs
const MAX_LOG_SUFFIX: u32 = 999;

fn audit_error(path: &Path, e: std::io::Error) -> ImportError {
    ImportError::Audit {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// Destination for audit records
pub trait AuditSink {
    /// Persist one record; it must be durable when this returns `Ok`
    fn write_record(&mut self, record: &AuditRecord) -> Result<(), ImportError>;
}

/// In-memory sink, used for dry runs
impl AuditSink for Vec<AuditRecord> {
    fn write_record(&mut self, record: &AuditRecord) -> Result<(), ImportError> {
        self.push(record.clone());
        Ok(())
    }
}

/// JSON-lines audit file owned by a single run
#[derive(Debug)]
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    /// Name of the log for a run started at `started`
    pub fn file_name(started: &DateTime<Local>) -> String {
        format!("{}_{}.log.jsonl", LOG_PREFIX, started.format("%Y%m%d_%H%M%S"))
    }

    /// Name used when an earlier run already took the timestamped name
    fn numbered_file_name(started: &DateTime<Local>, n: u32) -> String {
        format!(
            "{}_{}_{}.log.jsonl",
            LOG_PREFIX,
            started.format("%Y%m%d_%H%M%S"),
            n
        )
    }

    /// Create a fresh log for this run under `dest_root`
    ///
    /// Another run's log is never reused: when a run started within the same
    /// second already owns the name, `_2`, `_3`, ... is appended.
    pub fn open(dest_root: &Path, started: &DateTime<Local>) -> Result<Self, ImportError> {
        let first = dest_root.join(Self::file_name(started));
        match Self::create_new(&first) {
            Ok(file) => return Ok(Self { path: first, file }),
            Err(e) if e.kind() != ErrorKind::AlreadyExists => return Err(audit_error(&first, e)),
            Err(_) => {}
        }

        for n in 2..=MAX_LOG_SUFFIX {
            let path = dest_root.join(Self::numbered_file_name(started, n));
            match Self::create_new(&path) {
                Ok(file) => return Ok(Self { path, file }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(audit_error(&path, e)),
            }
        }

        Err(ImportError::Audit {
            path: first,
            reason: format!("no free log name after {} attempts", MAX_LOG_SUFFIX),
        })
    }

    /// Create a log at an exact path; fails if the file exists
    pub fn open_path(path: PathBuf) -> Result<Self, ImportError> {
        let file = Self::create_new(&path).map_err(|e| audit_error(&path, e))?;
        Ok(Self { path, file })
    }

    fn create_new(path: &Path) -> std::io::Result<File> {
        OpenOptions::new().write(true).create_new(true).open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for AuditLog {
    fn write_record(&mut self, record: &AuditRecord) -> Result<(), ImportError> {
        let mut line = serde_json::to_string(record).map_err(|e| ImportError::Audit {
            path: self.path.clone(),
            reason: format!("Failed to serialize record: {}", e),
        })?;
        line.push('\n');

        // One write per record keeps lines whole.
        let written = self
            .file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .and_then(|()| self.file.sync_data());

        written.map_err(|e| ImportError::Audit {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// Parse an audit file back into records
pub fn read_records(path: &Path) -> Result<Vec<AuditRecord>, ImportError> {
    let text = fs::read_to_string(path).map_err(|e| ImportError::Audit {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| ImportError::Audit {
                path: path.to_path_buf(),
                reason: format!("line {}: {}", n + 1, e),
            })
        })
        .collect()
}
