//! Progress reporting

use crate::audit::{AuditAction, AuditRecord};
use crate::executor::ImportStats;
use crate::scanner::IndexStats;
use indicatif::{HumanBytes, HumanDuration, ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::error;

/// Progress reporter for import runs
pub struct ProgressReporter {
    index_bar: ProgressBar,
    import_bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let index_bar = ProgressBar::new_spinner();
        index_bar.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            index_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        let import_bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} fonts | {msg}") {
            import_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            index_bar,
            import_bar,
        }
    }

    /// Reporter that never draws (tests, `--dry-run` piped output)
    pub fn hidden() -> Self {
        Self {
            index_bar: ProgressBar::hidden(),
            import_bar: ProgressBar::hidden(),
        }
    }

    /// Mark start of destination indexing.
    pub fn start_index(&self, root: &Path) {
        self.index_bar
            .set_message(format!("Indexing {}...", root.display()));
    }

    /// Mark completion of destination indexing.
    pub fn finish_index(&self, distinct: usize, stats: &IndexStats) {
        self.index_bar.finish_with_message(format!(
            "Indexed output: {} font(s), {} distinct, {} unreadable in {}",
            stats.indexed_files,
            distinct,
            stats.unreadable_files,
            HumanDuration(stats.duration)
        ));
    }

    /// Initialize the per-file phase.
    pub fn start_import(&self, total: usize) {
        self.import_bar.set_length(total as u64);
        self.import_bar.set_position(0);
        self.import_bar.set_message("Starting import...".to_string());
    }

    /// Advance by one finished candidate.
    pub fn record(&self, record: &AuditRecord) {
        self.import_bar.inc(1);
        let name = record
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if record.is_error() {
            self.suspend(|| {
                error!(
                    "{} {}: {}",
                    action_label(record.action),
                    record.input.display(),
                    record.error.as_deref().unwrap_or("unknown error")
                )
            });
        }
        self.import_bar
            .set_message(format!("{} {}", action_label(record.action), name));
    }

    /// Run `f` with both bars cleared, so log lines never interleave with them
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.index_bar.suspend(|| self.import_bar.suspend(f))
    }

    /// Finalize the per-file phase.
    pub fn finish_import(&self, stats: &ImportStats) {
        self.import_bar.finish_with_message(format!(
            "{} copied, {} renamed, {} skipped, {} failed | {}",
            stats.copied,
            stats.renamed,
            stats.skipped,
            stats.failed(),
            HumanBytes(stats.bytes_copied)
        ));
    }

}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Short human label for an audit action
pub fn action_label(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Copy => "COPY",
        AuditAction::CopyRenamed => "RENAME+COPY",
        AuditAction::SkipDuplicate => "SKIP (dup)",
        AuditAction::ErrorHash => "HASH",
        AuditAction::ErrorCopy => "COPY",
    }
}
