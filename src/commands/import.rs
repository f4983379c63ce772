//! Main import command

use crate::audit::{AuditLog, AuditRecord, AuditSink};
use crate::config::normalize;
use crate::executor::pool::HashPool;
use crate::executor::{execute_import, ImportContext, ImportEvent, ImportStats};
use crate::scanner::{build_destination_index, enumerate_candidates, FontFilter, IndexStats};
use crate::types::ImportError;
use crate::ui::{action_label, ProgressReporter};
use crate::Config;
use chrono::Local;
use console::style;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Result of one import run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub copied: usize,
    pub renamed: usize,
    pub skipped: usize,
    /// Hash and copy failures; excluded from the three counters above
    pub failed: usize,
    /// Directory that received this run's copies
    pub destination: PathBuf,
    /// Audit log written for the run (`None` on dry runs)
    pub log_path: Option<PathBuf>,
    pub index: IndexStats,
    pub stats: ImportStats,
    pub dry_run: bool,
}

/// Run the import operation
///
/// Fails only on configuration problems or when the audit log cannot be
/// written; per-file failures end up in the summary and the log.
pub fn run(config: Config) -> Result<ImportSummary, ImportError> {
    run_with_reporter(config, ProgressReporter::new())
}

/// Run the import with an explicit progress reporter
pub fn run_with_reporter(
    config: Config,
    reporter: ProgressReporter,
) -> Result<ImportSummary, ImportError> {
    config.validate()?;
    let started = Local::now();
    let filter = FontFilter::new()?;

    if !config.dry_run {
        fs::create_dir_all(config.target_dir())?;
    }
    let destination = normalize(&config.destination)?;
    let target_dir = match &config.subdir {
        Some(subdir) => destination.join(subdir),
        None => destination.clone(),
    };

    reporter.suspend(|| {
        info!(
            "Starting import  •  in={}  out={}",
            config.source.display(),
            target_dir.display()
        )
    });

    let pool = if config.threads > 1 {
        let pool = HashPool::new(config.threads, config.algorithm)?;
        debug!("Hashing on {} worker(s)", pool.workers());
        Some(pool)
    } else {
        None
    };

    let reporter = Arc::new(Mutex::new(reporter));
    let note = |message: String| {
        if let Ok(progress) = reporter.lock() {
            progress.suspend(|| info!("{}", message));
        }
    };

    if let Ok(progress) = reporter.lock() {
        progress.start_index(&destination);
    }
    let (mut index, index_stats) =
        build_destination_index(&destination, config.algorithm, &filter, pool.as_ref())?;
    if let Ok(progress) = reporter.lock() {
        progress.finish_index(index.len(), &index_stats);
    }

    let candidates = enumerate_candidates(&config, &filter)?;
    note(format!("Found {} input font(s)", candidates.len()));

    let mut audit_log = None;
    let mut dry_run_records: Vec<AuditRecord> = Vec::new();
    let sink: &mut dyn AuditSink = if config.dry_run {
        &mut dry_run_records
    } else {
        let log = AuditLog::open(&destination, &started)?;
        note(format!("Log file: {}", log.path().display()));
        audit_log.insert(log)
    };

    let ctx = ImportContext {
        target_dir: target_dir.clone(),
        algorithm: config.algorithm,
        dry_run: config.dry_run,
    };

    let progress_cb = {
        let reporter = Arc::clone(&reporter);
        move |event: &ImportEvent| match event {
            ImportEvent::Start { total } => {
                if let Ok(progress) = reporter.lock() {
                    progress.start_import(*total);
                }
            }
            ImportEvent::Processed { record, .. } => {
                if let Ok(progress) = reporter.lock() {
                    progress.record(record);
                }
            }
            ImportEvent::Complete { stats } => {
                if let Ok(progress) = reporter.lock() {
                    progress.finish_import(stats);
                }
            }
        }
    };

    let stats = execute_import(
        &candidates,
        &mut index,
        &ctx,
        pool.as_ref(),
        sink,
        Some(&progress_cb),
    )?;

    if config.dry_run {
        println!("{}", format_dry_run_actions(&dry_run_records));
    }

    let summary = ImportSummary {
        copied: stats.copied,
        renamed: stats.renamed,
        skipped: stats.skipped,
        failed: stats.failed(),
        destination: target_dir,
        log_path: audit_log.as_ref().map(|log| log.path().to_path_buf()),
        index: index_stats,
        stats,
        dry_run: config.dry_run,
    };

    debug!("Import finished: {:?}", summary.stats);
    println!("{}", format_summary(&summary));

    Ok(summary)
}

fn format_summary(summary: &ImportSummary) -> String {
    let mut lines = Vec::new();
    lines.push("—".repeat(50));

    let counts = format!(
        "Summary: copied={}, renamed={}, skipped_duplicates={}, failed={}",
        summary.copied, summary.renamed, summary.skipped, summary.failed
    );
    lines.push(if summary.failed > 0 {
        style(counts).yellow().to_string()
    } else {
        style(counts).green().to_string()
    });

    lines.push(format!("Destination: {}", summary.destination.display()));
    match &summary.log_path {
        Some(path) => lines.push(format!("Audit log: {}", path.display())),
        None if summary.dry_run => lines.push("Dry-run mode: no changes were made.".to_string()),
        None => {}
    }
    if summary.index.preexisting_duplicates > 0 {
        lines.push(format!(
            "Note: output already held {} duplicate font(s); they were left untouched.",
            summary.index.preexisting_duplicates
        ));
    }
    lines.join("\n")
}

fn format_dry_run_actions(records: &[AuditRecord]) -> String {
    if records.is_empty() {
        return "Dry-run actions:\n  (no input fonts)".to_string();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push("Dry-run actions:".to_string());
    for record in records {
        let label = action_label(record.action);
        let line = match (&record.dest, &record.error) {
            (_, Some(err)) => format!("  ERROR {:<11} {}: {}", label, record.input.display(), err),
            (Some(dest), None) => format!(
                "  {:<17} {} -> {}",
                label,
                record.input.display(),
                dest.display()
            ),
            (None, None) => format!("  {:<17} {}", label, record.input.display()),
        };
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use std::path::Path;

    fn summary(failed: usize, log_path: Option<PathBuf>, dry_run: bool) -> ImportSummary {
        ImportSummary {
            copied: 3,
            renamed: 1,
            skipped: 2,
            failed,
            destination: PathBuf::from("/lib/fonts"),
            log_path,
            index: IndexStats::default(),
            stats: ImportStats::default(),
            dry_run,
        }
    }

    #[test]
    fn test_format_summary_contains_counts_and_paths() {
        let text = format_summary(&summary(
            1,
            Some(PathBuf::from("/lib/figlet_import_20240101_000000.log.jsonl")),
            false,
        ));
        assert!(text.contains("copied=3"));
        assert!(text.contains("renamed=1"));
        assert!(text.contains("skipped_duplicates=2"));
        assert!(text.contains("failed=1"));
        assert!(text.contains("Destination: /lib/fonts"));
        assert!(text.contains("Audit log: /lib/figlet_import_20240101_000000.log.jsonl"));
    }

    #[test]
    fn test_format_summary_dry_run_note() {
        let text = format_summary(&summary(0, None, true));
        assert!(text.contains("no changes were made"));
    }

    #[test]
    fn test_format_dry_run_actions_lists_each_record() {
        let mut copy = AuditRecord::new(Path::new("/in/a.flf"), AuditAction::Copy);
        copy.dest = Some(PathBuf::from("/out/a.flf"));
        let skip = AuditRecord::new(Path::new("/in/b.flf"), AuditAction::SkipDuplicate);

        let text = format_dry_run_actions(&[copy, skip]);
        assert!(text.contains("Dry-run actions:"));
        assert!(text.contains("/in/a.flf -> /out/a.flf"));
        assert!(text.contains("SKIP (dup)"));
    }

    #[test]
    fn test_format_dry_run_actions_handles_empty() {
        assert!(format_dry_run_actions(&[]).contains("(no input fonts)"));
    }
}
