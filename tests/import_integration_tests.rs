//! End-to-end import integration tests.
//!
//! Cover the collision scenarios, the destination invariants (no duplicate
//! content, no overwrite), idempotence, deterministic versioning, nested
//! destination exclusion, and the audit log.

use figvault::audit::{read_records, AuditAction, AuditRecord};
use figvault::commands::import::run_with_reporter;
use figvault::hash::fingerprint_file;
use figvault::ui::ProgressReporter;
use figvault::{Config, HashAlgorithm, ImportSummary};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════

fn config_for(source: &Path, destination: &Path) -> Config {
    Config {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        ..Config::default()
    }
}

fn write(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(&path, content).expect("write test file");
    path
}

fn import(config: Config) -> ImportSummary {
    run_with_reporter(config, ProgressReporter::hidden()).expect("import run should succeed")
}

fn records_of(summary: &ImportSummary) -> Vec<AuditRecord> {
    read_records(summary.log_path.as_deref().expect("audit log path")).expect("parse audit log")
}

/// Every regular file under `root` with its bytes, excluding audit logs
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else if !path.to_string_lossy().ends_with(".log.jsonl") {
                files.insert(path.clone(), fs::read(&path).expect("read file"));
            }
        }
    }
    files
}

fn file_names(root: &Path) -> Vec<String> {
    snapshot(root)
        .keys()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Scenarios
// ═══════════════════════════════════════════════════════════

#[test]
fn test_identical_content_different_names_copies_first_only() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "b.flf", b"X");
    write(src.path(), "a.flf", b"X");

    let summary = import(config_for(src.path(), dst.path()));

    assert_eq!((summary.copied, summary.renamed, summary.skipped), (1, 0, 1));
    assert_eq!(file_names(dst.path()), vec!["a.flf"]);

    let records = records_of(&summary);
    assert_eq!(records.len(), 2);
    assert!(records[0].input.ends_with("a.flf"));
    assert_eq!(records[0].action, AuditAction::Copy);
    assert!(records[1].input.ends_with("b.flf"));
    assert_eq!(records[1].action, AuditAction::SkipDuplicate);
    assert!(records[1].existing_same_content);
    assert_eq!(records[1].reason.as_deref(), Some("duplicate-content"));
}

#[test]
fn test_name_collision_gets_v02() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "a.flf", b"Y");
    write(src.path(), "a.flf", b"Z");

    let summary = import(config_for(src.path(), dst.path()));

    assert_eq!(summary.renamed, 1);
    assert_eq!(fs::read(dst.path().join("a.flf")).unwrap(), b"Y");
    assert_eq!(fs::read(dst.path().join("a_v02.flf")).unwrap(), b"Z");

    let record = &records_of(&summary)[0];
    assert_eq!(record.action, AuditAction::CopyRenamed);
    assert!(record.existing_same_name);
    assert!(!record.existing_same_content);
    assert!(record.dest.as_ref().is_some_and(|d| d.ends_with("a_v02.flf")));
}

#[test]
fn test_name_collision_skips_taken_version() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "a.flf", b"Y");
    write(dst.path(), "a_v02.flf", b"Q");
    write(src.path(), "a.flf", b"Z");

    let summary = import(config_for(src.path(), dst.path()));

    assert_eq!(summary.renamed, 1);
    assert_eq!(fs::read(dst.path().join("a_v03.flf")).unwrap(), b"Z");
    assert_eq!(fs::read(dst.path().join("a_v02.flf")).unwrap(), b"Q");
}

#[test]
fn test_content_already_in_library_under_other_name_is_skipped() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "deep/old_name.flf", b"same glyphs");
    write(src.path(), "new_name.flf", b"same glyphs");

    let summary = import(config_for(src.path(), dst.path()));

    assert_eq!(summary.skipped, 1);
    let record = &records_of(&summary)[0];
    let canonical = dst.path().canonicalize().unwrap().join("deep/old_name.flf");
    assert_eq!(record.duplicate_of.as_deref(), Some(canonical.as_path()));
    assert!(!dst.path().join("new_name.flf").exists());
}

// ═══════════════════════════════════════════════════════════
// Invariants
// ═══════════════════════════════════════════════════════════

#[test]
fn test_no_content_duplication_and_no_overwrite() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    write(dst.path(), "big.flf", b"big v1");
    write(dst.path(), "small.flf", b"small v1");
    write(src.path(), "big.flf", b"big v2");
    write(src.path(), "Big.flf", b"big v3");
    write(src.path(), "small.flf", b"small v1");
    write(src.path(), "slant.flf", b"slant");
    write(src.path(), "slant copy.flf", b"slant");
    write(src.path(), "mono.tlf", b"big v2");
    write(src.path(), "readme.txt", b"not a font");

    let before = snapshot(dst.path());
    let summary = import(config_for(src.path(), dst.path()));
    let after = snapshot(dst.path());

    // No overwrite: every pre-existing file is byte-identical afterwards.
    for (path, bytes) in &before {
        assert_eq!(after.get(path), Some(bytes), "{} was modified", path.display());
    }

    // No duplicate content among files placed by this run.
    let placed: Vec<&PathBuf> = after.keys().filter(|p| !before.contains_key(*p)).collect();
    let digests: HashSet<_> = placed
        .iter()
        .map(|p| fingerprint_file(p, HashAlgorithm::Blake3).unwrap())
        .collect();
    assert_eq!(digests.len(), placed.len());
    assert_eq!(placed.len(), summary.copied + summary.renamed);

    assert!(!after.keys().any(|p| p.ends_with("readme.txt")));
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_unrelated_part_file_in_library_survives() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "a.flf", b"glyphs");
    write(dst.path(), ".a.flf.part", b"user data, not ours");

    let summary = import(config_for(src.path(), dst.path()));

    assert_eq!(summary.copied, 1);
    assert_eq!(fs::read(dst.path().join("a.flf")).unwrap(), b"glyphs");
    assert_eq!(
        fs::read(dst.path().join(".a.flf.part")).unwrap(),
        b"user data, not ours"
    );
}

#[test]
fn test_second_run_is_idempotent() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "a.flf", b"existing");
    write(src.path(), "a.flf", b"different");
    write(src.path(), "b.flf", b"bee");
    write(src.path(), "c.tlf", b"bee");
    write(src.path(), "d.FLF", b"dee");

    let first = import(config_for(src.path(), dst.path()));
    assert_eq!(first.stats.processed, 4);

    let second = import(config_for(src.path(), dst.path()));
    assert_eq!(second.copied, 0);
    assert_eq!(second.renamed, 0);
    assert_eq!(second.skipped, 4);
}

#[test]
fn test_back_to_back_runs_keep_separate_logs() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "a.flf", b"A");

    let first = import(config_for(src.path(), dst.path()));
    let second = import(config_for(src.path(), dst.path()));

    assert_ne!(first.log_path, second.log_path);
    let first_records = records_of(&first);
    let second_records = records_of(&second);
    assert_eq!(first_records.len(), 1);
    assert_eq!(first_records[0].action, AuditAction::Copy);
    assert_eq!(second_records.len(), 1);
    assert_eq!(second_records[0].action, AuditAction::SkipDuplicate);

    for path in [&first.log_path, &second.log_path] {
        let name = path.as_ref().unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("figlet_import_"));
        assert!(name.ends_with(".log.jsonl"));
    }
}

#[test]
fn test_versioned_names_are_deterministic() {
    let src = TempDir::new().expect("create src tempdir");
    for (i, dir) in ["z", "m", "a"].iter().enumerate() {
        write(src.path(), &format!("{dir}/font.flf"), format!("variant {i}").as_bytes());
    }

    let mut runs = Vec::new();
    for _ in 0..2 {
        let dst = TempDir::new().expect("create dst tempdir");
        write(dst.path(), "font.flf", b"library original");

        let mut config = config_for(src.path(), dst.path());
        config.recursive = true;
        let summary = import(config);

        let placements: Vec<(String, Vec<u8>)> = ["font_v02.flf", "font_v03.flf", "font_v04.flf"]
            .iter()
            .map(|name| (name.to_string(), fs::read(dst.path().join(name)).unwrap()))
            .collect();
        assert_eq!(summary.renamed, 3);
        runs.push(placements);
    }

    assert_eq!(runs[0], runs[1]);
    // Same file name, so the full path decides: a/ < m/ < z/.
    assert_eq!(runs[0][0].1, b"variant 2");
    assert_eq!(runs[0][2].1, b"variant 0");
}

#[test]
fn test_nested_destination_never_reingested() {
    let root = TempDir::new().expect("create tempdir");
    let src = root.path();
    let dst = src.join("library");
    write(src, "one.flf", b"one");
    write(src, "sub/two.flf", b"two");

    let mut config = config_for(src, &dst);
    config.recursive = true;

    let first = import(config.clone());
    assert_eq!(first.copied, 2);

    write(&dst, "library_only.flf", b"never a candidate");
    let second = import(config);
    let records = records_of(&second);
    assert_eq!(records.len(), 2);
    let canonical_dst = dst.canonicalize().unwrap();
    assert!(records.iter().all(|r| !r.input.starts_with(&canonical_dst)));
    assert_eq!(second.skipped, 2);
}

#[test]
fn test_subdir_receives_copies_but_whole_library_is_indexed() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(dst.path(), "older/known.flf", b"known");
    write(src.path(), "known.flf", b"known");
    write(src.path(), "fresh.flf", b"fresh");

    let mut config = config_for(src.path(), dst.path());
    config.subdir = Some(PathBuf::from("incoming/2024"));
    let summary = import(config);

    assert_eq!(summary.copied, 1);
    assert_eq!(summary.skipped, 1);
    assert!(dst.path().join("incoming/2024/fresh.flf").exists());
    assert!(!dst.path().join("incoming/2024/known.flf").exists());
    assert!(summary.destination.ends_with("incoming/2024"));
    // The audit log sits at the library root, not in the subdir.
    assert_eq!(summary.log_path.as_ref().unwrap().parent(), Some(dst.path().canonicalize().unwrap().as_path()));
}

#[test]
fn test_threaded_hashing_matches_sequential() {
    let src = TempDir::new().expect("create src tempdir");
    for i in 0..24 {
        write(src.path(), &format!("f{:02}.flf", i), format!("glyphs {}", i % 7).as_bytes());
    }

    let seq_dst = TempDir::new().expect("create dst tempdir");
    let sequential = import(config_for(src.path(), seq_dst.path()));

    let par_dst = TempDir::new().expect("create dst tempdir");
    let mut config = config_for(src.path(), par_dst.path());
    config.threads = 4;
    let parallel = import(config);

    assert_eq!(sequential.stats, parallel.stats);
    assert_eq!(file_names(seq_dst.path()), file_names(par_dst.path()));
}

#[test]
fn test_sha256_digests_are_tagged_in_log() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "a.flf", b"abc");

    let mut config = config_for(src.path(), dst.path());
    config.algorithm = HashAlgorithm::Sha256;
    let summary = import(config);

    let record = &records_of(&summary)[0];
    assert_eq!(
        record.input_hash.as_deref(),
        Some("sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
    );
}

#[test]
#[cfg(unix)]
fn test_unreadable_candidate_is_logged_and_run_completes() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    let locked = write(src.path(), "a_locked.flf", b"secret");
    write(src.path(), "b_open.flf", b"open");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe then.
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let summary = import(config_for(src.path(), dst.path()));
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.copied, 1);

    let records = records_of(&summary);
    assert_eq!(records[0].action, AuditAction::ErrorHash);
    assert!(records[0].error.is_some());
    assert_eq!(records[1].action, AuditAction::Copy);
}

#[test]
fn test_dry_run_touches_nothing() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");
    write(src.path(), "a.flf", b"A");
    let library = dst.path().join("not-yet-created");

    let mut config = config_for(src.path(), &library);
    config.dry_run = true;
    let summary = import(config);

    assert_eq!(summary.copied, 1);
    assert!(summary.log_path.is_none());
    assert!(!library.exists());
}

#[test]
fn test_same_source_and_destination_rejected() {
    let dir = TempDir::new().expect("create tempdir");
    let result = run_with_reporter(config_for(dir.path(), dir.path()), ProgressReporter::hidden());
    assert!(result.is_err_and(|e| e.is_config_error()));
}
