//! Configuration management

use crate::types::{HashAlgorithm, ImportError};
use clap::Parser;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "figvault",
    version,
    about = "Import FIGlet/TOIlet fonts with content-based de-duplication and versioned naming"
)]
pub struct Cli {
    /// Directory to import fonts from
    #[arg(short = 'i', long = "in", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Font library to import into
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Scan the input directory recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Place this run's copies under a subdirectory of the library
    #[arg(long, value_name = "REL_DIR")]
    pub subdir: Option<PathBuf>,

    /// Content hash: blake3 or sha256
    #[arg(long = "hash", value_name = "ALGO")]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of concurrent hashing workers
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Show what would happen without copying or writing a log
    #[arg(long)]
    pub dry_run: bool,

    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase diagnostic verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Settings that may be supplied by a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub recursive: Option<bool>,
    pub subdir: Option<PathBuf>,
    pub hash: Option<HashAlgorithm>,
    pub threads: Option<usize>,
}

impl FileConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ImportError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&text).map_err(|e| {
            ImportError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }
}

/// Settings for one import run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory fonts are imported from
    pub source: PathBuf,

    /// Library root; indexed in full for de-duplication
    pub destination: PathBuf,

    /// Optional relative directory under `destination` receiving this run's copies
    pub subdir: Option<PathBuf>,

    /// Descend into subdirectories of `source`
    pub recursive: bool,

    /// Hash used for every digest in the run
    pub algorithm: HashAlgorithm,

    /// Concurrent hashing workers (1 = inline hashing)
    pub threads: usize,

    /// Plan only, touch nothing
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            subdir: None,
            recursive: false,
            algorithm: HashAlgorithm::default(),
            threads: 1,
            dry_run: false,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = ImportError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let source = cli
            .source
            .or(file.source)
            .ok_or_else(|| ImportError::Config("Missing input directory (--in)".to_string()))?;
        let destination = cli
            .destination
            .or(file.destination)
            .ok_or_else(|| ImportError::Config("Missing output directory (--out)".to_string()))?;

        let config = Config {
            source,
            destination,
            subdir: cli.subdir.or(file.subdir),
            recursive: cli.recursive || file.recursive.unwrap_or(false),
            algorithm: cli.algorithm.or(file.hash).unwrap_or_default(),
            threads: cli.threads.or(file.threads).unwrap_or(1),
            dry_run: cli.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ImportError> {
        if !self.source.is_dir() {
            return Err(ImportError::Config(format!(
                "Input directory does not exist or is not a directory: {}",
                self.source.display()
            )));
        }

        if self.destination.as_os_str().is_empty() {
            return Err(ImportError::Config(
                "Output directory must not be empty".to_string(),
            ));
        }

        if self.destination.exists() && !self.destination.is_dir() {
            return Err(ImportError::Config(format!(
                "Output path exists and is not a directory: {}",
                self.destination.display()
            )));
        }

        if normalize(&self.source)? == normalize(&self.destination)? {
            return Err(ImportError::Config(
                "Input and output must be different directories".to_string(),
            ));
        }

        if let Some(subdir) = &self.subdir {
            let escapes = subdir
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if escapes {
                return Err(ImportError::Config(format!(
                    "Subdirectory must be a relative path inside the output: {}",
                    subdir.display()
                )));
            }
        }

        if self.threads == 0 {
            return Err(ImportError::Config(
                "Thread count must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory receiving this run's copies
    pub fn target_dir(&self) -> PathBuf {
        match &self.subdir {
            Some(subdir) => self.destination.join(subdir),
            None => self.destination.clone(),
        }
    }
}

/// Absolute, symlink-resolved form of `path`, tolerating a missing leaf
pub(crate) fn normalize(path: &Path) -> Result<PathBuf, ImportError> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    let absolute = std::path::absolute(path).map_err(|e| {
        ImportError::Config(format!("Cannot resolve path {}: {}", path.display(), e))
    })?;
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => Ok(normalize(parent)?.join(name)),
        _ => Ok(absolute),
    }
}
