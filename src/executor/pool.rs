//! Bounded hashing pool.
//!
//! Fingerprinting independent files is embarrassingly parallel. This pool
//! runs up to `workers` hashes at a time on tokio's blocking threads and
//! hands results back in input order, so every consumer stays sequential:
//! - a semaphore bounds in-flight reads
//! - one join handle per input, awaited in submission order

use crate::hash::fingerprint_file;
use crate::types::{ContentDigest, HashAlgorithm, ImportError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;

/// Outcome of fingerprinting one file
pub type HashResult = Result<ContentDigest, ImportError>;

/// Runtime stats for the last batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub submitted: usize,
    pub hashed: usize,
    pub failed: usize,
}

/// Fixed-size pool computing digests off the calling thread.
pub struct HashPool {
    runtime: Runtime,
    workers: usize,
    algorithm: HashAlgorithm,
}

impl HashPool {
    /// Create a pool allowing `worker_count` concurrent hashes.
    pub fn new(worker_count: usize, algorithm: HashAlgorithm) -> Result<Self, ImportError> {
        let workers = worker_count.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name("figvault-hash")
            .enable_all()
            .build()
            .map_err(ImportError::Io)?;

        Ok(Self {
            runtime,
            workers,
            algorithm,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fingerprint every path, returning one result per input in input order.
    ///
    /// A failing file yields an `Err` in its own slot; it never affects the
    /// other slots.
    pub fn fingerprint_ordered(&self, paths: &[PathBuf]) -> (Vec<HashResult>, PoolStats) {
        let algorithm = self.algorithm;
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let results = self.runtime.block_on(async move {
            let mut handles = Vec::with_capacity(paths.len());
            for path in paths {
                let path = path.clone();
                let semaphore = Arc::clone(&semaphore);
                handles.push(tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return Err(ImportError::Read {
                                path,
                                source: std::io::Error::other(e.to_string()),
                            })
                        }
                    };
                    let job_path = path.clone();
                    tokio::task::spawn_blocking(move || fingerprint_file(&job_path, algorithm))
                        .await
                        .unwrap_or_else(|e| {
                            Err(ImportError::Read {
                                path,
                                source: std::io::Error::other(format!("hash worker failed: {e}")),
                            })
                        })
                }));
            }

            let mut results = Vec::with_capacity(handles.len());
            for (handle, path) in handles.into_iter().zip(paths) {
                let result = handle.await.unwrap_or_else(|e| {
                    Err(ImportError::Read {
                        path: path.clone(),
                        source: std::io::Error::other(format!("hash task failed: {e}")),
                    })
                });
                results.push(result);
            }
            results
        });

        let failed = results.iter().filter(|r| r.is_err()).count();
        let stats = PoolStats {
            workers: self.workers,
            submitted: paths.len(),
            hashed: results.len() - failed,
            failed,
        };
        (results, stats)
    }
}
