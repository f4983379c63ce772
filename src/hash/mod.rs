//! Content fingerprinting

use crate::types::{ContentDigest, HashAlgorithm, ImportError};
use sha2::Digest as _;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read per chunk while streaming a file through the hasher
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Running hash state for either supported algorithm
enum Hasher {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake3 => Hasher::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => Hasher::Sha256(sha2::Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Blake3(h) => {
                h.update(data);
            }
            Hasher::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> ContentDigest {
        match self {
            Hasher::Blake3(h) => ContentDigest::new(HashAlgorithm::Blake3, *h.finalize().as_bytes()),
            Hasher::Sha256(h) => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&h.finalize());
                ContentDigest::new(HashAlgorithm::Sha256, bytes)
            }
        }
    }
}

/// Compute the content digest of a file
///
/// The file is streamed in 1 MiB chunks; it is never loaded whole.
///
/// # Arguments
/// * `file_path` - Path to the file to hash
/// * `algorithm` - Hash function to use for this run
///
/// # Returns
/// * `Ok(ContentDigest)` - Tagged 32-byte digest
/// * `Err(ImportError::Read)` - The file cannot be opened or a read fails
///
/// # Example
/// ```no_run
/// use figvault::hash::fingerprint_file;
/// use figvault::types::HashAlgorithm;
/// use std::path::Path;
///
/// let digest = fingerprint_file(Path::new("standard.flf"), HashAlgorithm::Blake3)?;
/// println!("{digest}");
/// # Ok::<(), figvault::types::ImportError>(())
/// ```
pub fn fingerprint_file(file_path: &Path, algorithm: HashAlgorithm) -> Result<ContentDigest, ImportError> {
    let read_error = |source| ImportError::Read {
        path: file_path.to_path_buf(),
        source,
    };

    let mut file = File::open(file_path).map_err(read_error)?;
    fingerprint_reader(&mut file, algorithm).map_err(read_error)
}

/// Fold everything `reader` yields into a digest, one chunk at a time
pub fn fingerprint_reader<R: Read>(
    reader: &mut R,
    algorithm: HashAlgorithm,
) -> std::io::Result<ContentDigest> {
    let mut hasher = Hasher::new(algorithm);
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}
