//! No-clobber file copy

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// Copy a file into a destination path that must not exist yet
///
/// Write-then-rename, refusing to replace anything:
/// 1. Stream into a uniquely named hidden `.{name}.XXXXXX.part` sibling
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Move into place with an atomic no-clobber rename
///
/// Only the temporary file created by this call is ever removed; any other
/// file in the destination directory, `.part` or not, is left alone.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(io::Error)` - `AlreadyExists` if `dest` is taken, or the underlying IO failure
///
/// # Example
/// ```no_run
/// use figvault::executor::copy_file_no_clobber;
/// use std::path::Path;
///
/// let bytes = copy_file_no_clobber(Path::new("in/big.flf"), Path::new("out/big.flf"))?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn copy_file_no_clobber(src: &Path, dest: &Path) -> io::Result<u64> {
    if fs::symlink_metadata(dest).is_ok() {
        return Err(already_exists(dest));
    }

    let name = dest.file_name().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("destination has no file name: {}", dest.display()),
        )
    })?;
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut prefix = std::ffi::OsString::from(".");
    prefix.push(name);
    prefix.push(".");

    // Dropped (and deleted) on every early return below.
    let part = Builder::new()
        .prefix(&prefix)
        .suffix(".part")
        .tempfile_in(parent)?;

    let (part, total_bytes) = write_part(src, part)?;
    commit(part, dest)?;

    Ok(total_bytes)
}

fn write_part(src: &Path, mut part: NamedTempFile) -> io::Result<(NamedTempFile, u64)> {
    let mut src_file = File::open(src)?;
    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = match src_file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        part.write_all(&buffer[..bytes_read])?;
        total_bytes += bytes_read as u64;
    }

    part.as_file().sync_all()?;

    let src_metadata = fs::metadata(src)?;
    fs::set_permissions(part.path(), src_metadata.permissions())?;
    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_mtime(part.path(), mtime)?;

    Ok((part, total_bytes))
}

/// Atomically move `part` to `dest`; fails with `AlreadyExists` if `dest` appeared
fn commit(part: NamedTempFile, dest: &Path) -> io::Result<()> {
    match part.persist_noclobber(dest) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Err(already_exists(dest)),
        // `e.file` is dropped here, removing the temporary file.
        Err(e) => Err(e.error),
    }
}

fn already_exists(dest: &Path) -> io::Error {
    io::Error::new(
        ErrorKind::AlreadyExists,
        format!("refusing to overwrite {}", dest.display()),
    )
}
