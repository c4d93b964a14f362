//! Filesystem helpers shared by the PDF and OOXML sanitizers.
//!
//! Every sanitizer stages its output into a uniquely named sibling of the
//! target file and promotes it with a single rename, so a crash mid-run
//! leaves either the untouched original or a fully written replacement.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Result, SanitizeError};

/// Returns only the filename component of a path (no directory).
///
/// Safe for span fields: reveals the file name without exposing the full
/// path.
pub(crate) fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Builds a unique hidden temp path in the same directory as `target`.
///
/// Staying in the target's directory keeps the final rename on one
/// filesystem; the UUID keeps concurrent runs on sibling files from
/// colliding.
pub(crate) fn sibling_temp_path(target: &Path) -> PathBuf {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let stem = target.file_stem().unwrap_or_default().to_string_lossy();
    let extension = target.extension().unwrap_or_default().to_string_lossy();
    parent.join(format!(".{}.{}.{}", stem, Uuid::new_v4().simple(), extension))
}

/// Moves `src` onto `dst` as a single filesystem operation.
pub(crate) fn atomic_replace(src: &Path, dst: &Path) -> Result<()> {
    std::fs::rename(src, dst).map_err(|e| SanitizeError::AtomicReplace {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })
}

/// Removes a temporary file, tolerating one that is already gone.
pub(crate) fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(
                file = %redact_path(path),
                error = %e,
                "failed to remove temporary file"
            );
        }
    }
}

/// Byte-for-byte copy of `src` to `dst`.
pub(crate) fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    std::fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| SanitizeError::WriteFile {
            path: dst.to_path_buf(),
            source: e,
        })
}

/// Streaming SHA-256 of a file, hex encoded.
pub(crate) fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| SanitizeError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(bytes_read) => hasher.update(&buffer[..bytes_read]),
            Err(e) => {
                return Err(SanitizeError::ReadFile {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}
