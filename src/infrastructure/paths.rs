//! Path helpers for log file targets.
//!
//! File sinks are attached only after their target exists. These helpers create
//! the parent directory tree and an empty file on demand. The check and the
//! creation are not atomic: a file deleted externally in between is simply
//! recreated by the sink on open.

use std::fs;
use std::io;
use std::path::Path;

/// Returns `true` if `path` exists.
///
/// Any metadata failure other than "not found" (e.g. permission denied) is also
/// reported as absent so that creation is attempted and surfaces the real error.
#[must_use]
pub fn is_exist(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Ensures `path` exists as a file, creating parent directories and an empty
/// file if needed.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory tree or the file cannot
/// be created.
///
/// # Examples
///
/// ```
/// use rhino_logger::infrastructure::ensure_file;
///
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("logs").join("run.log");
/// ensure_file(&path)?;
/// assert!(path.is_file());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn ensure_file(path: &Path) -> io::Result<()> {
    if is_exist(path) {
        return Ok(());
    }

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    fs::File::create(path)?;
    tracing::debug!(path = %path.display(), "created log file");
    Ok(())
}
