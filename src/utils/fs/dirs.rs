//! Directory creation for the launcher cache.

use crate::core::LauncherError;
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// Idempotent: an existing directory is left alone.
///
/// # Errors
///
/// Returns [`LauncherError::FileSystemError`] if the path exists but is not a
/// directory, or if creation fails.
///
/// # Examples
///
/// ```rust,no_run
/// use usi_launcher::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> Result<(), usi_launcher::core::LauncherError> {
/// ensure_dir(Path::new("/home/me/.cache/USIWrapper"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<(), LauncherError> {
    if path.is_dir() {
        return Ok(());
    }

    if path.exists() {
        return Err(LauncherError::FileSystemError {
            operation: "create directory".to_string(),
            path: path.display().to_string(),
            reason: "path exists but is not a directory".to_string(),
        });
    }

    fs::create_dir_all(path).map_err(|e| LauncherError::file_system("create directory", path, &e))
}
