//! Atomic file write operations using temp-and-rename strategy.
//!
//! Every write lands in a uniquely named sibling temporary file first and is
//! renamed over the target, so a reader (including a concurrent launcher)
//! sees either the old file or the complete new one, never a torn write.
//! Concurrent writers never share a temporary file.

use crate::core::LauncherError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::Builder;

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Writes `content` to a fresh `<file name>.<random>.tmp` next to `path`
/// 2. Syncs the temporary file to disk
/// 3. Renames it over `path`
///
/// The parent directory must already exist.
///
/// # Errors
///
/// Returns [`LauncherError::FileSystemError`] if any step fails. The
/// temporary file is removed on failure.
///
/// # Examples
///
/// ```rust,no_run
/// use usi_launcher::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> Result<(), usi_launcher::core::LauncherError> {
/// atomic_write(Path::new("/tmp/usilinux_amd64.sha256"), b"3a6eb079...")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), LauncherError> {
    let prefix = format!("{}.", file_name(path));
    write_then_persist(path, &prefix, content, false)
}

/// Atomically installs an executable whose content hash is already known.
///
/// The temporary file is named after the digest plus a random part
/// (`.<file name>.<digest>.<random>.tmp`) and created with mode `0o777`,
/// subject to the process umask. Its write handle is closed before the
/// rename, so the installed path is never open for writing.
///
/// # Errors
///
/// Returns [`LauncherError::FileSystemError`] if any step fails. The
/// temporary file is removed on failure and the previous binary is untouched.
pub fn install_executable(path: &Path, content: &[u8], digest: &str) -> Result<(), LauncherError> {
    let prefix = format!(".{}.{digest}.", file_name(path));
    write_then_persist(path, &prefix, content, true)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

fn write_then_persist(
    target: &Path,
    prefix: &str,
    content: &[u8],
    executable: bool,
) -> Result<(), LauncherError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(prefix).suffix(".tmp");

    #[cfg(unix)]
    if executable {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o777));
    }
    #[cfg(not(unix))]
    let _ = executable;

    let mut temp = builder
        .tempfile_in(dir)
        .map_err(|e| LauncherError::file_system("create temp file in", dir, &e))?;
    temp.write_all(content).map_err(|e| LauncherError::file_system("write", temp.path(), &e))?;
    temp.as_file().sync_all().map_err(|e| LauncherError::file_system("sync", temp.path(), &e))?;

    temp.into_temp_path()
        .persist(target)
        .map_err(|e| LauncherError::file_system("rename", target, &e.error))
}
