//! Handing control to the cached binary.

use crate::core::LauncherError;
use std::ffi::OsString;
use std::path::Path;
use std::process::ExitStatus;
use tracing::debug;

/// Exit code used when the wrapped binary ends without one.
const UNKNOWN_EXIT_CODE: i32 = 1;

/// Run `binary` with `args` and the launcher's stdio.
///
/// On Unix the launcher process is replaced (`execv`): the wrapped binary
/// keeps the launcher's PID, receives terminal signals directly, and its exit
/// status becomes the launcher's. The call only returns if the exec fails.
///
/// Elsewhere the binary is spawned as a child and waited for.
///
/// # Errors
///
/// Returns [`LauncherError::LaunchFailed`] if the binary cannot be started.
pub async fn run_binary(binary: &Path, args: &[OsString]) -> Result<i32, LauncherError> {
    debug!("Launching {} with {} argument(s)", binary.display(), args.len());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let error = std::process::Command::new(binary).args(args).exec();
        Err(launch_failed(binary, &error))
    }

    #[cfg(not(unix))]
    {
        spawn_and_wait(binary, args).await
    }
}

/// Spawn `binary` as a child with inherited stdio and wait for it.
///
/// Returns the child's exit code, or `128 + signal` if a signal killed it.
///
/// # Errors
///
/// Returns [`LauncherError::LaunchFailed`] if the child cannot be spawned or
/// waited for.
pub async fn spawn_and_wait(binary: &Path, args: &[OsString]) -> Result<i32, LauncherError> {
    let status = tokio::process::Command::new(binary)
        .args(args)
        .status()
        .await
        .map_err(|e| launch_failed(binary, &e))?;

    Ok(exit_code(status))
}

/// Translate a child's exit status into the launcher's exit code.
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_CODE
}

fn launch_failed(binary: &Path, error: &std::io::Error) -> LauncherError {
    LauncherError::LaunchFailed {
        path: binary.display().to_string(),
        reason: error.to_string(),
    }
}
