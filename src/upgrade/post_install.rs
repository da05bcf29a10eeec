use crate::constants::CODESIGN_PATH;
use crate::utils::platform::PlatformTag;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Step run after a verified binary has been installed.
///
/// Hooks are best-effort by contract: they cannot fail the update, so the
/// trait has no error channel. Implementations log what happened and return.
pub trait PostInstallHook: Send + Sync {
    /// Called once the binary at `binary` and its sidecar are in place.
    fn after_install(&self, binary: &Path);
}

/// Hook that does nothing; used on every platform except macOS.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl PostInstallHook for NoopHook {
    fn after_install(&self, _binary: &Path) {}
}

/// Ad-hoc signs the installed binary (`codesign -s - <binary>`).
///
/// macOS refuses to run freshly downloaded unsigned binaries on Apple
/// Silicon. The command is waited for so the binary is signed before it is
/// launched, but its exit status is only logged.
#[derive(Debug, Clone)]
pub struct CodesignHook {
    program: PathBuf,
}

impl Default for CodesignHook {
    fn default() -> Self {
        Self::new(CODESIGN_PATH)
    }
}

impl CodesignHook {
    /// Use `program` as the codesign executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PostInstallHook for CodesignHook {
    fn after_install(&self, binary: &Path) {
        let status = Command::new(&self.program)
            .args(["-s", "-"])
            .arg(binary)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => debug!("Signed {}", binary.display()),
            Ok(status) => debug!("codesign exited with {status} for {}", binary.display()),
            Err(e) => debug!("Could not run {}: {e}", self.program.display()),
        }
    }
}

/// The post-install hook appropriate for `platform`.
#[must_use]
pub fn hook_for(platform: PlatformTag) -> Box<dyn PostInstallHook> {
    if platform.is_darwin() {
        Box::new(CodesignHook::default())
    } else {
        Box::new(NoopHook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_codesign_hook_ignores_missing_program() {
        let temp = TempDir::new().unwrap();
        let hook = CodesignHook::new(temp.path().join("no-such-codesign"));

        // Must not panic or propagate anything
        hook.after_install(&temp.path().join("usidarwin_arm64"));
    }

    #[cfg(unix)]
    #[test]
    fn test_codesign_hook_passes_binary_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let log = temp.path().join("args.log");
        let fake = temp.path().join("codesign");
        std::fs::write(&fake, format!("#!/bin/sh\necho \"$@\" > '{}'\nexit 3\n", log.display()))
            .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let binary = temp.path().join("usidarwin_arm64");
        CodesignHook::new(&fake).after_install(&binary);

        let recorded = std::fs::read_to_string(&log).unwrap();
        assert_eq!(recorded.trim(), format!("-s - {}", binary.display()));
    }
}
