//! Shared helpers for launcher integration tests

// Not every test file uses every helper
#![allow(dead_code)]

pub mod artifact_server;

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated home, cache, and config for one launcher run.
pub struct LauncherEnv {
    pub temp: TempDir,
}

impl LauncherEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("cache")).unwrap();
        std::fs::create_dir_all(temp.path().join("home")).unwrap();
        Self {
            temp,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp.path().join("cache").join("USIWrapper")
    }

    /// The cached binary, whatever the host platform tag is.
    pub fn cached_binary(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(self.cache_dir()).ok()?;
        entries.flatten().map(|entry| entry.path()).find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("usi") && !name.ends_with(".sha256"))
        })
    }

    pub fn sidecar(&self) -> Option<String> {
        let binary = self.cached_binary()?;
        let mut sidecar = binary.into_os_string();
        sidecar.push(".sha256");
        std::fs::read_to_string(sidecar).ok()
    }

    /// Pre-populate the cache as a previous launch would have.
    pub fn seed_cache(&self, content: &[u8]) -> PathBuf {
        let platform = usi_launcher::utils::platform::PlatformTag::detect();
        let paths = usi_launcher::cache::CachePaths::in_dir(self.cache_dir(), platform);
        std::fs::create_dir_all(&paths.dir).unwrap();
        write_executable(&paths.binary, content);
        std::fs::write(&paths.sidecar, usi_launcher::test_utils::sha256_hex(content)).unwrap();
        paths.binary
    }

    /// A `usi` command pointed at `artifact_root` with fast retries.
    pub fn command(&self, artifact_root: &str) -> Command {
        let config = self.temp.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "artifact_root = \"{artifact_root}\"\n\
                 max_attempts = 2\n\
                 retry_interval_secs = 0\n\
                 request_timeout_secs = 10\n"
            ),
        )
        .unwrap();

        let mut cmd = Command::cargo_bin("usi").unwrap();
        cmd.env("XDG_CACHE_HOME", self.temp.path().join("cache"))
            .env("HOME", self.temp.path().join("home"))
            .env("USI_LAUNCHER_CONFIG", &config)
            .env_remove("RUST_LOG")
            .env_remove("USI_ARTIFACT_ROOT")
            .env_remove("USI_MANIFEST_URL")
            .env_remove("USI_MAX_ATTEMPTS")
            .env_remove("USI_RETRY_INTERVAL_SECS")
            .env_remove("USI_REQUEST_TIMEOUT_SECS");
        cmd
    }
}

/// Shell script that records its arguments to `log` and exits with `code`.
pub fn recording_script(log: &Path, code: i32) -> Vec<u8> {
    format!("#!/bin/sh\nprintf '%s|' \"$@\" > '{}'\nexit {code}\n", log.display()).into_bytes()
}

fn write_executable(path: &Path, content: &[u8]) {
    std::fs::write(path, content).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
