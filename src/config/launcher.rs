//! Launcher configuration: endpoints and retry behavior.

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_ARTIFACT_ROOT, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRY_INTERVAL, TOOL_NAME,
};
use crate::core::LauncherError;
use crate::utils::platform::PlatformTag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Immutable settings for one launcher run.
///
/// Built once at startup and handed to the update loop, so tests can inject
/// local endpoints and short intervals.
///
/// # TOML Example
///
/// ```toml
/// artifact_root = "https://artifacts.example.com/artifactory"
/// max_attempts = 5
/// retry_interval_secs = 2
/// request_timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Root URL of the artifact repository, without a trailing slash.
    pub artifact_root: String,

    /// Explicit URL of the checksum manifest.
    ///
    /// When unset the manifest is requested from the binary URL with
    /// `Accept: application/json`.
    pub manifest_url: Option<String>,

    /// Number of check/update attempts before giving up. Must be at least 1.
    pub max_attempts: u32,

    /// Seconds to wait between failed attempts.
    pub retry_interval_secs: u64,

    /// Per-request timeout in seconds. `0` disables the timeout.
    pub request_timeout_secs: u64,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            artifact_root: DEFAULT_ARTIFACT_ROOT.to_string(),
            manifest_url: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_interval_secs: DEFAULT_RETRY_INTERVAL.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl LauncherConfig {
    /// Load configuration from file and environment.
    ///
    /// Layering, later wins: defaults, then the TOML file named by
    /// `USI_LAUNCHER_CONFIG` (or the default path, if it exists), then the
    /// `USI_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if the file cannot be read or
    /// parsed, an override is malformed, or the result fails validation.
    pub async fn load() -> Result<Self, LauncherError> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = Self::load_with_optional(explicit).await?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if reading or parsing fails.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self, LauncherError> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path).await,
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if the file cannot be read or
    /// does not match the schema (unknown keys are rejected).
    pub async fn load_from(path: &Path) -> Result<Self, LauncherError> {
        debug!("Loading launcher config from {}", path.display());

        let content = fs::read_to_string(path).await.map_err(|e| LauncherError::ConfigError {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        toml::from_str(&content).map_err(|e| LauncherError::ConfigError {
            message: format!("Failed to parse {}: {e}", path.display()),
        })
    }

    /// Default config file location: `<config_dir>/usi-launcher/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("usi-launcher").join("config.toml"))
    }

    /// Apply `USI_*` overrides looked up through `lookup`.
    ///
    /// Recognized keys: `USI_ARTIFACT_ROOT`, `USI_MANIFEST_URL`,
    /// `USI_MAX_ATTEMPTS`, `USI_RETRY_INTERVAL_SECS`, `USI_REQUEST_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if a numeric override does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), LauncherError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("USI_ARTIFACT_ROOT") {
            self.artifact_root = root;
        }
        if let Some(url) = lookup("USI_MANIFEST_URL") {
            self.manifest_url = Some(url);
        }
        if let Some(value) = lookup("USI_MAX_ATTEMPTS") {
            self.max_attempts = parse_number("USI_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("USI_RETRY_INTERVAL_SECS") {
            self.retry_interval_secs = parse_number("USI_RETRY_INTERVAL_SECS", &value)?;
        }
        if let Some(value) = lookup("USI_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("USI_REQUEST_TIMEOUT_SECS", &value)?;
        }
        Ok(())
    }

    /// Check invariants the update loop relies on.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] for zero attempts or an empty root.
    pub fn validate(&self) -> Result<(), LauncherError> {
        if self.max_attempts == 0 {
            return Err(LauncherError::ConfigError {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.artifact_root.trim().is_empty() {
            return Err(LauncherError::ConfigError {
                message: "artifact_root must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Pause between failed attempts.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Per-request timeout, if any.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// URL of the binary for `platform`: `<root>/usi/<tag>`.
    #[must_use]
    pub fn binary_url(&self, platform: PlatformTag) -> String {
        format!("{}/{TOOL_NAME}/{platform}", self.artifact_root.trim_end_matches('/'))
    }

    /// URL of the checksum manifest for `platform`.
    #[must_use]
    pub fn manifest_url(&self, platform: PlatformTag) -> String {
        self.manifest_url.clone().unwrap_or_else(|| self.binary_url(platform))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, LauncherError> {
    value.trim().parse().map_err(|_| LauncherError::ConfigError {
        message: format!("{key} must be a non-negative integer, got '{value}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LauncherConfig::default();
        assert_eq!(config.artifact_root, "https://artifacts.na.c-gurus.com/artifactory");
        assert_eq!(config.max_attempts, 10);
        assert_eq!(config.retry_interval(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
        config.validate().unwrap();
    }

    #[test]
    fn test_urls() {
        let config = LauncherConfig {
            artifact_root: "http://localhost:8081/artifactory/".to_string(),
            ..LauncherConfig::default()
        };
        assert_eq!(
            config.binary_url(PlatformTag::DarwinArm64),
            "http://localhost:8081/artifactory/usi/darwin_arm64"
        );
        assert_eq!(
            config.manifest_url(PlatformTag::DarwinArm64),
            config.binary_url(PlatformTag::DarwinArm64)
        );

        let config = LauncherConfig {
            manifest_url: Some("http://localhost/api/storage/usi".to_string()),
            ..config
        };
        assert_eq!(
            config.manifest_url(PlatformTag::LinuxAmd64),
            "http://localhost/api/storage/usi"
        );
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("USI_ARTIFACT_ROOT", "http://mirror"),
            ("USI_MAX_ATTEMPTS", "3"),
            ("USI_RETRY_INTERVAL_SECS", " 1 "),
            ("USI_REQUEST_TIMEOUT_SECS", "0"),
        ]);
        let mut config = LauncherConfig::default();

        config.apply_overrides(|key| vars.get(key).map(ToString::to_string)).unwrap();

        assert_eq!(config.artifact_root, "http://mirror");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_interval_secs, 1);
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.manifest_url, None);
    }

    #[test]
    fn test_apply_overrides_rejects_garbage() {
        let mut config = LauncherConfig::default();
        let err = config
            .apply_overrides(|key| (key == "USI_MAX_ATTEMPTS").then(|| "ten".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("USI_MAX_ATTEMPTS"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = LauncherConfig {
            max_attempts: 0,
            ..LauncherConfig::default()
        };
        assert!(matches!(config.validate(), Err(LauncherError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn test_load_from_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "max_attempts = 4\nretry_interval_secs = 2\n").unwrap();

        let config = LauncherConfig::load_from(&path).await.unwrap();

        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.retry_interval_secs, 2);
        assert_eq!(config.artifact_root, DEFAULT_ARTIFACT_ROOT);
    }

    #[tokio::test]
    async fn test_load_from_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "max_retries = 4\n").unwrap();

        let err = LauncherConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, LauncherError::ConfigError { .. }));
    }

    #[tokio::test]
    async fn test_load_with_optional_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = LauncherConfig::load_with_optional(Some(temp.path().join("nope.toml"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_load_layers_file_then_environment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let content = "artifact_root = \"http://file.example\"\nmax_attempts = 4\n";
        std::fs::write(&path, content).unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &path);
            std::env::set_var("USI_MAX_ATTEMPTS", "2");
        }
        let result = LauncherConfig::load().await;
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
            std::env::remove_var("USI_MAX_ATTEMPTS");
        }

        let config = result.unwrap();
        assert_eq!(config.artifact_root, "http://file.example");
        assert_eq!(config.max_attempts, 2);
    }

    #[tokio::test]
    #[serial_test::serial]
    async fn test_load_rejects_zero_attempts_from_environment() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &path);
            std::env::set_var("USI_MAX_ATTEMPTS", "0");
        }
        let result = LauncherConfig::load().await;
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
            std::env::remove_var("USI_MAX_ATTEMPTS");
        }

        assert!(matches!(result, Err(LauncherError::ConfigError { .. })));
    }
}
