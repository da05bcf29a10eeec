//! Global constants used throughout the launcher.
//!
//! Names of the wrapped tool and its cache layout, plus the defaults for the
//! update loop. Everything here can be overridden through
//! [`LauncherConfig`](crate::config::LauncherConfig) except the on-disk
//! naming, which other installs of the launcher rely on.

use std::time::Duration;

/// Name of the wrapped binary; prefixes the cached file name and the
/// artifact path segment.
pub const TOOL_NAME: &str = "usi";

/// Subdirectory of the user cache root dedicated to the launcher.
pub const CACHE_SUBDIR: &str = "USIWrapper";

/// Suffix appended to the cached binary path to form the checksum sidecar.
pub const SIDECAR_SUFFIX: &str = ".sha256";

/// Default root of the remote artifact repository.
pub const DEFAULT_ARTIFACT_ROOT: &str = "https://artifacts.na.c-gurus.com/artifactory";

/// Default number of check/update attempts per launch.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default pause between failed attempts (10 seconds).
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Default per-request HTTP timeout (120 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Command used to ad-hoc sign the binary after installation on macOS.
pub const CODESIGN_PATH: &str = "/usr/bin/codesign";

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "USI_LAUNCHER_CONFIG";

/// Environment variable overriding the user cache root.
pub const CACHE_HOME_ENV: &str = "XDG_CACHE_HOME";

/// Environment variable holding the user's home directory.
pub const HOME_ENV: &str = "HOME";

/// Flag that silences the launcher's own update logging.
pub const QUIET_FLAG: &str = "-q";
