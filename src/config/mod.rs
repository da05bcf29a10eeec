//! Configuration management for the launcher
//!
//! A single immutable [`LauncherConfig`] describes where artifacts come from
//! and how hard the update loop tries. It is assembled from three layers,
//! later layers winning:
//!
//! 1. Built-in defaults (see [`crate::constants`])
//! 2. An optional TOML file (`USI_LAUNCHER_CONFIG`, or
//!    `<config_dir>/usi-launcher/config.toml` when present)
//! 3. `USI_*` environment variables
//!
//! # Environment Overrides
//!
//! | Variable                   | Field                  |
//! |----------------------------|------------------------|
//! | `USI_ARTIFACT_ROOT`        | `artifact_root`        |
//! | `USI_MANIFEST_URL`         | `manifest_url`         |
//! | `USI_MAX_ATTEMPTS`         | `max_attempts`         |
//! | `USI_RETRY_INTERVAL_SECS`  | `retry_interval_secs`  |
//! | `USI_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |

mod launcher;

pub use launcher::LauncherConfig;
