//! USI launcher - a self-updating wrapper around the `usi` CLI
//!
//! The launcher is installed under the name `usi`. On every invocation it
//! makes sure a verified copy of the real `usi` binary for this platform is
//! cached locally, then runs it with the original arguments, so users always
//! get the latest published build without a separate install step.
//!
//! # Architecture Overview
//!
//! ```text
//! usi <args>
//!   │
//!   ├── config      LauncherConfig: defaults, config file, USI_* overrides
//!   ├── cache       CachePaths: ~/.cache/USIWrapper/usi<platform>{,.sha256}
//!   ├── upgrade     UpdateLoop
//!   │     ├── VersionChecker  manifest digest vs. sidecar
//!   │     ├── SelfUpdater     download, verify, atomic install
//!   │     └── retries         fixed interval, bounded attempts
//!   └── cli::launch exec the cached binary with <args>
//! ```
//!
//! The update never blocks the launch on network trouble: after the last
//! failed attempt the launcher continues with whatever binary it already has.
//! Only local failures (no home directory, unwritable cache, missing binary)
//! stop it.
//!
//! # Core Modules
//!
//! - [`cache`] - Cache directory resolution and the binary/sidecar paths
//! - [`cli`] - Argument passthrough, logging setup, and process hand-off
//! - [`config`] - Launcher configuration and its layering
//! - [`constants`] - Names, paths, and defaults
//! - [`core`] - Error types and user-facing error rendering
//! - [`upgrade`] - Version check, verified download, retry loop
//! - [`utils`] - Atomic file writes and platform detection
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Update if needed, then run `usi deploy --env staging`
//! usi deploy --env staging
//!
//! # Same, without the launcher's own "updating usi cli..." messages
//! usi -q deploy --env staging
//!
//! # Point at a different artifact repository
//! USI_ARTIFACT_ROOT=https://mirror.example.com/artifactory usi status
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
