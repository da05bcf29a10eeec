//! Command-line entry point of the launcher.
//!
//! The launcher has no command line of its own: everything after the program
//! name belongs to the wrapped `usi` binary and is forwarded untouched,
//! including `--help`, `--version`, and `--`. The only argument the launcher
//! looks at is `-q`, which silences its update logging (and is still
//! forwarded).
//!
//! # Flow
//!
//! 1. Install logging unless quiet
//! 2. Load [`LauncherConfig`] (defaults, config file, environment)
//! 3. Resolve the cache directory for this platform
//! 4. Run the [`UpdateLoop`]
//! 5. Hand over to the cached binary ([`launch`])

pub mod launch;

use crate::cache::{CacheEnv, CachePaths};
use crate::config::LauncherConfig;
use crate::constants::QUIET_FLAG;
use crate::core::LauncherError;
use crate::upgrade::{HttpArtifactClient, UpdateLoop, UpdateOutcome, hook_for};
use crate::utils::platform::PlatformTag;
use anyhow::{Context, Result};
use std::ffi::OsString;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "usi_launcher=info";

/// Arguments the launcher was invoked with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Arguments forwarded verbatim to the wrapped binary
    pub args: Vec<OsString>,
    /// Whether `-q` appeared anywhere in `args`
    pub quiet: bool,
}

impl LaunchArgs {
    /// Arguments of the current process, without the program name.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_args(std::env::args_os().skip(1))
    }

    /// Build from an argument list that excludes the program name.
    ///
    /// ```rust
    /// use usi_launcher::cli::LaunchArgs;
    ///
    /// let args = LaunchArgs::from_args(["deploy", "-q", "--", "--help"]);
    /// assert!(args.quiet);
    /// assert_eq!(args.args.len(), 4);
    /// ```
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let quiet = args.iter().any(|arg| arg == QUIET_FLAG);
        Self {
            args,
            quiet,
        }
    }
}

/// Install the stderr log subscriber unless running quietly.
///
/// `RUST_LOG` overrides the default filter. Output carries no timestamps,
/// targets, or levels so it reads like plain CLI messages. Calling this more
/// than once is harmless.
pub fn init_logging(quiet: bool) {
    if quiet {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(false)
        .try_init();
}

/// Update the cached binary if possible, then run it.
///
/// On Unix a successful launch replaces the current process and never
/// returns. Elsewhere the exit code of the wrapped binary is returned.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable cache directory,
/// local filesystem failures during the update, or a binary that cannot be
/// started (including one that was never downloaded).
pub async fn run(args: LaunchArgs) -> Result<i32> {
    init_logging(args.quiet);

    let config = LauncherConfig::load().await.context("Failed to load launcher configuration")?;
    let platform = PlatformTag::detect();
    debug!("Platform: {platform}");

    let paths = CachePaths::resolve(&CacheEnv::from_process(), platform)?;
    let client = HttpArtifactClient::new(&config, platform)?;
    let update = UpdateLoop::new(&config, client, paths, hook_for(platform));

    match update.ensure_latest().await? {
        UpdateOutcome::AlreadyCurrent => {}
        UpdateOutcome::Updated {
            digest,
            attempts,
        } => debug!("Installed {digest} after {attempts} attempt(s)"),
        UpdateOutcome::Exhausted {
            last_error, ..
        } => debug!("Launching cached binary after failed update: {last_error}"),
    }

    let binary = &update.paths().binary;
    if !update.paths().binary_exists() {
        return Err(LauncherError::LaunchFailed {
            path: binary.display().to_string(),
            reason: "no cached binary is available and the download did not succeed".to_string(),
        }
        .into());
    }

    Ok(launch::run_binary(binary, &args.args).await?)
}
