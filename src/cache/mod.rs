//! Cache location for the wrapped binary and its checksum sidecar
//!
//! The launcher keeps a single binary per platform in a per-user cache
//! directory, next to a sidecar recording the SHA-256 of the last verified
//! install.
//!
//! # Cache Location
//!
//! The cache root is chosen in this order:
//! - `$XDG_CACHE_HOME`, if set and naming an existing directory
//! - `$HOME/Library/Caches` on macOS
//! - `$HOME/.cache` everywhere else
//!
//! The launcher's own directory is `<root>/USIWrapper`.
//!
//! # Cache Directory Structure
//!
//! ```text
//! ~/.cache/USIWrapper/
//! ├── usilinux_amd64          # Cached binary (replaced atomically)
//! └── usilinux_amd64.sha256   # Lowercase hex SHA-256 of the binary
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use usi_launcher::cache::{CacheEnv, CachePaths};
//! use usi_launcher::utils::platform::PlatformTag;
//!
//! # fn example() -> Result<(), usi_launcher::core::LauncherError> {
//! let paths = CachePaths::resolve(&CacheEnv::from_process(), PlatformTag::detect())?;
//! println!("binary:  {}", paths.binary.display());
//! println!("sidecar: {}", paths.sidecar.display());
//! # Ok(())
//! # }
//! ```

use crate::constants::{CACHE_HOME_ENV, CACHE_SUBDIR, SIDECAR_SUFFIX, TOOL_NAME};
use crate::core::LauncherError;
use crate::utils::fs::ensure_dir;
use crate::utils::platform::{PlatformTag, get_home_dir};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment inputs for cache resolution.
///
/// Captured once so resolution itself is a pure function of its inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEnv {
    /// Explicit cache root (`XDG_CACHE_HOME`)
    pub cache_home: Option<PathBuf>,
    /// The user's home directory
    pub home: Option<PathBuf>,
}

impl CacheEnv {
    /// Read the cache root override and home directory from the process.
    #[must_use]
    pub fn from_process() -> Self {
        Self {
            cache_home: std::env::var_os(CACHE_HOME_ENV)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            home: get_home_dir().ok(),
        }
    }

    /// The user cache root for the given platform.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::HomeDirNotFound`] when the override is unusable
    /// and no home directory is known.
    pub fn cache_root(&self, platform: PlatformTag) -> Result<PathBuf, LauncherError> {
        if let Some(cache_home) = self.cache_home.as_ref().filter(|dir| dir.is_dir()) {
            return Ok(cache_home.clone());
        }

        let home = self.home.as_ref().ok_or(LauncherError::HomeDirNotFound)?;
        Ok(if platform.is_darwin() {
            home.join("Library").join("Caches")
        } else {
            home.join(".cache")
        })
    }
}

/// Paths of the launcher's cache directory and the two files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    /// The launcher's private cache directory
    pub dir: PathBuf,
    /// Cached binary: `<dir>/usi<platform>`
    pub binary: PathBuf,
    /// Checksum sidecar: `<binary>.sha256`
    pub sidecar: PathBuf,
}

impl CachePaths {
    /// Resolve the cache directory, create it if needed, and derive file paths.
    ///
    /// # Errors
    ///
    /// Fails when no cache root can be determined or the directory cannot be
    /// created. Both are fatal to the launch.
    pub fn resolve(env: &CacheEnv, platform: PlatformTag) -> Result<Self, LauncherError> {
        let dir = env.cache_root(platform)?.join(CACHE_SUBDIR);
        ensure_dir(&dir)?;
        debug!("Using cache directory {}", dir.display());
        Ok(Self::in_dir(dir, platform))
    }

    /// Derive file paths inside an existing directory.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>, platform: PlatformTag) -> Self {
        let dir = dir.into();
        let binary = dir.join(format!("{TOOL_NAME}{platform}"));
        let mut sidecar = binary.clone().into_os_string();
        sidecar.push(SIDECAR_SUFFIX);
        Self {
            dir,
            binary,
            sidecar: PathBuf::from(sidecar),
        }
    }

    /// Whether the cached binary exists.
    #[must_use]
    pub fn binary_exists(&self) -> bool {
        self.binary.is_file()
    }

    /// The digest recorded in the sidecar, if it exists and is readable.
    ///
    /// Surrounding whitespace is ignored so a hand-edited sidecar with a
    /// trailing newline still matches.
    #[must_use]
    pub fn recorded_digest(&self) -> Option<String> {
        read_trimmed(&self.sidecar)
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok().map(|content| content.trim().to_string())
}
