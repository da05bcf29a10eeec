use crate::cache::CachePaths;
use crate::core::LauncherError;
use crate::upgrade::{ArtifactClient, ChecksumVerifier, PostInstallHook};
use crate::utils::fs::{atomic_write, install_executable};
use tracing::{debug, info};

/// Downloads, verifies, and installs a new cached binary.
///
/// `SelfUpdater` is the only writer of the cache files. An update is
/// all-or-nothing from the point of view of any reader:
///
/// 1. The payload is downloaded into memory and hashed
/// 2. On a digest mismatch nothing on disk changes
/// 3. On a match the binary is written to a digest-named temp file and
///    renamed over the cached binary
/// 4. Only then is the sidecar replaced (also temp + rename)
/// 5. The post-install hook runs (ad-hoc signing on macOS)
///
/// A crash between steps 3 and 4 leaves a complete binary with a stale
/// sidecar, which the next launch treats as "update needed".
///
/// # Examples
///
/// ```rust,no_run
/// use usi_launcher::cache::CachePaths;
/// use usi_launcher::config::LauncherConfig;
/// use usi_launcher::upgrade::{HttpArtifactClient, NoopHook, SelfUpdater};
/// use usi_launcher::utils::platform::PlatformTag;
///
/// # async fn example() -> Result<(), usi_launcher::core::LauncherError> {
/// let platform = PlatformTag::LinuxAmd64;
/// let client = HttpArtifactClient::new(&LauncherConfig::default(), platform)?;
/// let paths = CachePaths::in_dir("/tmp/USIWrapper", platform);
///
/// let digest = "3a6eb0790f39ac87c94f3856b2dd2c5d110e6811602261a9a923d3bb23adc8b7";
/// SelfUpdater::new(&client, &paths, &NoopHook).apply_update(digest).await?;
/// # Ok(())
/// # }
/// ```
pub struct SelfUpdater<'a, C> {
    client: &'a C,
    paths: &'a CachePaths,
    hook: &'a dyn PostInstallHook,
}

impl<'a, C: ArtifactClient> SelfUpdater<'a, C> {
    /// Create an updater writing into `paths` and running `hook` on success.
    pub fn new(client: &'a C, paths: &'a CachePaths, hook: &'a dyn PostInstallHook) -> Self {
        Self {
            client,
            paths,
            hook,
        }
    }

    /// Download the latest binary and install it if it hashes to `declared_digest`.
    ///
    /// Returns the digest written to the sidecar.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::FetchFailed`] if the download fails (retryable)
    /// - [`LauncherError::ChecksumMismatch`] if the bytes do not match (retryable)
    /// - [`LauncherError::FileSystemError`] if the cache cannot be written (fatal)
    pub async fn apply_update(&self, declared_digest: &str) -> Result<String, LauncherError> {
        let content = self.client.fetch_binary().await?;
        debug!("Downloaded {} bytes", content.len());

        let digest = ChecksumVerifier::verify(&content, declared_digest)?;

        install_executable(&self.paths.binary, &content, &digest)?;
        atomic_write(&self.paths.sidecar, digest.as_bytes())?;
        info!("usi updated");

        self.hook.after_install(&self.paths.binary);
        Ok(digest)
    }
}
