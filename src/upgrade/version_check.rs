use crate::cache::CachePaths;
use crate::upgrade::{ArtifactClient, ChecksumVerifier};
use tracing::debug;

/// Result of comparing the published digest with the local cache.
///
/// The three outcomes are mutually exclusive and drive the update loop:
/// stop, update, or retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The cached binary matches the published digest.
    AlreadyCurrent,
    /// The cache is missing, unverified, or stale.
    UpdateAvailable {
        /// Digest declared by the manifest
        digest: String,
    },
    /// The published digest could not be obtained.
    Failed {
        /// "Error retrieving latest usi cli digest: <cause>"
        reason: String,
    },
}

/// Decides whether the cached binary needs replacing.
///
/// The local side of the comparison is the sidecar file, not a fresh hash of
/// the binary: the sidecar is only ever written after the binary it describes
/// was verified and moved into place.
///
/// # Examples
///
/// ```rust,no_run
/// use usi_launcher::cache::CachePaths;
/// use usi_launcher::config::LauncherConfig;
/// use usi_launcher::upgrade::{HttpArtifactClient, UpdateStatus, VersionChecker};
/// use usi_launcher::utils::platform::PlatformTag;
///
/// # async fn example() -> Result<(), usi_launcher::core::LauncherError> {
/// let platform = PlatformTag::detect();
/// let client = HttpArtifactClient::new(&LauncherConfig::default(), platform)?;
/// let paths = CachePaths::in_dir("/tmp/USIWrapper", platform);
///
/// match VersionChecker::new(&client, &paths).check_for_update().await {
///     UpdateStatus::AlreadyCurrent => println!("up to date"),
///     UpdateStatus::UpdateAvailable { digest } => println!("new build {digest}"),
///     UpdateStatus::Failed { reason } => eprintln!("{reason}"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct VersionChecker<'a, C> {
    client: &'a C,
    paths: &'a CachePaths,
}

impl<'a, C: ArtifactClient> VersionChecker<'a, C> {
    /// Create a checker reading the manifest through `client`.
    pub const fn new(client: &'a C, paths: &'a CachePaths) -> Self {
        Self {
            client,
            paths,
        }
    }

    /// Fetch the manifest and compare it with the local sidecar.
    ///
    /// Never fails: transport and parse errors become
    /// [`UpdateStatus::Failed`] so the caller can retry.
    pub async fn check_for_update(&self) -> UpdateStatus {
        let manifest = match self.client.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                return UpdateStatus::Failed {
                    reason: format!("Error retrieving latest usi cli digest: {e}"),
                };
            }
        };
        let latest = manifest.sha256();

        if !self.paths.binary_exists() {
            debug!("No cached binary at {}", self.paths.binary.display());
            return UpdateStatus::UpdateAvailable {
                digest: latest.to_string(),
            };
        }

        match self.paths.recorded_digest() {
            Some(recorded) if ChecksumVerifier::digests_match(&recorded, latest) => {
                debug!("Cached binary matches {latest}");
                UpdateStatus::AlreadyCurrent
            }
            recorded => {
                debug!("Recorded digest {:?} differs from published {latest}", recorded);
                UpdateStatus::UpdateAvailable {
                    digest: latest.to_string(),
                }
            }
        }
    }
}
