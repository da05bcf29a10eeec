use crate::cache::CachePaths;
use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::upgrade::{ArtifactClient, PostInstallHook, SelfUpdater, UpdateStatus, VersionChecker};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info, warn};

/// How an [`UpdateLoop::ensure_latest`] run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The cached binary already matched the published digest.
    AlreadyCurrent,
    /// A new binary was verified and installed.
    Updated {
        /// Digest of the installed binary
        digest: String,
        /// Attempts used, including the successful one
        attempts: u32,
    },
    /// Every attempt failed; the launch continues with whatever is cached.
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: LauncherError,
    },
}

/// Bounded check-then-update loop with a fixed pause between attempts.
///
/// Each attempt fetches the manifest and, when the cache is stale, downloads
/// and installs the new binary. Retryable failures (network, manifest,
/// checksum) are logged with the attempt index and retried after
/// `retry_interval`, up to `max_attempts` attempts in total. No pause precedes
/// the first attempt or follows the last. Running out of attempts is not an
/// error: the launcher proceeds with the cached binary, if any.
///
/// Local filesystem failures are not retried and propagate to the caller.
///
/// # Examples
///
/// ```rust,no_run
/// use usi_launcher::cache::{CacheEnv, CachePaths};
/// use usi_launcher::config::LauncherConfig;
/// use usi_launcher::upgrade::{HttpArtifactClient, UpdateLoop, hook_for};
/// use usi_launcher::utils::platform::PlatformTag;
///
/// # async fn example() -> Result<(), usi_launcher::core::LauncherError> {
/// let config = LauncherConfig::default();
/// let platform = PlatformTag::detect();
/// let paths = CachePaths::resolve(&CacheEnv::from_process(), platform)?;
/// let client = HttpArtifactClient::new(&config, platform)?;
///
/// let outcome = UpdateLoop::new(&config, client, paths, hook_for(platform))
///     .ensure_latest()
///     .await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct UpdateLoop<C> {
    client: C,
    paths: CachePaths,
    hook: Box<dyn PostInstallHook>,
    max_attempts: u32,
    retry_interval: Duration,
}

impl<C: ArtifactClient> UpdateLoop<C> {
    /// Create a loop using the retry settings from `config`.
    pub fn new(
        config: &LauncherConfig,
        client: C,
        paths: CachePaths,
        hook: Box<dyn PostInstallHook>,
    ) -> Self {
        Self {
            client,
            paths,
            hook,
            max_attempts: config.max_attempts.max(1),
            retry_interval: config.retry_interval(),
        }
    }

    /// Paths this loop maintains.
    #[must_use]
    pub const fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Make sure the cached binary is the latest published one, if possible.
    ///
    /// # Errors
    ///
    /// Only non-retryable errors (local filesystem failures) are returned.
    pub async fn ensure_latest(&self) -> Result<UpdateOutcome, LauncherError> {
        let delays = FixedInterval::new(self.retry_interval).take(self.max_attempts as usize - 1);
        let mut next_attempt = 0u32;

        let result = RetryIf::spawn(
            delays,
            || {
                let attempt = next_attempt;
                next_attempt += 1;
                self.attempt(attempt)
            },
            LauncherError::is_retryable,
        )
        .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(last_error) if last_error.is_retryable() => {
                warn!("Failed to update usi after {} attempts. Continuing...", self.max_attempts);
                Ok(UpdateOutcome::Exhausted {
                    attempts: next_attempt,
                    last_error,
                })
            }
            Err(fatal) => Err(fatal),
        }
    }

    async fn attempt(&self, attempt: u32) -> Result<UpdateOutcome, LauncherError> {
        let result = self.check_and_update(attempt).await;

        if let Err(error) = &result
            && error.is_retryable()
        {
            warn!("iteration {attempt}: {error}. Retrying...");
        }

        result
    }

    async fn check_and_update(&self, attempt: u32) -> Result<UpdateOutcome, LauncherError> {
        let checker = VersionChecker::new(&self.client, &self.paths);

        match checker.check_for_update().await {
            UpdateStatus::AlreadyCurrent => {
                debug!("usi cli is up to date");
                Ok(UpdateOutcome::AlreadyCurrent)
            }
            UpdateStatus::UpdateAvailable { digest } => {
                if attempt == 0 {
                    info!("updating usi cli...");
                }
                let updater = SelfUpdater::new(&self.client, &self.paths, self.hook.as_ref());
                let digest = updater.apply_update(&digest).await?;
                Ok(UpdateOutcome::Updated {
                    digest,
                    attempts: attempt + 1,
                })
            }
            UpdateStatus::Failed { reason } => Err(LauncherError::DigestUnavailable {
                reason,
            }),
        }
    }
}
