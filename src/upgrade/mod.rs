//! Keeping the cached `usi` binary current.
//!
//! The launcher never runs a binary it has not verified. Every launch walks
//! the same pipeline before handing control to the cached binary:
//!
//! ```text
//! 1. Version check   (VersionChecker)
//!    ├── Fetch the checksum manifest for this platform
//!    └── Compare it with the digest recorded in the sidecar file
//!
//! 2. Update          (SelfUpdater, only when the check says so)
//!    ├── Download the binary and hash it
//!    ├── Reject it on a digest mismatch (nothing on disk changes)
//!    ├── Atomically replace the cached binary
//!    ├── Atomically replace the sidecar
//!    └── Run the post-install hook (ad-hoc codesign on macOS)
//!
//! 3. Retry           (UpdateLoop)
//!    ├── Up to `max_attempts` attempts, `retry_interval` apart
//!    └── Give up quietly and launch whatever is cached
//! ```
//!
//! # Modules
//!
//! - [`client`]: manifest model and the [`ArtifactClient`] transport seam
//! - [`verification`]: SHA-256 hashing and digest comparison
//! - [`version_check`]: the three-way [`UpdateStatus`] decision
//! - [`self_updater`]: download, verify, install
//! - [`post_install`]: platform hooks run after a successful install
//! - [`retry`]: the bounded [`UpdateLoop`]
//!
//! # Failure model
//!
//! Network, manifest, and checksum failures are retryable and never stop the
//! launch on their own. Local filesystem failures are fatal: a cache that
//! cannot be written will not fix itself on the next attempt.

pub mod client;
pub mod post_install;
pub mod retry;
pub mod self_updater;
pub mod verification;
pub mod version_check;


pub use client::{ArtifactClient, HttpArtifactClient, ManifestChecksums, RemoteManifest};
pub use post_install::{CodesignHook, NoopHook, PostInstallHook, hook_for};
pub use retry::{UpdateLoop, UpdateOutcome};
pub use self_updater::SelfUpdater;
pub use verification::ChecksumVerifier;
pub use version_check::{UpdateStatus, VersionChecker};
