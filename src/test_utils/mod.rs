//! Test utilities for the launcher
//!
//! Helpers for driving the update pipeline without a network:
//! - [`ScriptedClient`]: an [`ArtifactClient`] that replays queued responses
//! - [`RecordingHook`]: a [`PostInstallHook`] that records every call
//! - [`capture_logs`]: a scoped subscriber recording launcher log lines
//! - Digest and manifest builders
//!
//! # Example
//!
//! ```rust,no_run
//! use usi_launcher::test_utils::{ScriptedClient, fetch_failed};
//!
//! // Two network failures, then the real thing
//! let client = ScriptedClient::serving(b"#!/bin/sh\nexit 0\n")
//!     .with_manifest(Err(fetch_failed()))
//!     .with_manifest(Err(fetch_failed()));
//! ```

use crate::core::LauncherError;
use crate::upgrade::{
    ArtifactClient, ChecksumVerifier, ManifestChecksums, PostInstallHook, RemoteManifest,
};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::Level;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects `RUST_LOG` if set, or uses the provided level. Without either,
/// tests run silently.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Log lines recorded by [`capture_logs`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Everything logged so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }

    /// Number of times `needle` occurs in the captured output.
    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Record INFO and above on the current thread, formatted as the CLI prints them.
///
/// Capture lasts until the returned guard is dropped. Use with the default
/// current-thread `#[tokio::test]` runtime so every log call stays on this
/// thread.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let buffer = Arc::clone(&logs.buffer);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || CapturedWriter(Arc::clone(&buffer)))
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_level(false)
        .finish();

    (logs, tracing::subscriber::set_default(subscriber))
}

/// Lowercase hex SHA-256 of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    ChecksumVerifier::compute_sha256(content)
}

/// A parsed manifest declaring `digest`.
pub fn manifest_for(digest: &str) -> RemoteManifest {
    RemoteManifest {
        checksums: ManifestChecksums {
            sha256: digest.to_string(),
        },
    }
}

/// Manifest JSON as the artifact repository serves it.
pub fn manifest_json(digest: &str) -> String {
    serde_json::json!({
        "repo": "usi",
        "checksums": { "sha256": digest },
    })
    .to_string()
}

/// A retryable transport failure.
pub fn fetch_failed() -> LauncherError {
    LauncherError::FetchFailed {
        url: "scripted://usi".to_string(),
        reason: "connection refused".to_string(),
    }
}

/// [`ArtifactClient`] that replays queued responses.
///
/// Queued responses are consumed first; once a queue is empty the client
/// falls back to its default for that request (a transport failure unless
/// built with [`ScriptedClient::serving`]). Every call is counted.
#[derive(Default)]
pub struct ScriptedClient {
    manifests: Mutex<VecDeque<Result<RemoteManifest, LauncherError>>>,
    binaries: Mutex<VecDeque<Result<Vec<u8>, LauncherError>>>,
    default_manifest: Option<RemoteManifest>,
    default_binary: Option<Vec<u8>>,
    manifest_calls: AtomicUsize,
    binary_calls: AtomicUsize,
}

impl ScriptedClient {
    /// A client that fails every request.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client that publishes `content` with its correct digest.
    pub fn serving(content: &[u8]) -> Self {
        Self {
            default_manifest: Some(manifest_for(&sha256_hex(content))),
            default_binary: Some(content.to_vec()),
            ..Self::default()
        }
    }

    /// Queue a manifest response.
    pub fn with_manifest(self, response: Result<RemoteManifest, LauncherError>) -> Self {
        self.manifests.lock().unwrap().push_back(response);
        self
    }

    /// Queue a binary response.
    pub fn with_binary(self, response: Result<Vec<u8>, LauncherError>) -> Self {
        self.binaries.lock().unwrap().push_back(response);
        self
    }

    /// Queue `count` manifest transport failures.
    pub fn failing_manifest(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.with_manifest(Err(fetch_failed()));
        }
        self
    }

    /// Number of manifest requests made so far.
    pub fn manifest_calls(&self) -> usize {
        self.manifest_calls.load(Ordering::SeqCst)
    }

    /// Number of binary requests made so far.
    pub fn binary_calls(&self) -> usize {
        self.binary_calls.load(Ordering::SeqCst)
    }

    fn next_manifest(&self) -> Result<RemoteManifest, LauncherError> {
        self.manifest_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = self.manifests.lock().unwrap().pop_front() {
            return response;
        }
        self.default_manifest.clone().ok_or_else(fetch_failed)
    }

    fn next_binary(&self) -> Result<Vec<u8>, LauncherError> {
        self.binary_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = self.binaries.lock().unwrap().pop_front() {
            return response;
        }
        self.default_binary.clone().ok_or_else(fetch_failed)
    }
}

impl ArtifactClient for ScriptedClient {
    async fn fetch_manifest(&self) -> Result<RemoteManifest, LauncherError> {
        self.next_manifest()
    }

    async fn fetch_binary(&self) -> Result<Vec<u8>, LauncherError> {
        self.next_binary()
    }
}

/// [`PostInstallHook`] that records the binaries it was called with.
///
/// Clones share the same record, so a test can keep one clone while the
/// update loop owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingHook {
    calls: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingHook {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binaries passed to the hook, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

impl PostInstallHook for RecordingHook {
    fn after_install(&self, binary: &Path) {
        self.calls.lock().unwrap().push(binary.to_path_buf());
    }
}
