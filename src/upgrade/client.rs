use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::upgrade::ChecksumVerifier;
use crate::utils::platform::PlatformTag;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

/// Checksum manifest published next to each binary.
///
/// ```json
/// {
///   "checksums": {
///     "sha256": "3a6eb0790f39ac87c94f3856b2dd2c5d110e6811602261a9a923d3bb23adc8b7"
///   }
/// }
/// ```
///
/// Any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteManifest {
    /// Digests of the published binary
    pub checksums: ManifestChecksums,
}

/// The `checksums` object of a [`RemoteManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestChecksums {
    /// Lowercase hex SHA-256 of the published binary
    pub sha256: String,
}

impl RemoteManifest {
    /// Parse and validate a manifest document.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ManifestInvalid`] for malformed JSON, a missing
    /// `checksums.sha256`, or a value that is not a SHA-256 hex digest.
    pub fn from_slice(body: &[u8]) -> Result<Self, LauncherError> {
        let manifest: Self = serde_json::from_slice(body).map_err(|e| {
            LauncherError::ManifestInvalid {
                reason: e.to_string(),
            }
        })?;

        if !ChecksumVerifier::is_sha256_hex(manifest.sha256()) {
            return Err(LauncherError::ManifestInvalid {
                reason: format!("'{}' is not a SHA-256 hex digest", manifest.sha256()),
            });
        }

        Ok(manifest)
    }

    /// The declared digest of the latest binary.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.checksums.sha256
    }
}

/// Access to the remote artifact repository.
///
/// The update loop only needs two requests: the manifest and the binary.
/// Implementations report every failure as a retryable [`LauncherError`].
pub trait ArtifactClient {
    /// Fetch and parse the checksum manifest for the latest binary.
    fn fetch_manifest(&self) -> impl Future<Output = Result<RemoteManifest, LauncherError>> + Send;

    /// Download the latest binary.
    fn fetch_binary(&self) -> impl Future<Output = Result<Vec<u8>, LauncherError>> + Send;
}

/// [`ArtifactClient`] backed by `reqwest`.
///
/// The binary and the manifest live at the same path by default; the
/// `Accept` header selects which representation the server returns.
#[derive(Debug, Clone)]
pub struct HttpArtifactClient {
    client: reqwest::Client,
    binary_url: String,
    manifest_url: String,
}

impl HttpArtifactClient {
    /// Build a client for `platform` using the endpoints and timeout in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ConfigError`] if the HTTP client cannot be built.
    pub fn new(config: &LauncherConfig, platform: PlatformTag) -> Result<Self, LauncherError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| LauncherError::ConfigError {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            binary_url: config.binary_url(platform),
            manifest_url: config.manifest_url(platform),
        })
    }

    /// URL the binary is downloaded from.
    #[must_use]
    pub fn binary_url(&self) -> &str {
        &self.binary_url
    }

    /// URL the manifest is fetched from.
    #[must_use]
    pub fn manifest_url(&self) -> &str {
        &self.manifest_url
    }

    async fn get_bytes(&self, url: &str, accept: &str) -> Result<Vec<u8>, LauncherError> {
        debug!("GET {} ({})", url, accept);

        let fetch_failed = |reason: String| LauncherError::FetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("HTTP {status}")));
        }

        let body = response.bytes().await.map_err(|e| fetch_failed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

impl ArtifactClient for HttpArtifactClient {
    async fn fetch_manifest(&self) -> Result<RemoteManifest, LauncherError> {
        let body = self.get_bytes(&self.manifest_url, "application/json").await?;
        RemoteManifest::from_slice(&body)
    }

    async fn fetch_binary(&self) -> Result<Vec<u8>, LauncherError> {
        self.get_bytes(&self.binary_url, "application/octet-stream").await
    }
}
