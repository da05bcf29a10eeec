use crate::core::LauncherError;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// SHA-256 verification of downloaded binaries.
///
/// Digests are lowercase hex without any prefix, the same form the artifact
/// repository publishes in its manifest and the launcher stores in the
/// sidecar file.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the lowercase hex SHA-256 of `content`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use usi_launcher::upgrade::ChecksumVerifier;
    ///
    /// assert_eq!(
    ///     ChecksumVerifier::compute_sha256(b"Hello, World!"),
    ///     "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
    /// );
    /// ```
    #[must_use]
    pub fn compute_sha256(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    /// Compute the SHA-256 of a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::FileSystemError`] if the file cannot be read.
    pub async fn compute_file_sha256(path: &Path) -> Result<String, LauncherError> {
        debug!("Computing SHA256 checksum for: {}", path.display());

        let content =
            fs::read(path).await.map_err(|e| LauncherError::file_system("read", path, &e))?;
        Ok(Self::compute_sha256(&content))
    }

    /// Compare two hex digests, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn digests_match(left: &str, right: &str) -> bool {
        left.trim().eq_ignore_ascii_case(right.trim())
    }

    /// Verify `content` against an expected digest.
    ///
    /// Returns the computed digest on success so callers persist what was
    /// actually hashed, not what was claimed.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::ChecksumMismatch`] carrying both digests.
    pub fn verify(content: &[u8], expected: &str) -> Result<String, LauncherError> {
        let actual = Self::compute_sha256(content);

        if !Self::digests_match(&actual, expected) {
            return Err(LauncherError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }

        debug!("Checksum verification successful");
        Ok(actual)
    }

    /// Whether `digest` looks like a SHA-256 hex digest (64 hex characters).
    #[must_use]
    pub fn is_sha256_hex(digest: &str) -> bool {
        digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit())
    }
}
