//! Error handling for the launcher
//!
//! The launcher distinguishes two kinds of failure:
//! 1. **Retryable** failures of the update loop (network, manifest, checksum).
//!    These are logged per attempt and never stop the launch.
//! 2. **Fatal** failures (no cache directory, local filesystem errors, invalid
//!    configuration, a binary that cannot be spawned). These reach `main`,
//!    are shown to the user, and end the process with exit code 1.
//!
//! # Architecture
//!
//! - [`LauncherError`] - Enumerated error types for every failure case
//! - [`ErrorContext`] - Wrapper that adds user-friendly details and suggestions
//!
//! Use [`user_friendly_error`] to turn any [`anyhow::Error`] into an
//! [`ErrorContext`] before printing it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use usi_launcher::core::{LauncherError, user_friendly_error};
//!
//! let error = LauncherError::HomeDirNotFound;
//! assert!(!error.is_retryable());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for launcher operations
///
/// # Error Categories
///
/// ## Retryable (update loop)
/// - [`FetchFailed`] - Transport failure, timeout, or non-success HTTP status
/// - [`DigestUnavailable`] - The update check could not obtain the latest digest
/// - [`ManifestInvalid`] - The checksum manifest could not be parsed
/// - [`ChecksumMismatch`] - Downloaded bytes do not match the declared digest
///
/// ## Fatal (startup and launch)
/// - [`HomeDirNotFound`] - No home directory to derive the cache location from
/// - [`FileSystemError`] - Creating the cache or persisting files failed
/// - [`ConfigError`] - Configuration file or environment override is invalid
/// - [`LaunchFailed`] - The cached binary could not be spawned
/// - [`Other`] - Anything else, carried as a message
///
/// [`FetchFailed`]: LauncherError::FetchFailed
/// [`DigestUnavailable`]: LauncherError::DigestUnavailable
/// [`ManifestInvalid`]: LauncherError::ManifestInvalid
/// [`ChecksumMismatch`]: LauncherError::ChecksumMismatch
/// [`HomeDirNotFound`]: LauncherError::HomeDirNotFound
/// [`FileSystemError`]: LauncherError::FileSystemError
/// [`ConfigError`]: LauncherError::ConfigError
/// [`LaunchFailed`]: LauncherError::LaunchFailed
/// [`Other`]: LauncherError::Other
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LauncherError {
    /// An HTTP request to the artifact repository failed
    #[error("Request to {url} failed: {reason}")]
    FetchFailed {
        /// URL that was requested
        url: String,
        /// Transport error, timeout, or HTTP status
        reason: String,
    },

    /// The latest published digest could not be obtained
    #[error("{reason}")]
    DigestUnavailable {
        /// Full message from the failed check, already prefixed with
        /// "Error retrieving latest usi cli digest"
        reason: String,
    },

    /// The checksum manifest was not valid JSON or lacked `checksums.sha256`
    #[error("Invalid checksum manifest: {reason}")]
    ManifestInvalid {
        /// What was wrong with the document
        reason: String,
    },

    /// The downloaded binary does not hash to the declared digest
    #[error("usi failed checksum validation: {expected} vs {actual}")]
    ChecksumMismatch {
        /// Digest declared by the manifest
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// Neither `HOME` nor the platform lookup produced a home directory
    #[error("Could not determine the home directory")]
    HomeDirNotFound,

    /// A local filesystem operation failed
    #[error("Failed to {operation} {path}: {reason}")]
    FileSystemError {
        /// Operation that failed (e.g., "create directory")
        operation: String,
        /// Path the operation targeted
        path: String,
        /// Underlying I/O error
        reason: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// The cached binary could not be started
    #[error("Failed to launch {path}: {reason}")]
    LaunchFailed {
        /// Path of the binary that was spawned
        path: String,
        /// Underlying spawn error
        reason: String,
    },

    /// Any other failure, carried as its message
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl LauncherError {
    /// Whether the update loop should try again after this error.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. }
                | Self::DigestUnavailable { .. }
                | Self::ManifestInvalid { .. }
                | Self::ChecksumMismatch { .. }
        )
    }

    /// Build a [`LauncherError::FileSystemError`] from an I/O error.
    pub fn file_system(
        operation: impl Into<String>,
        path: &std::path::Path,
        error: &std::io::Error,
    ) -> Self {
        Self::FileSystemError {
            operation: operation.into(),
            path: path.display().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Carries the underlying [`LauncherError`] plus optional details and a
/// suggestion, rendered in color by [`display`](ErrorContext::display).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying launcher error
    pub error: LauncherError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
    /// Lower-level causes not captured by `error`
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
            causes: Vec::new(),
        }
    }

    /// Attach a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details about the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        for cause in &self.causes {
            eprintln!("  {}: {}", "caused by".dimmed(), cause);
        }

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        for cause in &self.causes {
            write!(f, "\nCaused by: {cause}")?;
        }

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with an actionable suggestion
///
/// Recognizes [`LauncherError`] anywhere in the chain, then plain
/// [`std::io::Error`]s, and falls back to a generic context that keeps the
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if let Some(launcher_error) = error.chain().find_map(|e| e.downcast_ref::<LauncherError>()) {
        let mut ctx = create_error_context(launcher_error.clone());
        // Context added by callers sits above the typed error; keep it visible
        if error.downcast_ref::<LauncherError>().is_none() {
            ctx.causes.push(error.to_string());
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        let base = ErrorContext::new(LauncherError::FileSystemError {
            operation: "access".to_string(),
            path: "unknown".to_string(),
            reason: io_error.to_string(),
        });
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => base
                .with_suggestion("Check ownership and permissions of the launcher cache directory"),
            _ => base,
        };
    }

    ErrorContext {
        error: LauncherError::Other {
            message: error.to_string(),
        },
        suggestion: None,
        details: None,
        causes,
    }
}

fn create_error_context(error: LauncherError) -> ErrorContext {
    match &error {
        LauncherError::HomeDirNotFound => ErrorContext::new(error)
            .with_suggestion(
                "Set the HOME environment variable, \
                 or point XDG_CACHE_HOME at an existing directory",
            )
            .with_details("The launcher caches the usi binary under the user's cache directory"),

        LauncherError::FileSystemError { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the cache directory is writable and the disk is not full")
            .with_details("The launcher could not create or update files in its cache directory"),

        LauncherError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Fix the value in the USI_LAUNCHER_CONFIG file or the USI_* environment variables",
            ),

        LauncherError::LaunchFailed { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check network access to the artifact repository and run again \
                 so the binary can be downloaded",
            )
            .with_details("No usable usi binary was found in the cache"),

        LauncherError::Other { .. } => ErrorContext::new(error),

        LauncherError::FetchFailed { .. }
        | LauncherError::DigestUnavailable { .. }
        | LauncherError::ManifestInvalid { .. }
        | LauncherError::ChecksumMismatch { .. } => ErrorContext::new(error)
            .with_suggestion("Check network access to the artifact repository"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_retryable_classification() {
        assert!(
            LauncherError::FetchFailed {
                url: "http://x".to_string(),
                reason: "refused".to_string(),
            }
            .is_retryable()
        );
        assert!(
            LauncherError::ManifestInvalid {
                reason: "missing field".to_string(),
            }
            .is_retryable()
        );
        assert!(
            LauncherError::ChecksumMismatch {
                expected: "aa".to_string(),
                actual: "bb".to_string(),
            }
            .is_retryable()
        );
        assert!(!LauncherError::HomeDirNotFound.is_retryable());
        assert!(
            !LauncherError::ConfigError {
                message: "bad".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_checksum_mismatch_message_has_both_digests() {
        let error = LauncherError::ChecksumMismatch {
            expected: "abc".to_string(),
            actual: "def".to_string(),
        };
        assert_eq!(error.to_string(), "usi failed checksum validation: abc vs def");
    }

    #[test]
    fn test_user_friendly_error_finds_typed_error_under_context() {
        let result: anyhow::Result<()> =
            Err(LauncherError::HomeDirNotFound).context("Failed to resolve cache directory");
        let ctx = user_friendly_error(result.unwrap_err());

        assert_eq!(ctx.error, LauncherError::HomeDirNotFound);
        assert!(ctx.suggestion.unwrap().contains("HOME"));
        assert_eq!(ctx.causes, vec!["Failed to resolve cache directory".to_string()]);
    }

    #[test]
    fn test_user_friendly_error_generic_keeps_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(error);

        let rendered = ctx.to_string();
        assert!(rendered.contains("outer"));
        assert!(rendered.contains("Caused by: root cause"));
    }
}
