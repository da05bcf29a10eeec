//! Platform detection for selecting the right `usi` artifact.
//!
//! The artifact repository publishes one binary per [`PlatformTag`]. The set
//! of tags is closed: two macOS variants keyed by architecture and a single
//! fallback used for every other operating system.

use crate::constants::HOME_ENV;
use crate::core::LauncherError;
use std::fmt;
use std::path::PathBuf;

/// Identifies the OS/architecture combination of a published binary.
///
/// The tag is used verbatim as the final path segment of the artifact URL
/// and as the suffix of the cached file name (`usi<tag>`).
///
/// # Examples
///
/// ```rust
/// use usi_launcher::utils::platform::PlatformTag;
///
/// assert_eq!(PlatformTag::from_os_arch("macos", "aarch64"), PlatformTag::DarwinArm64);
/// assert_eq!(PlatformTag::from_os_arch("macos", "x86_64").as_str(), "darwin_amd64");
/// // Every non-macOS host gets the Linux build, whatever its architecture
/// assert_eq!(PlatformTag::from_os_arch("freebsd", "aarch64"), PlatformTag::LinuxAmd64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformTag {
    /// macOS on Apple Silicon
    DarwinArm64,
    /// macOS on any other architecture
    DarwinAmd64,
    /// Fallback for all other operating systems
    LinuxAmd64,
}

impl PlatformTag {
    /// Detect the tag for the host the launcher was compiled for.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_os_arch(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map an OS/arch pair (as in [`std::env::consts`]) to a tag.
    #[must_use]
    pub fn from_os_arch(os: &str, arch: &str) -> Self {
        match (os, arch) {
            ("macos", "aarch64") => Self::DarwinArm64,
            ("macos", _) => Self::DarwinAmd64,
            _ => Self::LinuxAmd64,
        }
    }

    /// The tag as it appears in URLs and file names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DarwinArm64 => "darwin_arm64",
            Self::DarwinAmd64 => "darwin_amd64",
            Self::LinuxAmd64 => "linux_amd64",
        }
    }

    /// Whether this tag belongs to the macOS family.
    ///
    /// Drives both the cache location (`Library/Caches`) and whether the
    /// installed binary is ad-hoc signed.
    #[must_use]
    pub const fn is_darwin(self) -> bool {
        matches!(self, Self::DarwinArm64 | Self::DarwinAmd64)
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the user's home directory.
///
/// `$HOME` wins when it is set and non-empty; otherwise the platform lookup
/// from the `dirs` crate is used (which also consults the password database
/// on Unix).
///
/// # Errors
///
/// Returns [`LauncherError::HomeDirNotFound`] when neither source yields a path.
pub fn get_home_dir() -> Result<PathBuf, LauncherError> {
    std::env::var_os(HOME_ENV)
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(LauncherError::HomeDirNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tag_table() {
        assert_eq!(PlatformTag::from_os_arch("macos", "aarch64"), PlatformTag::DarwinArm64);
        assert_eq!(PlatformTag::from_os_arch("macos", "x86_64"), PlatformTag::DarwinAmd64);
        assert_eq!(PlatformTag::from_os_arch("linux", "x86_64"), PlatformTag::LinuxAmd64);
        assert_eq!(PlatformTag::from_os_arch("linux", "aarch64"), PlatformTag::LinuxAmd64);
        assert_eq!(PlatformTag::from_os_arch("windows", "x86_64"), PlatformTag::LinuxAmd64);
    }

    #[test]
    fn test_platform_tag_strings() {
        assert_eq!(PlatformTag::DarwinArm64.to_string(), "darwin_arm64");
        assert_eq!(PlatformTag::DarwinAmd64.as_str(), "darwin_amd64");
        assert_eq!(PlatformTag::LinuxAmd64.as_str(), "linux_amd64");
    }

    #[test]
    fn test_darwin_family() {
        assert!(PlatformTag::DarwinArm64.is_darwin());
        assert!(PlatformTag::DarwinAmd64.is_darwin());
        assert!(!PlatformTag::LinuxAmd64.is_darwin());
    }

    #[test]
    fn test_detect_matches_host() {
        let tag = PlatformTag::detect();
        assert_eq!(tag.is_darwin(), cfg!(target_os = "macos"));
    }
}
