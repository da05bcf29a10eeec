//! Cross-platform utilities
//!
//! - [`fs`] - Directory creation and atomic writes for the cache files
//! - [`platform`] - Platform tag detection and home directory lookup

pub mod fs;
pub mod platform;

pub use fs::{atomic_write, ensure_dir, install_executable};
pub use platform::{PlatformTag, get_home_dir};
