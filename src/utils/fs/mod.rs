//! File system utilities for the launcher cache
//!
//! The cache holds exactly two files, the binary and its checksum sidecar.
//! Both are only ever replaced through the temp-and-rename helpers in
//! [`atomic`], so readers never observe a partially written file.
//!
//! # Examples
//!
//! ```rust,no_run
//! use usi_launcher::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), usi_launcher::core::LauncherError> {
//! ensure_dir(Path::new("/home/me/.cache/USIWrapper"))?;
//! atomic_write(Path::new("/home/me/.cache/USIWrapper/usilinux_amd64.sha256"), b"3a6e...")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;

pub use atomic::{atomic_write, install_executable};
pub use dirs::ensure_dir;
