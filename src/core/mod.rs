//! Core types shared across the launcher.
//!
//! Currently this is the error taxonomy: [`LauncherError`] for typed failures
//! and [`ErrorContext`] for what the user sees when a launch cannot proceed.

pub mod error;

pub use error::{ErrorContext, LauncherError, user_friendly_error};
