//! `usi` launcher entry point
//!
//! Brings the cached `usi` binary up to date and runs it with this process's
//! arguments. Launcher failures are rendered with context and suggestions and
//! exit with status 1.

use usi_launcher::cli::{self, LaunchArgs};
use usi_launcher::core::user_friendly_error;

#[tokio::main]
async fn main() {
    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli::run(LaunchArgs::from_env()).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
