//! Spotify Library Client
//!
//! This library signs a desktop user into the Spotify Web API with the OAuth 2.0
//! Authorization Code flow (PKCE, loopback redirect), keeps the resulting tokens
//! fresh on disk, and retrieves the user's library: playlists, saved tracks and
//! the tracks of a single playlist. Large collections are fetched with a bounded
//! pool of concurrent page workers and returned in a deterministic order.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the loopback callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Endpoints, data directory and environment handling
//! - `error` - Crate-wide error type
//! - `logging` - `tracing` subscriber setup
//! - `management` - Session state, token persistence and credential overrides
//! - `server` - Ephemeral loopback listener for the OAuth redirect
//! - `spotify` - Spotify Web API client, pagination and track normalization
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE and random token helpers
//!
//! # Example
//!
//! ```
//! use spotlib::{config::Config, management::SessionManager};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> spotlib::Result<()> {
//!     let session = SessionManager::new(Config::from_env());
//!     let status = session.status(&CancellationToken::new()).await?;
//!     println!("authenticated: {}", status.authenticated);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, Result};

/// Prints an informational message with a blue bullet point.
///
/// Used by the CLI for progress and status lines. Library code logs through
/// `tracing` instead.
///
/// ```
/// info!("Waiting for the Spotify redirect on {}", redirect_uri);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("Fetched {} saved tracks", tracks.len());
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the CLI layer may call this; everything below it returns
/// [`Error`] values instead.
///
/// ```
/// error!("Login failed: {}", e);
/// // Program exits here
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// ```
/// warning!("Failed to open browser, open this URL manually:\n{}", url);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
