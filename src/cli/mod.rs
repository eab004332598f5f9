//! User-facing commands. Each one reports through the colored output macros
//! and terminates the process on failure; the session layer underneath only
//! returns errors.

mod auth;
mod credentials;
mod library;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use auth::{login, logout, status};
pub use credentials::credentials;
pub use library::{playlist, playlists, saved};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
