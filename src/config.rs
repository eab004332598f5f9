//! Configuration management for the Spotify library client.
//!
//! Endpoints, scopes, the preferred loopback address and the data directory
//! live in [`Config`]. Values come from, in order of priority:
//! 1. Environment variables (optionally loaded from a `.env` file)
//! 2. Application defaults targeting the production Spotify endpoints
//!
//! Client credentials are resolved separately, see
//! [`crate::management::credentials`].

use std::{env, path::PathBuf};

/// Spotify's OAuth authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
/// Spotify's OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Spotify Web API base URL.
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
/// Scopes needed to read the user's library and playlists.
pub const DEFAULT_SCOPE: &str = "user-library-read playlist-read-private playlist-read-collaborative";
/// Loopback address tried first so the registered redirect allow-list usually matches.
pub const DEFAULT_CALLBACK_ADDR: &str = "127.0.0.1:3000";

const APP_DIR: &str = "spotlib";
const TOKEN_FILE: &str = "token.json";
const CLIENT_ID_FILE: &str = "client_id";
const CLIENT_SECRET_FILE: &str = "client_secret";

/// Runtime configuration shared by the session and the API client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    /// Preferred `host:port` for the loopback listener. An ephemeral port on
    /// the same host is used when this one is busy.
    pub callback_addr: String,
    /// Application-private directory for the token and credential overrides.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            callback_addr: DEFAULT_CALLBACK_ADDR.to_string(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// Builds a configuration from the environment, falling back to defaults
    /// for anything unset or blank.
    ///
    /// Recognized variables: `SPOTIFY_API_AUTH_URL`, `SPOTIFY_API_TOKEN_URL`,
    /// `SPOTIFY_API_URL`, `SPOTIFY_API_AUTH_SCOPE`, `SERVER_ADDRESS` and
    /// `SPOTLIB_DATA_DIR`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auth_url: env_or("SPOTIFY_API_AUTH_URL", defaults.auth_url),
            token_url: env_or("SPOTIFY_API_TOKEN_URL", defaults.token_url),
            api_url: env_or("SPOTIFY_API_URL", defaults.api_url),
            scope: env_or("SPOTIFY_API_AUTH_SCOPE", defaults.scope),
            callback_addr: env_or("SERVER_ADDRESS", defaults.callback_addr),
            data_dir: env_var("SPOTLIB_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_FILE)
    }

    pub fn client_id_path(&self) -> PathBuf {
        self.data_dir.join(CLIENT_ID_FILE)
    }

    pub fn client_secret_path(&self) -> PathBuf {
        self.data_dir.join(CLIENT_SECRET_FILE)
    }

    /// Joins a Web API path such as `/me/tracks` onto [`Config::api_url`].
    pub fn api_endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives at `<data_local_dir>/spotlib/.env`:
/// - Linux: `~/.local/share/spotlib/.env`
/// - macOS: `~/Library/Application Support/spotlib/.env`
/// - Windows: `%LOCALAPPDATA%/spotlib/.env`
///
/// A missing file is not an error; every setting has a default. The data
/// directory itself is created so later writes have somewhere to land.
pub async fn load_env() -> Result<(), String> {
    let dir = default_data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| e.to_string())?;

    let path = dir.join(".env");
    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Platform data directory for this application.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Reads an environment variable, treating blank values as unset.
pub(crate) fn env_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_var(key).unwrap_or(default)
}
