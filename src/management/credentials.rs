//! Spotify application credentials.
//!
//! The client id and secret are resolved on every use, so a change to an
//! override file takes effect without restarting. Order of precedence:
//! 1. Override file in the data directory (`client_id` / `client_secret`)
//! 2. `SPOTIFY_API_AUTH_CLIENT_ID` / `SPOTIFY_API_AUTH_CLIENT_SECRET`
//! 3. Built-in defaults baked in at compile time through
//!    `SPOTLIB_BUILTIN_CLIENT_ID` / `SPOTLIB_BUILTIN_CLIENT_SECRET`
//!
//! Built-in defaults are a development convenience; release builds normally
//! ship without them and users register their own Spotify application.
//! Values are trimmed and an empty value counts as unset.

use std::{io::ErrorKind, path::Path};

use tracing::debug;

use crate::{
    config::{self, Config},
    error::{Error, Result},
    management::token::write_private,
};

const BUILTIN_CLIENT_ID: Option<&str> = option_env!("SPOTLIB_BUILTIN_CLIENT_ID");
const BUILTIN_CLIENT_SECRET: Option<&str> = option_env!("SPOTLIB_BUILTIN_CLIENT_SECRET");

#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Resolves both values, failing with
    /// [`Error::MissingClientCredentials`] if either is unset everywhere.
    pub async fn resolve(config: &Config) -> Result<Self> {
        let client_id = client_id(config).await?;
        let client_secret = client_secret(config).await?;
        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Self {
                client_id,
                client_secret,
            }),
            _ => Err(Error::MissingClientCredentials),
        }
    }
}

pub async fn client_id(config: &Config) -> Result<Option<String>> {
    resolve(
        &config.client_id_path(),
        "SPOTIFY_API_AUTH_CLIENT_ID",
        BUILTIN_CLIENT_ID,
    )
    .await
}

pub async fn client_secret(config: &Config) -> Result<Option<String>> {
    resolve(
        &config.client_secret_path(),
        "SPOTIFY_API_AUTH_CLIENT_SECRET",
        BUILTIN_CLIENT_SECRET,
    )
    .await
}

/// Persists a client id override; an empty value removes it.
pub async fn set_client_id(config: &Config, id: &str) -> Result<()> {
    write_override(&config.client_id_path(), id).await
}

/// Persists a client secret override; an empty value removes it.
pub async fn set_client_secret(config: &Config, secret: &str) -> Result<()> {
    write_override(&config.client_secret_path(), secret).await
}

async fn resolve(path: &Path, env_key: &str, builtin: Option<&str>) -> Result<Option<String>> {
    if let Some(value) = read_override(path).await? {
        debug!(source = "override file", key = env_key, "Resolved client credential");
        return Ok(Some(value));
    }
    if let Some(value) = config::env_var(env_key) {
        debug!(source = "environment", key = env_key, "Resolved client credential");
        return Ok(Some(value));
    }
    Ok(builtin
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string))
}

async fn read_override(path: &Path) -> Result<Option<String>> {
    match async_fs::read_to_string(path).await {
        Ok(content) => {
            let value = content.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_override(path: &Path, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return match async_fs::remove_file(path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        };
    }

    write_private(path, value.as_bytes()).await
}
