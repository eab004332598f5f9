use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::Token,
};

/// JSON file holding the current [`Token`].
///
/// Writes replace the whole file through a sibling temp file and a rename, so
/// a reader never sees a half-written record. On unix the file is created
/// with owner-only permissions.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Returns `Ok(None)` when no token has been persisted yet.
    pub async fn load(&self) -> Result<Option<Token>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let token: Token = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), "Loaded persisted token");
        Ok(Some(token))
    }

    pub async fn persist(&self, token: &Token) -> Result<()> {
        if token.access_token.is_empty() {
            return Err(Error::EmptyAccessToken);
        }

        let json = serde_json::to_string_pretty(token)?;
        write_private(&self.path, json.as_bytes()).await?;

        debug!(path = %self.path.display(), expires_at = token.expires_at, "Persisted token");
        Ok(())
    }

    /// Removes the token file. A missing file is not an error.
    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Replaces `path` with `contents` through a sibling `.tmp` file and a rename.
///
/// The temp file is created with mode `0600` on unix, so the data is never
/// readable by other users, not even before the rename.
pub(crate) async fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    let tmp = tmp_path(path);
    // A leftover temp file keeps its old mode; start from scratch.
    match async_fs::remove_file(&tmp).await {
        Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    async_fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
