use std::future::Future;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

/// Bearer-authorized JSON GETs against the Web API.
///
/// Holds no token and no mutable state; the access token is supplied per
/// call. Cloning shares the underlying connection pool, so one instance can
/// serve any number of concurrent page workers.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    http: Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Fetches `url` and decodes the JSON body into `T`.
    ///
    /// Non-2xx responses fail with [`Error::HttpStatus`] carrying the body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        token: &str,
    ) -> Result<T> {
        cancellable(cancel, async {
            debug!(url, "GET");
            let response = self.http.get(url).bearer_auth(token).send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::HttpStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(response.json::<T>().await?)
        })
        .await
    }
}

/// Runs `fut` unless `cancel` fires first, in which case the request is
/// dropped and [`Error::Cancelled`] returned.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}
