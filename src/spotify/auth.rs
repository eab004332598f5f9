use chrono::Utc;
use reqwest::{Client, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::{Error, Result},
    management::credentials::Credentials,
    spotify::client::cancellable,
    types::{Token, TokenResponse},
    utils,
};

/// Builds the authorization URL the user opens in a browser.
///
/// The URL carries the S256 challenge derived from `verifier` and the
/// anti-CSRF `state`; `show_dialog=true` lets the user switch accounts.
pub fn authorize_url(
    config: &Config,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    verifier: &str,
) -> Result<String> {
    let challenge = utils::generate_code_challenge(verifier);
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("state", state),
            ("scope", config.scope.as_str()),
            ("code_challenge", challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.auth_url, e)))?;

    Ok(url.into())
}

/// Exchanges an authorization code for a token.
///
/// The request authenticates with HTTP Basic client credentials and proves
/// possession of the PKCE verifier that produced the challenge sent in the
/// authorize request. The authorization code is single-use and expires
/// quickly, so this runs straight from the callback handler.
pub async fn exchange_code(
    http: &Client,
    config: &Config,
    credentials: &Credentials,
    cancel: &CancellationToken,
    code: &str,
    redirect_uri: &str,
    verifier: &str,
) -> Result<Token> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("code_verifier", verifier),
    ];

    let response = request_token(http, config, credentials, cancel, &form)
        .await
        .map_err(|e| match e {
            Error::Cancelled => Error::Cancelled,
            other => Error::TokenExchange(other.to_string()),
        })?;

    if response.access_token.is_empty() {
        return Err(Error::TokenExchange(
            "response did not include an access token".to_string(),
        ));
    }

    info!(expires_in = response.expires_in, "Exchanged authorization code");
    Ok(response.into_token(Utc::now().timestamp(), None))
}

/// Exchanges a refresh token for a new access token.
///
/// When Spotify does not rotate the refresh token the old one is kept on the
/// returned [`Token`].
pub async fn refresh_token(
    http: &Client,
    config: &Config,
    credentials: &Credentials,
    cancel: &CancellationToken,
    refresh_token: &str,
) -> Result<Token> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    let response = request_token(http, config, credentials, cancel, &form)
        .await
        .map_err(|e| match e {
            Error::Cancelled => Error::Cancelled,
            other => Error::Refresh(other.to_string()),
        })?;

    if response.access_token.is_empty() {
        return Err(Error::Refresh(
            "response did not include an access token".to_string(),
        ));
    }

    let rotated = response
        .refresh_token
        .as_deref()
        .is_some_and(|t| !t.is_empty());
    info!(rotated, "Refreshed access token");
    Ok(response.into_token(Utc::now().timestamp(), Some(refresh_token)))
}

async fn request_token(
    http: &Client,
    config: &Config,
    credentials: &Credentials,
    cancel: &CancellationToken,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    cancellable(cancel, async {
        debug!(url = %config.token_url, "POST token");
        let response = http
            .post(&config.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    })
    .await
}
