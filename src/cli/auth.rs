use std::time::Duration;

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use crate::{Error, error, info, management::SessionManager, success, warning};

use super::spinner;

/// How long `login` waits for the browser round trip.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the browser login and waits for the redirect.
///
/// Opens the authorization URL in the default browser, falling back to
/// printing it, then blocks until the loopback listener has handled the
/// callback, the timeout passes or the user interrupts.
pub async fn login(session: &SessionManager, cancel: &CancellationToken) {
    let response = match session.start_login(cancel).await {
        Ok(response) => response,
        Err(e) => error!("Cannot start login: {}", e),
    };

    info!("Listening for the Spotify redirect on {}", response.redirect_uri);
    if webbrowser::open(&response.url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            response.url
        );
    }

    let pb = spinner("Waiting for authorization in the browser...");
    let result = tokio::select! {
        result = session.wait_for_login(LOGIN_TIMEOUT) => result,
        _ = cancel.cancelled() => Err(Error::Cancelled),
    };
    pb.finish_and_clear();

    if let Err(e) = result {
        session.cancel_login().await;
        error!("Authentication failed: {}", e);
    }

    success!("Authentication successful!");
    status(session, cancel).await;
}

pub async fn status(session: &SessionManager, cancel: &CancellationToken) {
    let status = match session.status(cancel).await {
        Ok(status) => status,
        Err(e) => error!("Cannot read session status: {}", e),
    };

    if !status.authenticated {
        info!("Not logged in. Run `spotlib login`.");
        return;
    }

    let expires = DateTime::from_timestamp(status.expires_at, 0)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| status.expires_at.to_string());

    success!("Logged in as {} ({})", status.display_name, status.user_id);
    info!("Token expires at {}", expires);
    info!("Scope: {}", status.scope);
}

pub async fn logout(session: &SessionManager) {
    match session.logout().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Logout failed: {}", e),
    }
}
