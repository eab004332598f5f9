use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    api::{self, CallbackState},
    management::SessionManager,
};

/// Binds the loopback listener for the OAuth redirect.
///
/// `preferred` is tried first so the redirect URI matches the one registered
/// with Spotify; if it is taken, an ephemeral port on the same host is used.
pub async fn bind_callback_listener(preferred: &str) -> io::Result<TcpListener> {
    match TcpListener::bind(preferred).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            let fallback = ephemeral_fallback(preferred);
            warn!(preferred, %fallback, error = %e, "Callback address unavailable, using an ephemeral port");
            TcpListener::bind(fallback).await
        }
    }
}

fn ephemeral_fallback(preferred: &str) -> SocketAddr {
    let ip = preferred
        .parse::<SocketAddr>()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
    SocketAddr::new(ip, 0)
}

/// Serves `/callback` for login attempt `generation` until `shutdown` fires.
///
/// The session cancels `shutdown` once it has handled one callback; the
/// in-flight response still completes through graceful shutdown.
pub fn spawn_callback_server(
    listener: TcpListener,
    session: SessionManager,
    generation: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let app = Router::new()
        .route("/callback", get(api::callback))
        .with_state(CallbackState {
            session,
            generation,
        });

    tokio::spawn(async move {
        let addr = listener.local_addr().ok();
        debug!(?addr, generation, "Callback server listening");

        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await });
        if let Err(e) = serve.await {
            warn!(error = %e, "Callback server failed");
        }

        debug!(?addr, generation, "Callback server stopped");
    })
}
