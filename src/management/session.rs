//! Session manager: the single owner of auth state.
//!
//! Construct one [`SessionManager`] at process start and clone the handle into
//! every caller. Tokens, the cached profile and the active login attempt sit
//! behind one internal lock; every operation (including the callback handler
//! running on the loopback server) goes through it, so a login completion and
//! a concurrent status check never interleave.
//!
//! ```text
//! Unauthenticated ──start_login──▶ LoginPending ──callback ok──▶ Authenticated
//!        ▲                                                       │    ▲
//!        └──────────── logout / refresh failure ◀────────────────┘    │
//!                                                  stale token ─▶ Refreshing
//! ```

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{Error, Result},
    management::{
        credentials::{self, Credentials},
        token::TokenStore,
    },
    server,
    spotify::{ApiClient, auth, library, normalize},
    types::{
        AuthStatus, CallbackParams, CanonicalTrack, LoginResponse, PlaylistSummary,
        PlaylistWithTracks, Token, UserProfile,
    },
    utils,
};

/// Upper bound on waiting for a replaced listener to release its socket.
const LISTENER_CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// How a callback request ended, for the HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Tokens stored and profile fetched.
    Completed,
    /// The request itself was bad (missing or mismatched parameters).
    Rejected(&'static str),
    /// Exchange, persistence or profile fetch failed.
    Failed(&'static str),
}

/// Handle to the shared session. Cheap to clone.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    api: ApiClient,
    store: TokenStore,
    state: Mutex<SessionState>,
}

#[derive(Default)]
struct SessionState {
    tokens: Option<Token>,
    profile: Option<UserProfile>,
    login: Option<LoginSession>,
    login_rx: Option<mpsc::Receiver<Result<()>>>,
    /// Listener of a finished attempt that may still be shutting down.
    closing: Option<(u64, JoinHandle<()>)>,
    generation: u64,
}

/// One in-flight login attempt. Dropping it stops its loopback listener.
struct LoginSession {
    generation: u64,
    verifier: String,
    state: String,
    redirect_uri: String,
    shutdown: CancellationToken,
    server: Option<JoinHandle<()>>,
    result_tx: mpsc::Sender<Result<()>>,
}

impl Drop for LoginSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl LoginSession {
    /// Stops the listener and waits until its socket is closed.
    ///
    /// Must not be called with the session lock held: a callback in flight on
    /// this listener needs the lock to finish.
    async fn close(mut self) {
        self.shutdown.cancel();
        let generation = self.generation;
        let server = self.server.take();
        drop(self);

        if let Some(server) = server {
            wait_for_listener(generation, server).await;
        }
    }

    /// Single-slot, best-effort: a second outcome for the same attempt is dropped.
    fn publish(&self, outcome: Result<()>) {
        if self.result_tx.try_send(outcome).is_err() {
            debug!(generation = self.generation, "Login result already published, dropping");
        }
    }
}

impl SessionManager {
    pub fn new(config: Config) -> Self {
        Self::with_api_client(config, ApiClient::new())
    }

    pub fn with_api_client(config: Config, api: ApiClient) -> Self {
        let store = TokenStore::new(config.token_path());
        Self {
            inner: Arc::new(Inner {
                config,
                api,
                store,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Starts a login attempt and returns the URL the user must open.
    ///
    /// Any previous attempt is torn down first, and its listener has released
    /// its socket before the new one binds. The loopback listener binds the
    /// configured address, or an ephemeral port on the same host if that one
    /// is busy, and stays up until one callback has been handled, the attempt
    /// is superseded, or `cancel` fires.
    pub async fn start_login(&self, cancel: &CancellationToken) -> Result<LoginResponse> {
        let config = &self.inner.config;
        let mut state = loop {
            let mut state = self.inner.state.lock().await;
            state.login_rx = None;
            let previous = state.login.take();
            let closing = state.closing.take();
            if previous.is_none() && closing.is_none() {
                break state;
            }
            drop(state);

            if let Some(previous) = previous {
                info!(generation = previous.generation, "Closing previous login listener");
                previous.close().await;
            }
            if let Some((generation, server)) = closing {
                wait_for_listener(generation, server).await;
            }
        };

        let client_id = credentials::client_id(config)
            .await?
            .ok_or(Error::MissingClientCredentials)?;

        let listener = server::bind_callback_listener(&config.callback_addr).await?;
        let redirect_uri = format!("http://{}/callback", listener.local_addr()?);

        let verifier = utils::generate_code_verifier();
        let csrf_state = utils::generate_state();
        let url = auth::authorize_url(config, &client_id, &redirect_uri, &csrf_state, &verifier)?;

        state.generation += 1;
        let generation = state.generation;
        let shutdown = cancel.child_token();
        let (result_tx, result_rx) = mpsc::channel(1);

        let server =
            server::spawn_callback_server(listener, self.clone(), generation, shutdown.clone());

        state.login = Some(LoginSession {
            generation,
            verifier,
            state: csrf_state,
            redirect_uri: redirect_uri.clone(),
            shutdown,
            server: Some(server),
            result_tx,
        });
        state.login_rx = Some(result_rx);
        info!(generation, redirect_uri = %redirect_uri, "Login started");

        Ok(LoginResponse { url, redirect_uri })
    }

    /// Handles the redirect for login attempt `generation`.
    ///
    /// Exactly one request is processed per attempt: the attempt is removed
    /// from the session up front and its listener stops when this returns,
    /// whatever the outcome. The outcome is also published on the login
    /// result channel.
    pub async fn complete_login(&self, generation: u64, params: CallbackParams) -> LoginOutcome {
        let mut state = self.inner.state.lock().await;

        let mut login = match state.login.take_if(|login| login.generation == generation) {
            Some(login) => login,
            None if state.login.is_some() => {
                warn!(generation, "Callback for a superseded login attempt");
                return LoginOutcome::Rejected("This login attempt was replaced by a newer one");
            }
            None => {
                warn!(generation, "Callback without a pending login");
                return LoginOutcome::Rejected("No login in progress");
            }
        };

        // The handler runs on this listener and cannot wait for it; the next
        // start_login does.
        state.closing = login.server.take().map(|server| (generation, server));

        let result = self.finish_login_locked(&mut state, &login, params).await;
        let outcome = match &result {
            Ok(()) => {
                info!(generation, "Login completed");
                LoginOutcome::Completed
            }
            Err(e) => {
                warn!(generation, error = %e, "Login failed");
                match e {
                    Error::MalformedCallback(_) => {
                        LoginOutcome::Rejected("Invalid response from Spotify")
                    }
                    Error::StateMismatch => LoginOutcome::Rejected("State mismatch"),
                    Error::TokenExchange(_) | Error::MissingClientCredentials => {
                        LoginOutcome::Failed("Failed to exchange code")
                    }
                    Error::Io(_) | Error::Json(_) | Error::EmptyAccessToken => {
                        LoginOutcome::Failed("Failed to persist token")
                    }
                    Error::Cancelled => LoginOutcome::Failed("Login was cancelled"),
                    _ => LoginOutcome::Failed("Failed to fetch profile"),
                }
            }
        };

        login.publish(result);
        outcome
    }

    async fn finish_login_locked(
        &self,
        state: &mut SessionState,
        login: &LoginSession,
        params: CallbackParams,
    ) -> Result<()> {
        if let Some(error) = params.error.as_deref() {
            warn!(error, "Spotify reported an authorization error");
        }

        let returned_state = non_empty(params.state).ok_or(Error::MalformedCallback("state"))?;
        let code = non_empty(params.code).ok_or(Error::MalformedCallback("code"))?;

        if returned_state != login.state {
            return Err(Error::StateMismatch);
        }

        let config = &self.inner.config;
        let credentials = Credentials::resolve(config).await?;
        let token = auth::exchange_code(
            self.inner.api.http(),
            config,
            &credentials,
            &login.shutdown,
            &code,
            &login.redirect_uri,
            &login.verifier,
        )
        .await?;

        self.save_tokens_locked(state, token).await?;

        let profile = self.fetch_profile_locked(state, &login.shutdown).await?;
        state.profile = Some(profile);
        Ok(())
    }

    /// Non-blocking check for the result of the current login attempt.
    pub async fn poll_login(&self) -> Option<Result<()>> {
        let mut state = self.inner.state.lock().await;
        state.login_rx.as_mut()?.try_recv().ok()
    }

    /// Waits up to `timeout` for the current login attempt to finish.
    pub async fn wait_for_login(&self, timeout: Duration) -> Result<()> {
        let mut rx = {
            let mut state = self.inner.state.lock().await;
            state.login_rx.take().ok_or(Error::NoLoginPending)?
        };

        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(result)) => result,
            // Sender dropped without a result: a newer attempt replaced this one.
            Ok(None) => Err(Error::LoginSuperseded),
            Err(_) => Err(Error::LoginTimedOut),
        }
    }

    /// Abandons the pending login attempt and waits for its listener to close.
    pub async fn cancel_login(&self) {
        let login = {
            let mut state = self.inner.state.lock().await;
            state.login_rx = None;
            state.login.take()
        };
        if let Some(login) = login {
            info!(generation = login.generation, "Login cancelled");
            login.close().await;
        }
    }

    pub async fn login_pending(&self) -> bool {
        self.inner.state.lock().await.login.is_some()
    }

    /// Reports the current session, refreshing the token and fetching the
    /// profile when needed. No stored token is not an error.
    pub async fn status(&self, cancel: &CancellationToken) -> Result<AuthStatus> {
        let mut state = self.inner.state.lock().await;

        self.load_tokens_locked(&mut state).await?;
        if state.tokens.is_none() {
            return Ok(AuthStatus::default());
        }

        self.ensure_fresh_token_locked(&mut state, cancel).await?;

        if state.profile.is_none() {
            let profile = self.fetch_profile_locked(&mut state, cancel).await?;
            state.profile = Some(profile);
        }

        let (Some(tokens), Some(profile)) = (state.tokens.as_ref(), state.profile.as_ref()) else {
            return Err(Error::NotAuthenticated);
        };

        Ok(AuthStatus {
            authenticated: true,
            display_name: profile.display_name.clone(),
            user_id: profile.id.clone(),
            avatar_url: normalize::first_image_url(&profile.images),
            expires_at: tokens.expires_at,
            scope: tokens.scope.clone(),
        })
    }

    /// Forgets the token and profile and deletes the token file. Idempotent.
    pub async fn logout(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        state.tokens = None;
        state.profile = None;
        self.inner.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    pub async fn fetch_playlists(&self, cancel: &CancellationToken) -> Result<Vec<PlaylistSummary>> {
        let token = self.access_token(cancel).await?;
        library::playlists(&self.inner.api, &self.inner.config, cancel, &token).await
    }

    pub async fn fetch_saved_tracks(&self, cancel: &CancellationToken) -> Result<Vec<CanonicalTrack>> {
        let token = self.access_token(cancel).await?;
        library::saved_tracks(&self.inner.api, &self.inner.config, cancel, &token).await
    }

    pub async fn fetch_playlist_with_tracks(
        &self,
        cancel: &CancellationToken,
        playlist_id: &str,
    ) -> Result<PlaylistWithTracks> {
        let token = self.access_token(cancel).await?;
        library::playlist_with_tracks(
            &self.inner.api,
            &self.inner.config,
            cancel,
            &token,
            playlist_id,
        )
        .await
    }

    /// Fresh access token for a library call. The lock is released before the
    /// caller starts paging.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String> {
        let mut state = self.inner.state.lock().await;
        self.load_tokens_locked(&mut state).await?;
        self.ensure_fresh_token_locked(&mut state, cancel).await?;
        state
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(Error::NotAuthenticated)
    }

    async fn load_tokens_locked(&self, state: &mut SessionState) -> Result<()> {
        if state.tokens.is_none() {
            state.tokens = self.inner.store.load().await?;
        }
        Ok(())
    }

    async fn ensure_fresh_token_locked(
        &self,
        state: &mut SessionState,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let Some(current) = state.tokens.as_ref() else {
            return Err(Error::NotAuthenticated);
        };

        if !current.is_stale(Utc::now().timestamp()) {
            return Ok(());
        }
        if current.refresh_token.is_empty() {
            return Err(Error::MissingRefreshToken);
        }

        info!(expires_at = current.expires_at, "Access token stale, refreshing");
        let refresh = current.refresh_token.clone();
        let config = &self.inner.config;
        let credentials = Credentials::resolve(config).await?;
        let refreshed =
            auth::refresh_token(self.inner.api.http(), config, &credentials, cancel, &refresh)
                .await?;

        self.save_tokens_locked(state, refreshed).await
    }

    async fn save_tokens_locked(&self, state: &mut SessionState, token: Token) -> Result<()> {
        self.inner.store.persist(&token).await?;
        state.tokens = Some(token);
        Ok(())
    }

    async fn fetch_profile_locked(
        &self,
        state: &mut SessionState,
        cancel: &CancellationToken,
    ) -> Result<UserProfile> {
        self.ensure_fresh_token_locked(state, cancel).await?;
        let token = state
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or(Error::NotAuthenticated)?;

        let url = self.inner.config.api_endpoint("/me");
        let profile: UserProfile = self.inner.api.get_json(cancel, &url, &token).await?;
        debug!(user_id = %profile.id, "Fetched profile");
        Ok(profile)
    }
}

async fn wait_for_listener(generation: u64, server: JoinHandle<()>) {
    match tokio::time::timeout(LISTENER_CLOSE_TIMEOUT, server).await {
        Ok(Ok(())) => debug!(generation, "Login listener closed"),
        Ok(Err(e)) => warn!(generation, error = %e, "Login listener task failed"),
        Err(_) => warn!(generation, "Login listener did not close in time"),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
