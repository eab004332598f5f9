use thiserror::Error;

/// Every failure the session and library operations can report.
///
/// Login-flow errors (`MalformedCallback`, `StateMismatch`, `TokenExchange`)
/// are delivered to the waiting login attempt; everything else surfaces from
/// the operation that triggered it. Nothing in this crate retries on its own.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed callback: missing `{0}` query parameter")]
    MalformedCallback(&'static str),

    #[error("callback state does not match the issued state (possible CSRF or replay)")]
    StateMismatch,

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("token refresh failed: {0}")]
    Refresh(String),

    #[error("no refresh token stored, log in again")]
    MissingRefreshToken,

    #[error("missing Spotify client id or client secret")]
    MissingClientCredentials,

    #[error("not authenticated with Spotify")]
    NotAuthenticated,

    #[error("no login in progress")]
    NoLoginPending,

    #[error("login attempt was superseded by a newer one")]
    LoginSuperseded,

    #[error("timed out waiting for the Spotify redirect")]
    LoginTimedOut,

    #[error("refusing to persist a token without an access token")]
    EmptyAccessToken,

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("failed fetching page at offset {offset}: {source}")]
    Pagination {
        offset: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("page worker exited before reporting a result")]
    WorkerLost,

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
