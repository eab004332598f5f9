use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
};

use crate::{
    management::{LoginOutcome, SessionManager},
    types::CallbackParams,
};

/// Router state for one login attempt's listener.
#[derive(Clone)]
pub struct CallbackState {
    pub session: SessionManager,
    pub generation: u64,
}

const SUCCESS_PAGE: &str = "<html><body><h2>Spotify login successful.</h2><p>You can close this window.</p></body></html>";

pub async fn callback(
    State(callback_state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    let outcome = callback_state
        .session
        .complete_login(callback_state.generation, params)
        .await;

    match outcome {
        LoginOutcome::Completed => (StatusCode::OK, Html(SUCCESS_PAGE.to_string())),
        LoginOutcome::Rejected(message) => (StatusCode::BAD_REQUEST, Html(error_page(message))),
        LoginOutcome::Failed(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(error_page(message)),
        ),
    }
}

fn error_page(message: &str) -> String {
    format!(
        "<html><body><h4>Login failed.</h4><p>{}</p></body></html>",
        message
    )
}
