//! # API Module
//!
//! HTTP handlers served by the ephemeral loopback listener during login.
//!
//! ## Endpoints
//!
//! - [`callback`] - `GET /callback?state=…&code=…`, the OAuth redirect target.
//!   Responds `400` for missing or mismatched parameters, `500` when the code
//!   exchange or profile fetch fails and `200` with a confirmation page on
//!   success. Each listener handles exactly one callback; see
//!   [`SessionManager::complete_login`](crate::management::SessionManager::complete_login).
//!
//! ## Related Modules
//!
//! - [`crate::server`] - binds and runs the listener
//! - [`crate::management`] - session state the handler completes

mod callback;

pub use callback::{CallbackState, callback};
