//! # Spotify Integration Module
//!
//! Talks to the Spotify Accounts service and Web API on behalf of the
//! [`SessionManager`](crate::management::SessionManager). None of these
//! functions own a token; the session hands a fresh one to every call.
//!
//! ## Architecture
//!
//! ```text
//! SessionManager (token freshness, login state)
//!          ↓
//! Spotify Integration Layer
//!     ├── auth        authorize URL, code exchange, refresh
//!     ├── client      stateless bearer GET + JSON decode
//!     ├── library     playlists, saved tracks, playlist tracks
//!     ├── pagination  bounded worker pool for offset pages
//!     └── normalize   Spotify payloads → CanonicalTrack
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Pagination
//!
//! Playlists are listed by following the `next` cursor because the total is
//! unknown until the last page. Saved tracks and playlist tracks read the
//! total from the first page and fetch the rest concurrently with at most
//! [`pagination::WORKER_COUNT`] requests in flight.
//!
//! ## Errors and retries
//!
//! Non-2xx responses become [`Error::HttpStatus`](crate::Error::HttpStatus)
//! with the body preserved. Nothing here retries; a caller that wants retry
//! decides its own policy.
//!
//! ## Cancellation
//!
//! Every network call takes a `CancellationToken` and resolves to
//! [`Error::Cancelled`](crate::Error::Cancelled) as soon as it fires.

pub mod auth;
pub mod client;
pub mod library;
pub mod normalize;
pub mod pagination;

pub use client::ApiClient;
