//! Route handlers. Each one validates input, talks to [`Storage`], sets
//! flashes and either renders a view or redirects (303 See Other).
//!
//! [`Storage`]: crate::db::Storage

pub mod auth;
pub mod pages;
pub mod public;
pub mod tools;
pub mod users;

use axum::response::{IntoResponse, Redirect, Response};

use crate::middleware::Session;

/// Ids arrive as path text; anything non-numeric is simply "not found".
pub(crate) fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// Persist the session (flashes included) and send the browser elsewhere.
pub(crate) fn redirect_with(session: Session, to: &str) -> Response {
    (session, Redirect::to(to)).into_response()
}
