use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, info, warn};

use crate::db::User;
use crate::middleware::session::Session;
use crate::server::router::ConsoleState;

pub const LOGIN_PATH: &str = "/login";

/// The logged-in user for this request, if `set_current_user` resolved one.
/// Routes without that middleware always see `CurrentUser(None)`.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn is_logged_in(&self) -> bool {
        self.0.is_some()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .unwrap_or_default())
    }
}

/// Attach the session's user to the request. A session pointing at a user
/// that cannot be loaded is treated as anonymous; the request still proceeds.
pub async fn set_current_user(
    State(state): State<ConsoleState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(user_id) = session.user_id() {
        match state.storage.find_user(user_id).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(CurrentUser(Some(user)));
            }
            Ok(None) => debug!(user_id, "session user no longer exists"),
            Err(e) => warn!(user_id, error = %e, "failed to load session user"),
        }
    }
    next.run(req).await
}

/// Reject anonymous requests with a redirect to the login form. A session
/// whose user is gone is cleared before redirecting.
pub async fn require_auth(
    State(state): State<ConsoleState>,
    mut session: Session,
    req: Request,
    next: Next,
) -> Response {
    let Some(user_id) = session.user_id() else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state.storage.find_user(user_id).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => {
            info!(user_id, "clearing session for deleted user");
            session.clear();
            (session, Redirect::to(LOGIN_PATH)).into_response()
        }
        Err(e) => {
            warn!(user_id, error = %e, "session user lookup failed; clearing session");
            session.clear();
            (session, Redirect::to(LOGIN_PATH)).into_response()
        }
    }
}
