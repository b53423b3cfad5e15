use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use tracing::info;

use crate::error::ConsoleError;
use crate::handlers::redirect_with;
use crate::handlers::users::USERS_PATH;
use crate::middleware::{CurrentUser, Session};
use crate::server::router::ConsoleState;
use crate::service::accounts;
use crate::types::forms::LoginForm;
use crate::views::ViewContext;

const LOGIN_VIEW: &str = "public/login.html";

/// GET /login
pub async fn login_form(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    if user.is_logged_in() {
        return Ok(redirect_with(session, USERS_PATH));
    }
    state
        .views
        .render(session, &user, StatusCode::OK, LOGIN_VIEW, ViewContext::new())
}

/// POST /login
pub async fn login_submit(
    State(state): State<ConsoleState>,
    mut session: Session,
    user: CurrentUser,
    Form(form): Form<LoginForm>,
) -> Result<Response, ConsoleError> {
    if user.is_logged_in() {
        return Ok(redirect_with(session, USERS_PATH));
    }

    let Some(account) = accounts::authenticate(&state.storage, &form.login, &form.password).await?
    else {
        let ctx = ViewContext::new()
            .with("errors", &vec!["Invalid username or password"])
            .with("login", &form.login);
        return state
            .views
            .render(session, &user, StatusCode::UNAUTHORIZED, LOGIN_VIEW, ctx);
    };

    info!(user_id = account.id, login = %account.login, "user logged in");
    session.log_in(account.id);
    Ok(redirect_with(session, USERS_PATH))
}

/// GET|POST /logout
pub async fn logout(mut session: Session) -> Response {
    if let Some(user_id) = session.user_id() {
        info!(user_id, "user logged out");
    }
    session.log_out();
    session.add_flash("Logged out");
    redirect_with(session, USERS_PATH)
}
