use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Redirect, Response};
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::db::User;
use crate::error::ConsoleError;
use crate::handlers::{parse_id, redirect_with};
use crate::middleware::{CurrentUser, Session};
use crate::server::router::ConsoleState;
use crate::service::accounts;
use crate::types::forms::{UserInput, UserUpdateInput, human_validation_errors};
use crate::views::{ADMIN_ERROR_VIEW, ViewContext};

pub const USERS_PATH: &str = "/admin/users";

const NOT_FOUND: &str = "User not found";

/// GET /admin
pub async fn admin_root() -> Redirect {
    Redirect::to(USERS_PATH)
}

async fn load(state: &ConsoleState, raw_id: &str) -> Result<Option<User>, ConsoleError> {
    match parse_id(raw_id) {
        Some(id) => state.storage.find_user(id).await,
        None => Ok(None),
    }
}

/// GET /admin/users
pub async fn index(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let users = state.storage.list_users().await?;
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/users/index.html",
        ViewContext::new().with("users", &users),
    )
}

/// GET /admin/users/{id}
pub async fn show(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let Some(record) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };

    let user_json = match serde_json::to_string_pretty(&record) {
        Ok(json) => json,
        Err(e) => {
            return state
                .views
                .not_found(session, &user, ADMIN_ERROR_VIEW, e.to_string());
        }
    };

    let ctx = ViewContext::new()
        .with("user", &record)
        .with("user_json", &user_json);
    state
        .views
        .render(session, &user, StatusCode::OK, "admin/users/show.html", ctx)
}

/// GET /admin/users/new
pub async fn new(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/users/new.html",
        ViewContext::new().with("user", &UserInput::default()),
    )
}

/// POST /admin/users/create
pub async fn create(
    State(state): State<ConsoleState>,
    mut session: Session,
    user: CurrentUser,
    Form(input): Form<UserInput>,
) -> Result<Response, ConsoleError> {
    const VIEW: &str = "admin/users/new.html";

    if let Err(errs) = input.validate() {
        let ctx = ViewContext::new()
            .with("errors", &human_validation_errors(&errs))
            .with("user", &input);
        return state
            .views
            .render(session, &user, StatusCode::BAD_REQUEST, VIEW, ctx);
    }

    let hashed = accounts::hash(input.password.clone()).await?;
    let candidate = User::new(input.login.as_str(), hashed);

    match state.storage.insert_user(&candidate).await {
        Ok(saved) => {
            info!(user_id = saved.id, login = %saved.login, "user created");
            session.add_flash("User was added.");
            Ok(redirect_with(session, USERS_PATH))
        }
        Err(e) => {
            warn!(login = %input.login, error = %e, "user insert failed");
            let ctx = ViewContext::new()
                .with("errors", &vec![e.to_string()])
                .with("user", &input);
            state
                .views
                .render(session, &user, StatusCode::INTERNAL_SERVER_ERROR, VIEW, ctx)
        }
    }
}

/// GET /admin/users/{id}/edit
pub async fn edit(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let Some(record) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/users/edit.html",
        ViewContext::new().with("user", &record),
    )
}

/// POST /admin/users/{id}/update
pub async fn update(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    mut session: Session,
    user: CurrentUser,
    Form(input): Form<UserUpdateInput>,
) -> Result<Response, ConsoleError> {
    const VIEW: &str = "admin/users/edit.html";

    let Some(mut record) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };

    let input = input.normalized();
    record.login = input.login.clone();
    record.updated_at = Utc::now();

    if let Err(errs) = input.validate() {
        let ctx = ViewContext::new()
            .with("errors", &human_validation_errors(&errs))
            .with("user", &record);
        return state
            .views
            .render(session, &user, StatusCode::BAD_REQUEST, VIEW, ctx);
    }

    if let Some(password) = input.password {
        record.password = accounts::hash(password).await?;
    }

    match state.storage.save_user(&record).await {
        Ok(()) => {
            info!(user_id = record.id, login = %record.login, "user updated");
            session.add_flash("User was edited.");
            Ok(redirect_with(session, USERS_PATH))
        }
        Err(e) => {
            warn!(user_id = record.id, error = %e, "user update failed");
            let ctx = ViewContext::new()
                .with("errors", &vec![e.to_string()])
                .with("user", &record);
            state
                .views
                .render(session, &user, StatusCode::INTERNAL_SERVER_ERROR, VIEW, ctx)
        }
    }
}

/// POST /admin/users/{id}/delete -> always back to the index.
pub async fn destroy(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    mut session: Session,
) -> Response {
    let outcome = match parse_id(&id) {
        Some(id) => state.storage.delete_user(id).await,
        None => Ok(0),
    };

    match outcome {
        Ok(0) => session.add_flash("User not found."),
        Ok(_) => {
            info!(user_id = %id, "user deleted");
            session.add_flash("User was deleted.");
        }
        Err(e) => {
            warn!(user_id = %id, error = %e, "user delete failed");
            session.add_flash(e.to_string());
        }
    }
    redirect_with(session, USERS_PATH)
}
