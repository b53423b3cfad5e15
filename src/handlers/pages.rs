use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use chrono::Utc;
use tracing::{info, warn};
use validator::Validate;

use crate::db::Page;
use crate::error::ConsoleError;
use crate::handlers::{parse_id, redirect_with};
use crate::middleware::{CurrentUser, Session};
use crate::server::router::ConsoleState;
use crate::types::forms::{PageInput, human_validation_errors};
use crate::views::{ADMIN_ERROR_VIEW, ViewContext};

pub const PAGES_PATH: &str = "/admin/pages";

const NOT_FOUND: &str = "Page not found";

async fn load(state: &ConsoleState, raw_id: &str) -> Result<Option<Page>, ConsoleError> {
    match parse_id(raw_id) {
        Some(id) => state.storage.find_page(id).await,
        None => Ok(None),
    }
}

/// GET /admin/pages
pub async fn index(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let pages = state.storage.list_pages().await?;
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/pages/index.html",
        ViewContext::new().with("pages", &pages),
    )
}

/// GET /admin/pages/{id}
pub async fn show(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let Some(page) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };

    let page_json = match serde_json::to_string_pretty(&page) {
        Ok(json) => json,
        Err(e) => {
            return state
                .views
                .not_found(session, &user, ADMIN_ERROR_VIEW, e.to_string());
        }
    };

    let ctx = ViewContext::new()
        .with("page", &page)
        .with("page_json", &page_json);
    state
        .views
        .render(session, &user, StatusCode::OK, "admin/pages/show.html", ctx)
}

/// GET /admin/pages/new
pub async fn new(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/pages/new.html",
        ViewContext::new().with("page", &PageInput::default()),
    )
}

/// POST /admin/pages/create
pub async fn create(
    State(state): State<ConsoleState>,
    mut session: Session,
    user: CurrentUser,
    Form(input): Form<PageInput>,
) -> Result<Response, ConsoleError> {
    const VIEW: &str = "admin/pages/new.html";

    let candidate = Page::new(input.slug.as_str(), input.content.as_str());

    if let Err(errs) = input.validate() {
        let ctx = ViewContext::new()
            .with("errors", &human_validation_errors(&errs))
            .with("page", &input);
        return state
            .views
            .render(session, &user, StatusCode::BAD_REQUEST, VIEW, ctx);
    }

    match state.storage.insert_page(&candidate).await {
        Ok(saved) => {
            info!(page_id = saved.id, slug = %saved.slug, "page created");
            session.add_flash("Page was added.");
            Ok(redirect_with(session, PAGES_PATH))
        }
        Err(e) => {
            warn!(slug = %input.slug, error = %e, "page insert failed");
            let ctx = ViewContext::new()
                .with("errors", &vec![e.to_string()])
                .with("page", &input);
            state
                .views
                .render(session, &user, StatusCode::INTERNAL_SERVER_ERROR, VIEW, ctx)
        }
    }
}

/// GET /admin/pages/{id}/edit
pub async fn edit(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let Some(page) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "admin/pages/edit.html",
        ViewContext::new().with("page", &page),
    )
}

/// POST /admin/pages/{id}/update
pub async fn update(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    mut session: Session,
    user: CurrentUser,
    Form(input): Form<PageInput>,
) -> Result<Response, ConsoleError> {
    const VIEW: &str = "admin/pages/edit.html";

    let Some(mut page) = load(&state, &id).await? else {
        return state
            .views
            .not_found(session, &user, ADMIN_ERROR_VIEW, NOT_FOUND);
    };

    page.slug = input.slug.clone();
    page.content = input.content.clone();
    page.updated_at = Utc::now();

    if let Err(errs) = input.validate() {
        let ctx = ViewContext::new()
            .with("errors", &human_validation_errors(&errs))
            .with("page", &page);
        return state
            .views
            .render(session, &user, StatusCode::BAD_REQUEST, VIEW, ctx);
    }

    match state.storage.save_page(&page).await {
        Ok(()) => {
            info!(page_id = page.id, slug = %page.slug, "page updated");
            session.add_flash("Page was edited.");
            Ok(redirect_with(session, PAGES_PATH))
        }
        Err(e) => {
            warn!(page_id = page.id, error = %e, "page update failed");
            let ctx = ViewContext::new()
                .with("errors", &vec![e.to_string()])
                .with("page", &page);
            state
                .views
                .render(session, &user, StatusCode::INTERNAL_SERVER_ERROR, VIEW, ctx)
        }
    }
}

/// POST /admin/pages/{id}/delete -> always back to the index.
pub async fn destroy(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    mut session: Session,
) -> Response {
    let outcome = match parse_id(&id) {
        Some(id) => state.storage.delete_page(id).await,
        None => Ok(0),
    };

    match outcome {
        Ok(0) => session.add_flash("Page not found."),
        Ok(_) => {
            info!(page_id = %id, "page deleted");
            session.add_flash("Page was deleted.");
        }
        Err(e) => {
            warn!(page_id = %id, error = %e, "page delete failed");
            session.add_flash(e.to_string());
        }
    }
    redirect_with(session, PAGES_PATH)
}
