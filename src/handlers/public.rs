use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::error::ConsoleError;
use crate::middleware::{CurrentUser, Session};
use crate::server::router::ConsoleState;
use crate::views::{PUBLIC_ERROR_VIEW, ViewContext};

/// GET / -> list of public pages.
pub async fn root(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let pages = state.storage.list_pages().await?;
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "public/index.html",
        ViewContext::new().with("pages", &pages),
    )
}

/// GET /pages/{slug}
pub async fn page(
    State(state): State<ConsoleState>,
    Path(slug): Path<String>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    let Some(page) = state.storage.find_page_by_slug(&slug).await? else {
        return state
            .views
            .not_found(session, &user, PUBLIC_ERROR_VIEW, "Page not found");
    };

    let page_json = match serde_json::to_string_pretty(&page) {
        Ok(json) => json,
        Err(e) => {
            return state
                .views
                .not_found(session, &user, PUBLIC_ERROR_VIEW, e.to_string());
        }
    };

    let ctx = ViewContext::new()
        .with("slug", &slug)
        .with("page", &page)
        .with("page_json", &page_json);
    state
        .views
        .render(session, &user, StatusCode::OK, "public/page.html", ctx)
}
