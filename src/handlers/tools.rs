//! Diagnostic routes, mounted only when `routes.tools` is enabled.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::db::RawQueryError;
use crate::db::raw::JsonRow;
use crate::error::ConsoleError;
use crate::handlers::redirect_with;
use crate::middleware::{CurrentUser, Session};
use crate::server::router::ConsoleState;
use crate::views::ViewContext;

const TOOLS_PATH: &str = "/tools";

#[derive(Debug, Deserialize)]
pub struct SqlQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SqlResponse {
    pub q: String,
    pub out: Vec<JsonRow>,
}

/// GET /tools
pub async fn index(
    State(state): State<ConsoleState>,
    session: Session,
    user: CurrentUser,
) -> Result<Response, ConsoleError> {
    state.views.render(
        session,
        &user,
        StatusCode::OK,
        "public/tools.html",
        ViewContext::new(),
    )
}

/// GET /tools/db-clear -> wipe users, then pages.
pub async fn db_clear(State(state): State<ConsoleState>, mut session: Session) -> Response {
    let message = match state.storage.clear_users().await {
        Err(e) => format!("Error clearing users: {e}"),
        Ok(users) => match state.storage.clear_pages().await {
            Err(e) => format!("Error clearing pages: {e}"),
            Ok(pages) => {
                info!(users, pages, "database cleared");
                "Database cleared successfully.".to_string()
            }
        },
    };
    session.add_flash(message);
    redirect_with(session, TOOLS_PATH)
}

/// GET /tools/seed -> default admin account and about page.
pub async fn seed(State(state): State<ConsoleState>, mut session: Session) -> Response {
    let message = match state.storage.seed_admin().await {
        Err(e) => format!("Error seeding database: {e}"),
        Ok(_) => match state.storage.seed_about_page().await {
            Err(e) => format!("Error seeding database: {e}"),
            Ok(_) => {
                info!("database seeded");
                "Database seeded successfully.".to_string()
            }
        },
    };
    session.add_flash(message);
    redirect_with(session, TOOLS_PATH)
}

/// GET /tools/sql?q=... -> `{"q": ..., "out": [row, ...]}`
pub async fn sql(State(state): State<ConsoleState>, Query(query): Query<SqlQuery>) -> Response {
    let Some(q) = query.q.filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing 'q' parameter" })),
        )
            .into_response();
    };

    match state.storage.run_raw(&q).await {
        Ok(out) => Json(SqlResponse { q, out }).into_response(),
        Err(e) => {
            warn!(sql = %q, error = %e, "raw sql failed");
            let status = match e {
                RawQueryError::Execute(_) => StatusCode::INTERNAL_SERVER_ERROR,
                RawQueryError::Decode { .. } => StatusCode::BAD_REQUEST,
            };
            (status, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
