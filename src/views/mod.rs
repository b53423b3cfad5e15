//! HTML rendering: the startup-built template registry plus the per-request
//! context every view receives (flashes, current user, enabled tools).

pub mod registry;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use tera::Context;

use crate::error::ConsoleError;
use crate::middleware::{CurrentUser, Session};
pub use registry::Templates;

pub const ADMIN_ERROR_VIEW: &str = "admin/error.html";
pub const PUBLIC_ERROR_VIEW: &str = "public/error.html";

pub struct Views {
    templates: Templates,
    tools_enabled: bool,
}

impl Views {
    pub fn new(templates: Templates, tools_enabled: bool) -> Self {
        Self {
            templates,
            tools_enabled,
        }
    }

    /// Render `name`, draining the session's flashes into the page. The
    /// session goes back out with the response so the drain is persisted.
    pub fn render(
        &self,
        session: Session,
        user: &CurrentUser,
        status: StatusCode,
        name: &str,
        ctx: ViewContext,
    ) -> Result<Response, ConsoleError> {
        let mut session = session;
        let mut ctx = ctx.0;
        ctx.insert("flashes", &session.take_flashes());
        ctx.insert("current_user", &user.0);
        ctx.insert("tools_enabled", &self.tools_enabled);

        let body = self.templates.render(name, &ctx)?;
        Ok((session, (status, Html(body))).into_response())
    }

    /// The namespace's error view with a 404 status.
    pub fn not_found(
        &self,
        session: Session,
        user: &CurrentUser,
        view: &str,
        message: impl Into<String>,
    ) -> Result<Response, ConsoleError> {
        let ctx = ViewContext::new().with("errors", &vec![message.into()]);
        self.render(session, user, StatusCode::NOT_FOUND, view, ctx)
    }
}

/// Builder over `tera::Context` for the values a handler passes to a view.
#[derive(Default)]
pub struct ViewContext(Context);

impl ViewContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.0.insert(key, value);
        self
    }
}
