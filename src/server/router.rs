use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::config::{Config, RoutesConfig};
use crate::db::Storage;
use crate::error::ConsoleError;
use crate::handlers::{auth, pages, public, tools, users};
use crate::middleware::{SessionConfig, require_auth, set_current_user};
use crate::views::{Templates, Views};

#[derive(Clone)]
pub struct ConsoleState {
    pub storage: Storage,
    pub views: Arc<Views>,
    pub routes: RoutesConfig,
    key: Key,
    session: SessionConfig,
}

impl ConsoleState {
    pub fn new(
        storage: Storage,
        views: Views,
        routes: RoutesConfig,
        key: Key,
        secure_cookie: bool,
    ) -> Self {
        Self {
            storage,
            views: Arc::new(views),
            routes,
            key,
            session: SessionConfig {
                secure: secure_cookie,
            },
        }
    }

    /// Open the database, seed it when empty and load templates. Any
    /// failure here is meant to stop the process.
    pub async fn from_config(cfg: &Config) -> Result<Self, ConsoleError> {
        let storage = Storage::connect(&cfg.basic.database_url, cfg.basic.max_connections).await?;
        storage.seed_if_empty().await?;

        let templates = Templates::load(&cfg.basic.templates_dir)?;
        let views = Views::new(templates, cfg.routes.tools);

        Ok(Self::new(
            storage,
            views,
            cfg.routes.clone(),
            cfg.cookie_key(),
            !cfg.basic.insecure_cookie,
        ))
    }
}

impl FromRef<ConsoleState> for Key {
    fn from_ref(state: &ConsoleState) -> Self {
        state.key.clone()
    }
}

impl FromRef<ConsoleState> for SessionConfig {
    fn from_ref(state: &ConsoleState) -> Self {
        state.session
    }
}

pub fn console_router(state: ConsoleState) -> Router {
    // Layers run bottom-up: require_auth first, then set_current_user.
    let admin = Router::new()
        .route("/users", get(users::index))
        .route("/users/new", get(users::new))
        .route("/users/create", post(users::create))
        .route("/users/{id}", get(users::show))
        .route("/users/{id}/edit", get(users::edit))
        .route("/users/{id}/update", post(users::update))
        .route("/users/{id}/delete", post(users::destroy))
        .route("/pages", get(pages::index))
        .route("/pages/new", get(pages::new))
        .route("/pages/create", post(pages::create))
        .route("/pages/{id}", get(pages::show))
        .route("/pages/{id}/edit", get(pages::edit))
        .route("/pages/{id}/update", post(pages::update))
        .route("/pages/{id}/delete", post(pages::destroy))
        .route_layer(from_fn_with_state(state.clone(), set_current_user))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    // Public pages render the layout's signed-in state but never require it.
    let sessioned = Router::new()
        .route("/", get(public::root))
        .route("/pages/{slug}", get(public::page))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route_layer(from_fn_with_state(state.clone(), set_current_user));

    let mut app = Router::new()
        .route("/admin", get(users::admin_root))
        .merge(sessioned)
        .nest("/admin", admin);

    if state.routes.tools {
        let tools = Router::new()
            .route("/", get(tools::index))
            .route("/db-clear", get(tools::db_clear))
            .route("/seed", get(tools::seed))
            .route("/sql", get(tools::sql))
            .route_layer(from_fn_with_state(state.clone(), set_current_user));
        app = app.nest("/tools", tools);
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
