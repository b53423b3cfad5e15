#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use crud_console::config::Config;
use crud_console::{ConsoleState, console_router};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: ConsoleState,
    cookie: Option<String>,
    db_path: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    pub body: String,
}

impl TestApp {
    pub async fn spawn(tools: bool) -> Self {
        Self::spawn_with(|cfg| cfg.routes.tools = tools).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut db_path = std::env::temp_dir();
        db_path.push(format!(
            "crud-console-test-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));

        let mut cfg = Config::default();
        cfg.basic.database_url = format!("sqlite:{}", db_path.display());
        cfg.basic.templates_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
        cfg.basic.session_secret = Some("integration-test-session-secret-0123456789".to_string());
        configure(&mut cfg);

        let state = ConsoleState::from_config(&cfg)
            .await
            .expect("failed to build console state");
        let app = console_router(state.clone());

        Self {
            app,
            state,
            cookie: None,
            db_path,
        }
    }

    pub fn forget_cookie(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let req = self.request("GET", uri).body(Body::empty()).expect("request");
        self.send(req).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let req = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .expect("request");
        self.send(req).await
    }

    pub async fn login(&mut self, login: &str, password: &str) -> TestResponse {
        self.post_form("/login", &format!("login={login}&password={password}"))
            .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        self.capture_cookie(&resp);

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = String::from_utf8(bytes.to_vec()).expect("response body was not utf-8");

        TestResponse {
            status,
            location,
            set_cookie,
            body,
        }
    }

    fn capture_cookie(&mut self, resp: &Response<Body>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default().trim();
            if let Some(v) = pair.strip_prefix("console_session=") {
                self.cookie = (!v.is_empty()).then(|| pair.to_string());
            }
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}
