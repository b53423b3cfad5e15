//! Cookie-backed session: the current user id plus a queue of flash messages.
//!
//! The whole session lives in one private cookie (encrypted and authenticated
//! with the server's [`Key`]), so there is no server-side session table.
//! Handlers take a [`Session`] as an extractor and hand it back in their
//! response; the cookie is only rewritten when something changed.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

pub const SESSION_COOKIE: &str = "console_session";
const SESSION_TTL: Duration = Duration::days(7);
/// Oldest flashes are dropped past this many; the queue rides in the cookie.
pub const MAX_FLASHES: usize = 8;

/// Cookie attributes that depend on deployment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub secure: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<String>,
}

impl SessionData {
    /// Undecodable payloads start a fresh session instead of failing the request.
    pub fn decode(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            debug!(error = %e, "discarding malformed session payload");
            Self::default()
        })
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.flashes.is_empty()
    }
}

pub struct Session {
    jar: PrivateCookieJar,
    data: SessionData,
    config: SessionConfig,
    dirty: bool,
}

impl Session {
    pub fn new(jar: PrivateCookieJar, config: SessionConfig) -> Self {
        let data = jar
            .get(SESSION_COOKIE)
            .map(|c| SessionData::decode(c.value()))
            .unwrap_or_default();
        Self {
            jar,
            data,
            config,
            dirty: false,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.data.user_id
    }

    pub fn log_in(&mut self, user_id: i64) {
        self.data.user_id = Some(user_id);
        self.dirty = true;
    }

    pub fn log_out(&mut self) {
        self.data.user_id = None;
        self.dirty = true;
    }

    pub fn add_flash(&mut self, message: impl Into<String>) {
        let flashes = &mut self.data.flashes;
        flashes.push(message.into());
        if flashes.len() > MAX_FLASHES {
            flashes.drain(..flashes.len() - MAX_FLASHES);
        }
        self.dirty = true;
    }

    /// Drain queued flashes; they will not be shown again.
    pub fn take_flashes(&mut self) -> Vec<String> {
        if self.data.flashes.is_empty() {
            return Vec::new();
        }
        self.dirty = true;
        std::mem::take(&mut self.data.flashes)
    }

    /// Forget everything, including pending flashes.
    pub fn clear(&mut self) {
        self.data = SessionData::default();
        self.dirty = true;
    }

    pub fn into_jar(self) -> PrivateCookieJar {
        if !self.dirty {
            return self.jar;
        }
        if self.data.is_empty() {
            return self.jar.remove(clear_cookie());
        }
        let cookie = build_cookie(self.data.encode(), self.config.secure);
        self.jar.add(cookie)
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    Key: FromRef<S>,
    SessionConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Session::new(jar, SessionConfig::from_ref(state)))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.into_jar().into_response_parts(res)
    }
}

fn build_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(SESSION_TTL)
        .build()
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(data: &SessionData) -> Session {
        let key = Key::generate();
        let jar = PrivateCookieJar::new(key).add(build_cookie(data.encode(), false));
        Session::new(jar, SessionConfig::default())
    }

    #[test]
    fn encodes_only_present_fields() {
        assert_eq!(SessionData::default().encode(), "{}");
        let data = SessionData {
            user_id: Some(7),
            flashes: vec!["hi".into()],
        };
        assert_eq!(SessionData::decode(&data.encode()), data);
    }

    #[test]
    fn malformed_payload_is_empty_session() {
        assert_eq!(SessionData::decode("not json"), SessionData::default());
    }

    #[test]
    fn flashes_drain_once() {
        let mut session = session_with(&SessionData {
            user_id: Some(1),
            flashes: vec!["User was added.".into()],
        });
        assert_eq!(session.user_id(), Some(1));
        assert_eq!(session.take_flashes(), vec!["User was added.".to_string()]);
        assert!(session.take_flashes().is_empty());

        let jar = session.into_jar();
        let stored = SessionData::decode(jar.get(SESSION_COOKIE).expect("cookie").value());
        assert_eq!(stored.user_id, Some(1));
        assert!(stored.flashes.is_empty());
    }

    #[test]
    fn log_out_keeps_flashes() {
        let mut session = session_with(&SessionData {
            user_id: Some(3),
            flashes: vec![],
        });
        session.log_out();
        session.add_flash("Logged out");
        let jar = session.into_jar();
        let stored = SessionData::decode(jar.get(SESSION_COOKIE).expect("cookie").value());
        assert_eq!(stored.user_id, None);
        assert_eq!(stored.flashes, vec!["Logged out".to_string()]);
    }

    #[test]
    fn flash_queue_keeps_newest() {
        let mut session = session_with(&SessionData::default());
        for i in 0..60 {
            session.add_flash(format!("flash {i}"));
        }
        let flashes = session.take_flashes();
        assert_eq!(flashes.len(), MAX_FLASHES);
        assert_eq!(flashes.first().map(String::as_str), Some("flash 52"));
        assert_eq!(flashes.last().map(String::as_str), Some("flash 59"));
    }

    #[test]
    fn cookie_attributes() {
        for secure in [true, false] {
            let cookie = build_cookie("{}".to_string(), secure);
            assert_eq!(cookie.name(), SESSION_COOKIE);
            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Lax));
            assert_eq!(cookie.path(), Some("/"));
            assert_eq!(cookie.secure(), Some(secure));
            assert_eq!(cookie.max_age(), Some(SESSION_TTL));
        }
    }

    #[test]
    fn clear_removes_cookie() {
        let mut session = session_with(&SessionData {
            user_id: Some(3),
            flashes: vec![],
        });
        session.clear();
        assert!(session.into_jar().get(SESSION_COOKIE).is_none());
    }
}
