use std::path::PathBuf;

use axum_extra::extract::cookie::Key;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use tracing::warn;

use crate::error::ConsoleError;

/// Legacy switch that turns on the diagnostic tools group.
pub const TEST_FLAG_ENV: &str = "TEST";

const ENV_PREFIX: &str = "CONSOLE_";
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub max_connections: u32,
    pub loglevel: String,
    pub templates_dir: PathBuf,
    /// Master secret for the session cookie. Random per process when unset.
    pub session_secret: Option<String>,
    pub insecure_cookie: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite:console.sqlite".to_string(),
            max_connections: 5,
            loglevel: "info".to_string(),
            templates_dir: PathBuf::from("templates"),
            session_secret: None,
            insecure_cookie: false,
        }
    }
}

/// Route groups mounted by the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// `/tools`, `/tools/db-clear`, `/tools/seed`, `/tools/sql`.
    pub tools: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub routes: RoutesConfig,
}

impl Config {
    /// Defaults, then `config.toml`, then `CONSOLE_*` env vars, then the `TEST` flag.
    pub fn load() -> Result<Self, ConsoleError> {
        let mut cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        if std::env::var(TEST_FLAG_ENV).is_ok_and(|v| is_truthy(&v)) {
            cfg.routes.tools = true;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        if let Some(secret) = self.basic.session_secret.as_deref()
            && secret.len() < MIN_SECRET_LEN
        {
            return Err(ConsoleError::Config(format!(
                "basic.session_secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(())
    }

    /// Cookie key derived from `session_secret`, or a fresh random one.
    pub fn cookie_key(&self) -> Key {
        match self.basic.session_secret.as_deref() {
            Some(secret) => Key::from(Sha512::digest(secret.as_bytes()).as_slice()),
            None => {
                warn!("basic.session_secret not set; sessions will not survive a restart");
                Key::generate()
            }
        }
    }
}

/// Accepts the truthy spellings the `TEST` flag has always understood.
pub fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "on" | "t")
}
