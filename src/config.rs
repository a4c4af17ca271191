use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::ShelfError;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "BOOKSHELF_";

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

/// Minimum length of a configured `session_secret`; cookie encryption keys are 64 bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub basic: BasicConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Master secret for the private session cookie. Random per process when unset.
    pub session_secret: Option<String>,
    /// Drop the `Secure` attribute so cookies work over plain http during development.
    pub insecure_cookie: bool,
    pub session_ttl_minutes: i64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:bookshelf.db".to_string(),
            loglevel: "info".to_string(),
            session_secret: None,
            insecure_cookie: false,
            session_ttl_minutes: 60 * 24,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    /// Failed logins allowed per username within `login_window_secs`.
    pub login_attempts: u32,
    pub login_window_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            login_attempts: 10,
            login_window_secs: 60,
        }
    }
}

impl Config {
    /// Defaults, then `config.toml`, then `BOOKSHELF_*` environment variables.
    /// Nested keys use a double underscore: `BOOKSHELF_BASIC__DATABASE_URL`.
    pub fn load() -> Result<Self, ShelfError> {
        Self::figment()
            .extract()
            .map_err(|e| ShelfError::Config(e.to_string()))
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ShelfError> {
        if let Some(secret) = self.basic.session_secret.as_deref()
            && secret.len() < MIN_SESSION_SECRET_LEN
        {
            return Err(ShelfError::Config(format!(
                "basic.session_secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
            )));
        }
        if self.basic.session_ttl_minutes <= 0 {
            return Err(ShelfError::Config(
                "basic.session_ttl_minutes must be positive".to_string(),
            ));
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.auth.bcrypt_cost) {
            return Err(ShelfError::Config(format!(
                "auth.bcrypt_cost must be between {BCRYPT_MIN_COST} and {BCRYPT_MAX_COST}"
            )));
        }
        if self.auth.login_attempts == 0 || self.auth.login_window_secs == 0 {
            return Err(ShelfError::Config(
                "auth.login_attempts and auth.login_window_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
