use crate::config::AuthConfig;
use crate::db::{CatalogStorage, User};
use crate::db::sqlite::USERNAME_TAKEN;
use crate::error::ShelfError;
use crate::service::validation::{self, Credentials, Registration};
use crate::types::{LoginForm, RegistrationForm, Session};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Registers users, checks credentials and hands out sessions.
#[derive(Clone)]
pub struct AuthService {
    storage: CatalogStorage,
    bcrypt_cost: u32,
    /// Verified in place of a real hash when the username is unknown, so both
    /// failure paths cost one bcrypt verification.
    dummy_hash: Arc<str>,
    /// Budget of failed logins per lowercased username. Successful logins never draw from it.
    login_limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl AuthService {
    pub async fn new(storage: CatalogStorage, cfg: &AuthConfig) -> Result<Self, ShelfError> {
        let bcrypt_cost = cfg.bcrypt_cost;
        let dummy_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash("not-a-real-password", bcrypt_cost))
                .await??;
        let attempts = NonZeroU32::new(cfg.login_attempts).unwrap_or(NonZeroU32::MIN);
        let window = Duration::from_secs(cfg.login_window_secs.max(1));
        let quota = Quota::with_period(window / attempts.get())
            .ok_or_else(|| ShelfError::Config("auth.login_window_secs is too short".to_string()))?
            .allow_burst(attempts);

        Ok(Self {
            storage,
            bcrypt_cost,
            dummy_hash: Arc::from(dummy_hash),
            login_limiter: Arc::new(RateLimiter::keyed(quota)),
        })
    }

    /// Create a user. The first user ever registered becomes the administrator.
    pub async fn register(&self, form: &RegistrationForm) -> Result<User, ShelfError> {
        let Registration { username, password } = validation::validate_registration(form)?;

        // fast path; the UNIQUE constraint still decides under concurrency
        if self.storage.username_exists(&username).await? {
            return Err(ShelfError::validation("username", USERNAME_TAKEN));
        }

        let cost = self.bcrypt_cost;
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

        let user: User = self
            .storage
            .insert_user(&username, &password_hash)
            .await?
            .into();
        info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Verify credentials and return a fresh session. Unknown usernames and wrong
    /// passwords fail identically. Correct credentials always log in; only failures
    /// are counted against the username's budget.
    pub async fn login(&self, form: &LoginForm) -> Result<Session, ShelfError> {
        let Credentials { username, password } = validation::validate_login(form)?;
        let throttle_key = username.to_lowercase();

        let user = self.storage.find_user_by_username(&username).await?;
        let hash = match &user {
            Some(u) => u.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };
        let verified =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;

        match user {
            Some(u) if verified => {
                info!(user_id = u.id, "user logged in");
                Ok(Session::for_user(u.id, u.role))
            }
            _ => Err(self.record_failed_login(throttle_key)),
        }
    }

    fn record_failed_login(&self, key: String) -> ShelfError {
        // drop usernames whose budget has fully refilled
        self.login_limiter.retain_recent();
        if self.login_limiter.check_key(&key).is_err() {
            warn!("login rate limit exceeded");
            return ShelfError::RateLimited;
        }
        ShelfError::Authentication
    }

    /// Number of usernames currently holding a partly used failure budget.
    pub fn throttled_usernames(&self) -> usize {
        self.login_limiter.len()
    }

    /// Drop all session state. Safe to call on an anonymous session.
    pub fn logout(&self, session: &mut Session) {
        if let Some(user_id) = session.user_id {
            info!(user_id, "user logged out");
        }
        session.clear();
    }
}
