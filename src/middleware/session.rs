//! Cookie-backed session and flash storage.
//!
//! Both live in private cookies: encrypted and authenticated with the server key, so
//! the client can neither read nor forge them.

use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use time::Duration;
use tracing::warn;

use crate::types::{Flash, Session};

pub const SESSION_COOKIE: &str = "bookshelf_session";
pub const FLASH_COOKIE: &str = "bookshelf_flash";

#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub session_ttl: Duration,
}

/// Session carried by the request, or the anonymous session.
pub fn load_session(jar: &PrivateCookieJar) -> Session {
    jar.get(SESSION_COOKIE)
        .and_then(|c| {
            serde_json::from_str(c.value())
                .inspect_err(|e| warn!(error = %e, "discarding undecodable session cookie"))
                .ok()
        })
        .unwrap_or_default()
}

pub fn store_session(
    jar: PrivateCookieJar,
    session: &Session,
    settings: &CookieSettings,
) -> PrivateCookieJar {
    match serde_json::to_string(session) {
        Ok(value) => jar.add(build_cookie(
            SESSION_COOKIE,
            value,
            settings.secure,
            Some(settings.session_ttl),
        )),
        Err(e) => {
            warn!(error = %e, "failed to encode session");
            jar
        }
    }
}

pub fn clear_session(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(clear_cookie(SESSION_COOKIE))
}

/// Queue a message for the next rendered page.
pub fn push_flash(jar: PrivateCookieJar, flash: Flash, settings: &CookieSettings) -> PrivateCookieJar {
    let mut pending = read_flashes(&jar);
    pending.push(flash);
    match serde_json::to_string(&pending) {
        Ok(value) => jar.add(build_cookie(FLASH_COOKIE, value, settings.secure, None)),
        Err(e) => {
            warn!(error = %e, "failed to encode flash messages");
            jar
        }
    }
}

/// Consume all queued messages.
pub fn take_flashes(jar: PrivateCookieJar) -> (PrivateCookieJar, Vec<Flash>) {
    let flashes = read_flashes(&jar);
    if flashes.is_empty() {
        return (jar, flashes);
    }
    (jar.remove(clear_cookie(FLASH_COOKIE)), flashes)
}

fn read_flashes(jar: &PrivateCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| serde_json::from_str(c.value()).ok())
        .unwrap_or_default()
}

fn build_cookie(
    name: &'static str,
    value: String,
    secure: bool,
    max_age: Option<Duration>,
) -> Cookie<'static> {
    let builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax);
    match max_age {
        Some(age) => builder.max_age(age).build(),
        None => builder.build(),
    }
}

fn clear_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}
