use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Key, PrivateCookieJar};
use std::convert::Infallible;

use crate::middleware::session::load_session;
use crate::types::Session;

/// The caller's session, read from the private session cookie.
///
/// Never rejects: a missing, expired or tampered cookie yields the anonymous
/// session and the gate decides what that may do.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Self(load_session(&jar)))
    }
}
