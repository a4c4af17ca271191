//! HTTP handlers. Every service error is recovered here: gate failures and conflicts
//! become a flash message plus a redirect, unknown ids a 404 page, internal faults a
//! logged 500 page.

pub mod auth;
pub mod catalog;

use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::error;

use crate::error::ShelfError;
use crate::middleware::session::{push_flash, take_flashes};
use crate::router::ShelfState;
use crate::types::{Flash, Session};
use crate::views::{self, PageContext};

pub(crate) fn redirect_with(
    state: &ShelfState,
    jar: PrivateCookieJar,
    flash: Flash,
    to: &str,
) -> Response {
    (push_flash(jar, flash, &state.cookies), Redirect::to(to)).into_response()
}

/// Render a page, consuming any pending flash messages into it.
pub(crate) fn render<F>(jar: PrivateCookieJar, session: &Session, page: F) -> Response
where
    F: FnOnce(&PageContext<'_>) -> String,
{
    let (jar, flashes) = take_flashes(jar);
    let ctx = PageContext {
        session,
        flashes: &flashes,
    };
    (jar, Html(page(&ctx))).into_response()
}

/// Convert a service error into the response the user sees. `fallback` is where
/// conflicts and other recoverable failures redirect to.
pub(crate) fn recover(
    state: &ShelfState,
    jar: PrivateCookieJar,
    session: &Session,
    err: ShelfError,
    fallback: &str,
) -> Response {
    match err {
        ShelfError::LoginRequired(msg) => redirect_with(state, jar, Flash::error(msg), "/auth/login"),
        ShelfError::Authorization(msg) => redirect_with(state, jar, Flash::error(msg), "/"),
        ShelfError::Validation(errors) => {
            redirect_with(state, jar, Flash::error(errors.to_string()), fallback)
        }
        e @ (ShelfError::Authentication | ShelfError::RateLimited | ShelfError::Conflict(_)) => {
            redirect_with(state, jar, Flash::error(e.to_string()), fallback)
        }
        e @ ShelfError::NotFound(_) => error_response(jar, session, &e),
        e => {
            error!(error = %e, "request failed");
            error_response(jar, session, &e)
        }
    }
}

/// Standalone error page that keeps the visitor's navigation.
fn error_response(jar: PrivateCookieJar, session: &Session, err: &ShelfError) -> Response {
    let status = err.status_code();
    let page = views::error_page(status, &err.public_message(), session);
    (status, jar, Html(page)).into_response()
}
