use axum::{Form, extract::State, response::Response};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::error::ShelfError;
use crate::handlers::{recover, redirect_with, render};
use crate::middleware::CurrentSession;
use crate::middleware::session::{clear_session, store_session};
use crate::router::ShelfState;
use crate::types::{Flash, LoginForm, RegistrationForm};
use crate::views::pages;

/// GET /auth/register
pub async fn register_page(
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    render(jar, &session, |ctx| pages::register(ctx, "", None))
}

/// POST /auth/register
pub async fn register_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<RegistrationForm>,
) -> Response {
    match state.auth.register(&form).await {
        Ok(_) => redirect_with(
            &state,
            jar,
            Flash::success("Congratulations, you are now a registered user!"),
            "/auth/login",
        ),
        Err(ShelfError::Validation(errors)) => render(jar, &session, |ctx| {
            pages::register(ctx, &form.username, Some(&errors))
        }),
        Err(e) => recover(&state, jar, &session, e, "/auth/register"),
    }
}

/// GET /auth/login
pub async fn login_page(CurrentSession(session): CurrentSession, jar: PrivateCookieJar) -> Response {
    render(jar, &session, |ctx| pages::login(ctx, "", None))
}

/// POST /auth/login -> on success the session cookie replaces any previous one.
pub async fn login_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.login(&form).await {
        Ok(new_session) => {
            let jar = store_session(jar, &new_session, &state.cookies);
            redirect_with(&state, jar, Flash::success("You are now logged in"), "/")
        }
        Err(ShelfError::Validation(errors)) => render(jar, &session, |ctx| {
            pages::login(ctx, &form.username, Some(&errors))
        }),
        Err(e) => recover(&state, jar, &session, e, "/auth/login"),
    }
}

/// GET /auth/logout
pub async fn logout(
    State(state): State<ShelfState>,
    CurrentSession(mut session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    state.auth.logout(&mut session);
    let jar = clear_session(jar);
    redirect_with(&state, jar, Flash::success("You have been logged out"), "/")
}
