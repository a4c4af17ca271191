//! Server-rendered HTML.

pub mod pages;

use axum::http::StatusCode;

use crate::error::ValidationErrors;
use crate::types::{Flash, Session};

/// Per-request data every page needs for its chrome.
pub struct PageContext<'a> {
    pub session: &'a Session,
    pub flashes: &'a [Flash],
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn layout(title: &str, ctx: &PageContext<'_>, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Bookshelf</title>
    <style>
        body {{ font-family: system-ui; margin: 2rem auto; max-width: 960px; }}
        nav a {{ margin-right: 1rem; }}
        .flash {{ padding: .5rem 1rem; margin: .5rem 0; border-radius: 4px; }}
        .flash.error {{ background: #fde2e1; color: #8a1c13; }}
        .flash.success {{ background: #e0f5e4; color: #1d5c2c; }}
        .field-error {{ color: #8a1c13; font-size: .9rem; }}
        table {{ border-collapse: collapse; width: 100%; }}
        td, th {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }}
        form.inline {{ display: inline; }}
    </style>
</head>
<body>
{nav}
{flashes}
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape(title),
        nav = nav(ctx.session),
        flashes = flash_list(ctx.flashes),
    )
}

fn nav(session: &Session) -> String {
    let mut links = Vec::new();
    if session.is_authenticated() {
        links.push(r#"<a href="/">Books</a>"#);
        links.push(r#"<a href="/search">Search</a>"#);
        if session.is_admin() {
            links.push(r#"<a href="/add">Add book</a>"#);
            links.push(r#"<a href="/genres">Genres</a>"#);
            links.push(r#"<a href="/add_genre">Add genre</a>"#);
        }
        links.push(r#"<a href="/auth/logout">Log out</a>"#);
    } else {
        links.push(r#"<a href="/auth/login">Log in</a>"#);
        links.push(r#"<a href="/auth/register">Register</a>"#);
    }
    format!("<nav>{}</nav>", links.join(""))
}

fn flash_list(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="flash {}">{}</div>"#,
                f.category.as_str(),
                escape(&f.message)
            )
        })
        .collect()
}

pub(crate) fn field_errors(errors: Option<&ValidationErrors>, field: &str) -> String {
    let Some(errors) = errors else {
        return String::new();
    };
    errors
        .for_field(field)
        .map(|m| format!(r#"<div class="field-error">{}</div>"#, escape(m)))
        .collect()
}

/// Standalone page for errors that are not turned into a redirect.
pub fn error_page(status: StatusCode, message: &str, session: &Session) -> String {
    let ctx = PageContext {
        session,
        flashes: &[],
    };
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        &ctx,
        &format!(
            r#"<p>{}</p><p><a href="/">Back to the book list</a></p>"#,
            escape(message)
        ),
    )
}
