use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use axum_extra::extract::cookie::PrivateCookieJar;

use crate::error::{ShelfError, ValidationErrors};
use crate::handlers::{recover, redirect_with, render};
use crate::middleware::CurrentSession;
use crate::router::ShelfState;
use crate::service::gate;
use crate::types::{BookForm, Flash, GenreForm, SearchForm, Session};
use crate::views::pages::{self, BookFormValues};

/// GET / -> the full catalog.
pub async fn index(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    match state.catalog.list_books(&session).await {
        Ok(books) => render(jar, &session, |ctx| pages::book_list(ctx, &books)),
        Err(e) => recover(&state, jar, &session, e, "/auth/login"),
    }
}

/// GET /add
pub async fn add_book_page(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    if let Err(e) = gate::ensure_admin(&session, "add a book") {
        return recover(&state, jar, &session, e, "/");
    }
    render_book_form(
        &state,
        jar,
        &session,
        "Add Book",
        "/add",
        &BookFormValues::default(),
        None,
    )
    .await
}

/// POST /add
pub async fn add_book_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<BookForm>,
) -> Response {
    match state.catalog.create_book(&session, &form).await {
        Ok(_) => redirect_with(&state, jar, Flash::success("Book added successfully!"), "/"),
        Err(ShelfError::Validation(errors)) => {
            render_book_form(
                &state,
                jar,
                &session,
                "Add Book",
                "/add",
                &form_values(&form),
                Some(&errors),
            )
            .await
        }
        Err(e) => recover(&state, jar, &session, e, "/"),
    }
}

/// GET /update/{id}
pub async fn update_book_page(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
) -> Response {
    let book = match state.catalog.get_book(&session, id).await {
        Ok(book) => book,
        Err(e) => return recover(&state, jar, &session, e, "/"),
    };
    let values = BookFormValues {
        title: book.title,
        author: book.author,
        genre: book.genre_id.to_string(),
        year: book.year.to_string(),
    };
    render_book_form(
        &state,
        jar,
        &session,
        "Update Book",
        &format!("/update/{id}"),
        &values,
        None,
    )
    .await
}

/// POST /update/{id}
pub async fn update_book_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
    Form(form): Form<BookForm>,
) -> Response {
    match state.catalog.update_book(&session, id, &form).await {
        Ok(_) => redirect_with(&state, jar, Flash::success("Book updated successfully!"), "/"),
        Err(ShelfError::Validation(errors)) => {
            render_book_form(
                &state,
                jar,
                &session,
                "Update Book",
                &format!("/update/{id}"),
                &form_values(&form),
                Some(&errors),
            )
            .await
        }
        Err(e) => recover(&state, jar, &session, e, "/"),
    }
}

/// POST /delete/{id}
pub async fn delete_book(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.catalog.delete_book(&session, id).await {
        Ok(()) => redirect_with(&state, jar, Flash::success("Book deleted successfully!"), "/"),
        Err(e) => recover(&state, jar, &session, e, "/"),
    }
}

/// GET /search[?search_query=...]
pub async fn search_page(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Query(form): Query<SearchForm>,
) -> Response {
    run_search(&state, jar, &session, form).await
}

/// POST /search
pub async fn search_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<SearchForm>,
) -> Response {
    run_search(&state, jar, &session, form).await
}

async fn run_search(
    state: &ShelfState,
    jar: PrivateCookieJar,
    session: &Session,
    form: SearchForm,
) -> Response {
    let query = form.search_query.unwrap_or_default();
    match state.catalog.search_books(session, Some(query.as_str())).await {
        Ok(results) => render(jar, session, |ctx| {
            pages::search(ctx, query.trim(), results.as_deref())
        }),
        Err(e) => recover(state, jar, session, e, "/"),
    }
}

/// GET /add_genre
pub async fn add_genre_page(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    if let Err(e) = gate::ensure_admin(&session, "add a genre") {
        return recover(&state, jar, &session, e, "/");
    }
    render(jar, &session, |ctx| {
        pages::genre_form(ctx, "Add Genre", "/add_genre", "", None)
    })
}

/// POST /add_genre
pub async fn add_genre_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Form(form): Form<GenreForm>,
) -> Response {
    match state.catalog.create_genre(&session, &form).await {
        Ok(_) => redirect_with(
            &state,
            jar,
            Flash::success("Genre added successfully!"),
            "/add_genre",
        ),
        Err(ShelfError::Validation(errors)) => render(jar, &session, |ctx| {
            pages::genre_form(ctx, "Add Genre", "/add_genre", &form.name, Some(&errors))
        }),
        Err(e) => recover(&state, jar, &session, e, "/add_genre"),
    }
}

/// GET /genres
pub async fn list_genres(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
) -> Response {
    match state.catalog.list_genres(&session).await {
        Ok(genres) => render(jar, &session, |ctx| pages::genre_list(ctx, &genres)),
        Err(e) => recover(&state, jar, &session, e, "/"),
    }
}

/// GET /update_genre/{id}
pub async fn update_genre_page(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.catalog.get_genre(&session, id).await {
        Ok(genre) => render(jar, &session, |ctx| {
            pages::genre_form(
                ctx,
                "Update Genre",
                &format!("/update_genre/{id}"),
                &genre.name,
                None,
            )
        }),
        Err(e) => recover(&state, jar, &session, e, "/"),
    }
}

/// POST /update_genre/{id}
pub async fn update_genre_submit(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
    Form(form): Form<GenreForm>,
) -> Response {
    let action = format!("/update_genre/{id}");
    match state.catalog.update_genre(&session, id, &form).await {
        Ok(_) => redirect_with(
            &state,
            jar,
            Flash::success("Genre updated successfully!"),
            "/genres",
        ),
        Err(ShelfError::Validation(errors)) => render(jar, &session, |ctx| {
            pages::genre_form(ctx, "Update Genre", &action, &form.name, Some(&errors))
        }),
        Err(e) => recover(&state, jar, &session, e, &action),
    }
}

/// POST /delete_genre/{id}
pub async fn delete_genre(
    State(state): State<ShelfState>,
    CurrentSession(session): CurrentSession,
    jar: PrivateCookieJar,
    Path(id): Path<i64>,
) -> Response {
    match state.catalog.delete_genre(&session, id).await {
        Ok(()) => redirect_with(
            &state,
            jar,
            Flash::success("Genre deleted successfully!"),
            "/genres",
        ),
        Err(e) => recover(&state, jar, &session, e, "/genres"),
    }
}

async fn render_book_form(
    state: &ShelfState,
    jar: PrivateCookieJar,
    session: &Session,
    heading: &str,
    action: &str,
    values: &BookFormValues,
    errors: Option<&ValidationErrors>,
) -> Response {
    let genres = match state.catalog.list_genres(session).await {
        Ok(genres) => genres,
        Err(e) => return recover(state, jar, session, e, "/"),
    };
    render(jar, session, |ctx| {
        pages::book_form(ctx, heading, action, values, &genres, errors)
    })
}

fn form_values(form: &BookForm) -> BookFormValues {
    BookFormValues {
        title: form.title.clone(),
        author: form.author.clone(),
        genre: form.genre.clone(),
        year: form.year.clone(),
    }
}
