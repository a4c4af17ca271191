use crate::db::{BookWithGenre, Genre};
use crate::error::ValidationErrors;
use crate::views::{PageContext, escape, field_errors, layout};

/// Values echoed back into the book form.
#[derive(Debug, Clone, Default)]
pub struct BookFormValues {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: String,
}

pub fn book_list(ctx: &PageContext<'_>, books: &[BookWithGenre]) -> String {
    let body = if books.is_empty() {
        "<p>No books in the catalog yet.</p>".to_string()
    } else {
        book_table(ctx, books)
    };
    layout("Books", ctx, &body)
}

fn book_table(ctx: &PageContext<'_>, books: &[BookWithGenre]) -> String {
    let admin = ctx.session.is_admin();
    let rows: String = books
        .iter()
        .map(|row| {
            let actions = if admin {
                format!(
                    r#"<td><a href="/update/{id}">Edit</a>
<form class="inline" method="post" action="/delete/{id}"><button type="submit">Delete</button></form></td>"#,
                    id = row.book.id
                )
            } else {
                String::new()
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>{}</tr>",
                escape(&row.book.title),
                escape(&row.book.author),
                row.book.year,
                escape(&row.genre_name),
                actions
            )
        })
        .collect();
    let actions_header = if admin { "<th></th>" } else { "" };
    format!(
        "<table><thead><tr><th>Title</th><th>Author</th><th>Year</th><th>Genre</th>{actions_header}</tr></thead><tbody>{rows}</tbody></table>"
    )
}

pub fn book_form(
    ctx: &PageContext<'_>,
    heading: &str,
    action: &str,
    values: &BookFormValues,
    genres: &[Genre],
    errors: Option<&ValidationErrors>,
) -> String {
    let options: String = genres
        .iter()
        .map(|g| {
            let id = g.id.to_string();
            let selected = if id == values.genre { " selected" } else { "" };
            format!(
                r#"<option value="{id}"{selected}>{}</option>"#,
                escape(&g.name)
            )
        })
        .collect();
    let body = format!(
        r#"<form method="post" action="{action}">
<p><label>Title <input name="title" value="{title}"></label>{title_err}</p>
<p><label>Author <input name="author" value="{author}"></label>{author_err}</p>
<p><label>Genre <select name="genre">{options}</select></label>{genre_err}</p>
<p><label>Year <input name="year" value="{year}"></label>{year_err}</p>
<p><button type="submit">Submit</button></p>
</form>"#,
        action = escape(action),
        title = escape(&values.title),
        author = escape(&values.author),
        year = escape(&values.year),
        title_err = field_errors(errors, "title"),
        author_err = field_errors(errors, "author"),
        genre_err = field_errors(errors, "genre"),
        year_err = field_errors(errors, "year"),
    );
    layout(heading, ctx, &body)
}

/// `results` is `None` when no search has been run yet.
pub fn search(ctx: &PageContext<'_>, query: &str, results: Option<&[BookWithGenre]>) -> String {
    let form = format!(
        r#"<form method="post" action="/search">
<input name="search_query" value="{}" placeholder="Title, author or genre">
<button type="submit">Search</button>
</form>"#,
        escape(query)
    );
    let results = match results {
        None => String::new(),
        Some([]) => format!("<p>No books found matching \"{}\".</p>", escape(query)),
        Some(books) => book_table(ctx, books),
    };
    layout("Search books", ctx, &format!("{form}{results}"))
}

pub fn genre_form(
    ctx: &PageContext<'_>,
    heading: &str,
    action: &str,
    name: &str,
    errors: Option<&ValidationErrors>,
) -> String {
    let body = format!(
        r#"<form method="post" action="{action}">
<p><label>Genre Name <input name="name" value="{name}"></label>{name_err}</p>
<p><button type="submit">Save</button></p>
</form>"#,
        action = escape(action),
        name = escape(name),
        name_err = field_errors(errors, "name"),
    );
    layout(heading, ctx, &body)
}

pub fn genre_list(ctx: &PageContext<'_>, genres: &[Genre]) -> String {
    let rows: String = genres
        .iter()
        .map(|g| {
            format!(
                r#"<tr><td>{name}</td><td><a href="/update_genre/{id}">Edit</a>
<form class="inline" method="post" action="/delete_genre/{id}"><button type="submit">Delete</button></form></td></tr>"#,
                name = escape(&g.name),
                id = g.id
            )
        })
        .collect();
    let body = format!(
        r#"<table><thead><tr><th>Name</th><th></th></tr></thead><tbody>{rows}</tbody></table>
<p><a href="/add_genre">Add genre</a></p>"#
    );
    layout("Genres", ctx, &body)
}

pub fn register(ctx: &PageContext<'_>, username: &str, errors: Option<&ValidationErrors>) -> String {
    let body = format!(
        r#"<form method="post" action="/auth/register">
<p><label>Username <input name="username" value="{username}"></label>{username_err}</p>
<p><label>Password <input type="password" name="password"></label>{password_err}</p>
<p><label>Repeat Password <input type="password" name="password2"></label>{password2_err}</p>
<p><button type="submit">Register</button></p>
</form>"#,
        username = escape(username),
        username_err = field_errors(errors, "username"),
        password_err = field_errors(errors, "password"),
        password2_err = field_errors(errors, "password2"),
    );
    layout("Register", ctx, &body)
}

pub fn login(ctx: &PageContext<'_>, username: &str, errors: Option<&ValidationErrors>) -> String {
    let body = format!(
        r#"<form method="post" action="/auth/login">
<p><label>Username <input name="username" value="{username}"></label>{username_err}</p>
<p><label>Password <input type="password" name="password"></label>{password_err}</p>
<p><button type="submit">Login</button></p>
</form>
<p>No account? <a href="/auth/register">Register</a></p>"#,
        username = escape(username),
        username_err = field_errors(errors, "username"),
        password_err = field_errors(errors, "password"),
    );
    layout("Login", ctx, &body)
}
