//! Per-entity form validation.
//!
//! Each function checks every field, collecting all failures, and returns either the
//! typed input or `ShelfError::Validation` with the structured list.

use subtle::ConstantTimeEq;

use crate::db::NewBook;
use crate::db::sqlite::INVALID_CHOICE;
use crate::error::{ShelfError, ValidationErrors};
use crate::types::{BookForm, GenreForm, LoginForm, RegistrationForm};

pub const REQUIRED: &str = "This field is required.";
pub const PASSWORDS_DIFFER: &str = "Field must be equal to password.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer value.";

pub const USERNAME_MAX_LEN: usize = 80;
pub const GENRE_NAME_MAX_LEN: usize = 30;
pub const TITLE_MAX_LEN: usize = 80;
pub const AUTHOR_MAX_LEN: usize = 50;

pub struct Registration {
    pub username: String,
    pub password: String,
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub fn validate_registration(form: &RegistrationForm) -> Result<Registration, ShelfError> {
    let mut errors = ValidationErrors::default();
    let username = required_text(&mut errors, "username", &form.username, USERNAME_MAX_LEN);
    let password = required_secret(&mut errors, "password", &form.password);
    let confirmation = required_secret(&mut errors, "password2", &form.password2);

    if let (Some(password), Some(confirmation)) = (password, confirmation)
        && !bool::from(password.as_bytes().ct_eq(confirmation.as_bytes()))
    {
        errors.push("password2", PASSWORDS_DIFFER);
    }

    match (username, password) {
        (Some(username), Some(password)) if errors.is_empty() => Ok(Registration {
            username,
            password: password.to_string(),
        }),
        _ => Err(ShelfError::Validation(errors)),
    }
}

pub fn validate_login(form: &LoginForm) -> Result<Credentials, ShelfError> {
    let mut errors = ValidationErrors::default();
    let username = required_text(&mut errors, "username", &form.username, USERNAME_MAX_LEN);
    let password = required_secret(&mut errors, "password", &form.password);

    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials {
            username,
            password: password.to_string(),
        }),
        _ => Err(ShelfError::Validation(errors)),
    }
}

/// Returns the trimmed genre name.
pub fn validate_genre(form: &GenreForm) -> Result<String, ShelfError> {
    let mut errors = ValidationErrors::default();
    match required_text(&mut errors, "name", &form.name, GENRE_NAME_MAX_LEN) {
        Some(name) => Ok(name),
        None => Err(ShelfError::Validation(errors)),
    }
}

/// Checks presence and shape only; whether the genre exists is decided by storage.
pub fn validate_book(form: &BookForm) -> Result<NewBook, ShelfError> {
    let mut errors = ValidationErrors::default();
    let title = required_text(&mut errors, "title", &form.title, TITLE_MAX_LEN);
    let author = required_text(&mut errors, "author", &form.author, AUTHOR_MAX_LEN);
    let genre_id = required_integer(&mut errors, "genre", &form.genre, INVALID_CHOICE);
    let year = required_integer(&mut errors, "year", &form.year, NOT_AN_INTEGER);

    match (title, author, genre_id, year) {
        (Some(title), Some(author), Some(genre_id), Some(year)) => Ok(NewBook {
            title,
            author,
            year,
            genre_id,
        }),
        _ => Err(ShelfError::Validation(errors)),
    }
}

fn required_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, REQUIRED);
        return None;
    }
    if value.chars().count() > max_len {
        errors.push(
            field,
            format!("Field cannot be longer than {max_len} characters."),
        );
        return None;
    }
    Some(value.to_string())
}

/// Secrets are kept verbatim; only an all-whitespace value counts as missing.
fn required_secret<'a>(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &'a str,
) -> Option<&'a str> {
    if value.trim().is_empty() {
        errors.push(field, REQUIRED);
        None
    } else {
        Some(value)
    }
}

fn required_integer(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    invalid_message: &str,
) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, REQUIRED);
        return None;
    }
    match value.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(field, invalid_message);
            None
        }
    }
}
