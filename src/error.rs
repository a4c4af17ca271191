use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};
use bcrypt::BcryptError;
use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error as ThisError;
use tokio::task::JoinError;

use crate::types::Session;
use crate::views;

#[derive(Debug, ThisError)]
pub enum ShelfError {
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Deliberately says nothing about which credential was wrong.
    #[error("Invalid username or password")]
    Authentication,

    #[error("Too many login attempts, try again later")]
    RateLimited,

    #[error("{0}")]
    LoginRequired(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] BcryptError),

    #[error("Blocking task failed: {0}")]
    Task(#[from] JoinError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShelfError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::default();
        errors.push(field, message);
        ShelfError::Validation(errors)
    }

    /// Errors that indicate a fault in the service rather than in the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ShelfError::DatabaseError(_)
                | ShelfError::PasswordHash(_)
                | ShelfError::Task(_)
                | ShelfError::Config(_)
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ShelfError::NotFound(_) => StatusCode::NOT_FOUND,
            ShelfError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShelfError::Authentication | ShelfError::LoginRequired(_) => StatusCode::UNAUTHORIZED,
            ShelfError::Authorization(_) => StatusCode::FORBIDDEN,
            ShelfError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ShelfError::Conflict(_) => StatusCode::CONFLICT,
            ShelfError::DatabaseError(_)
            | ShelfError::PasswordHash(_)
            | ShelfError::Task(_)
            | ShelfError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show the user; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ShelfError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let page = views::error_page(status, &self.public_message(), &Session::anonymous());
        (status, Html(page)).into_response()
    }
}

/// A single failed check on a submitted form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Structured list of field errors, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}
