use crate::types::Role;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq)]
pub struct DbUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User as exposed outside the credential store; carries no hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(d: DbUser) -> Self {
        Self {
            id: d.id,
            username: d.username,
            role: d.role,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub year: i64,
    pub genre_id: i64,
}

/// A book joined with the name of its genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct BookWithGenre {
    #[sqlx(flatten)]
    pub book: Book,
    pub genre_name: String,
}

/// Validated fields for a book insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub year: i64,
    pub genre_id: i64,
}
