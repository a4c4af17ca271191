//! SQL DDL for initializing the catalog storage.

/// SQLite schema with:
/// - `users.username` UNIQUE
/// - a partial UNIQUE index so at most one row can hold the `admin` role
/// - `genres.name` UNIQUE
/// - `books.genre_id` NOT NULL foreign key, `ON DELETE RESTRICT`
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
    created_at TEXT NOT NULL -- RFC3339
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_single_admin ON users(role) WHERE role = 'admin';

CREATE TABLE IF NOT EXISTS genres (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    year INTEGER NOT NULL,
    genre_id INTEGER NOT NULL REFERENCES genres(id) ON DELETE RESTRICT
);

CREATE INDEX IF NOT EXISTS idx_books_genre_id ON books(genre_id);
"#;

/// Genres inserted on first startup when the genre table is empty.
pub const DEFAULT_GENRES: [&str; 6] = [
    "Fiction",
    "Non-Fiction",
    "Science Fiction",
    "Fantasy",
    "Biography",
    "Mystery",
];
