use crate::db::models::{Book, BookWithGenre, DbUser, Genre, NewBook};
use crate::db::schema::{DEFAULT_GENRES, SQLITE_INIT};
use crate::error::ShelfError;
use crate::types::Role;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Error as SqlxError, Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

pub const GENRE_IN_USE: &str = "Cannot delete genre with associated books";
pub const USERNAME_TAKEN: &str = "Please use a different username.";
pub const INVALID_CHOICE: &str = "Not a valid choice.";

const SELECT_BOOK_WITH_GENRE: &str = r#"SELECT b.id, b.title, b.author, b.year, b.genre_id,
    g.name AS genre_name
    FROM books b INNER JOIN genres g ON b.genre_id = g.id"#;

/// All SQL for users, genres and books. Every write runs in its own transaction.
#[derive(Clone)]
pub struct CatalogStorage {
    pool: SqlitePool,
}

impl CatalogStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ShelfError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert the default genres if the table is empty. Returns how many were inserted.
    pub async fn seed_default_genres(&self) -> Result<usize, ShelfError> {
        let mut tx = self.pool.begin().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }
        for name in DEFAULT_GENRES {
            sqlx::query("INSERT INTO genres (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(DEFAULT_GENRES.len())
    }

    // ----- users -----

    /// Insert a user. The role is decided by the same statement: `admin` when the
    /// table is empty, `user` otherwise.
    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<DbUser, ShelfError> {
        let created_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, created_at)
            SELECT ?, ?,
                CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'user' ELSE 'admin' END,
                ?
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_username_conflict(&e) {
                ShelfError::validation("username", USERNAME_TAKEN)
            } else if is_unique_violation(&e) {
                ShelfError::Conflict("An administrator already exists".to_string())
            } else {
                e.into()
            }
        })?;
        let user = Self::row_to_user(row)?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DbUser>, ShelfError> {
        let row = sqlx::query(
            r#"SELECT id, username, password_hash, role, created_at
               FROM users WHERE username = ?"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_user).transpose()
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, ShelfError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn list_users(&self) -> Result<Vec<DbUser>, ShelfError> {
        let rows = sqlx::query(
            r#"SELECT id, username, password_hash, role, created_at
               FROM users ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_user).collect()
    }

    // ----- genres -----

    pub async fn list_genres(&self) -> Result<Vec<Genre>, ShelfError> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    pub async fn get_genre(&self, id: i64) -> Result<Genre, ShelfError> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ShelfError::NotFound("Genre"))
    }

    pub async fn insert_genre(&self, name: &str) -> Result<Genre, ShelfError> {
        let mut tx = self.pool.begin().await?;
        let genre =
            sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES (?) RETURNING id, name")
                .bind(name)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| genre_name_conflict(e, name))?;
        tx.commit().await?;
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i64, name: &str) -> Result<Genre, ShelfError> {
        let mut tx = self.pool.begin().await?;
        let genre = sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| genre_name_conflict(e, name))?
        .ok_or(ShelfError::NotFound("Genre"))?;
        tx.commit().await?;
        Ok(genre)
    }

    /// Delete a genre only if no book references it. The reference check is part of
    /// the DELETE itself, so a concurrent book insert cannot slip in between; the
    /// `ON DELETE RESTRICT` foreign key is the backstop.
    pub async fn delete_genre(&self, id: i64) -> Result<(), ShelfError> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            r#"DELETE FROM genres
               WHERE id = ? AND NOT EXISTS (SELECT 1 FROM books WHERE genre_id = ?)"#,
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                ShelfError::Conflict(GENRE_IN_USE.to_string())
            } else {
                e.into()
            }
        })?;

        if res.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                Some(_) => ShelfError::Conflict(GENRE_IN_USE.to_string()),
                None => ShelfError::NotFound("Genre"),
            });
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn count_books_in_genre(&self, genre_id: i64) -> Result<i64, ShelfError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE genre_id = ?")
            .bind(genre_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ----- books -----

    pub async fn list_books(&self) -> Result<Vec<BookWithGenre>, ShelfError> {
        let books =
            sqlx::query_as::<_, BookWithGenre>(&format!("{SELECT_BOOK_WITH_GENRE} ORDER BY b.id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(books)
    }

    /// Substring match on title, author or genre name. `query` is matched literally.
    pub async fn search_books(&self, query: &str) -> Result<Vec<BookWithGenre>, ShelfError> {
        let pattern = contains_pattern(query);
        let books = sqlx::query_as::<_, BookWithGenre>(&format!(
            r#"{SELECT_BOOK_WITH_GENRE}
               WHERE b.title LIKE ? ESCAPE '\'
                  OR b.author LIKE ? ESCAPE '\'
                  OR g.name LIKE ? ESCAPE '\'
               ORDER BY b.id"#
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn get_book(&self, id: i64) -> Result<Book, ShelfError> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, year, genre_id FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ShelfError::NotFound("Book"))
    }

    pub async fn insert_book(&self, new: &NewBook) -> Result<Book, ShelfError> {
        let mut tx = self.pool.begin().await?;
        ensure_genre_exists(&mut tx, new.genre_id).await?;
        let book = sqlx::query_as::<_, Book>(
            r#"INSERT INTO books (title, author, year, genre_id) VALUES (?, ?, ?, ?)
               RETURNING id, title, author, year, genre_id"#,
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(new.year)
        .bind(new.genre_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(invalid_genre)?;
        tx.commit().await?;
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, new: &NewBook) -> Result<Book, ShelfError> {
        let mut tx = self.pool.begin().await?;
        ensure_genre_exists(&mut tx, new.genre_id).await?;
        let book = sqlx::query_as::<_, Book>(
            r#"UPDATE books SET title = ?, author = ?, year = ?, genre_id = ?
               WHERE id = ?
               RETURNING id, title, author, year, genre_id"#,
        )
        .bind(&new.title)
        .bind(&new.author)
        .bind(new.year)
        .bind(new.genre_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(invalid_genre)?
        .ok_or(ShelfError::NotFound("Book"))?;
        tx.commit().await?;
        Ok(book)
    }

    pub async fn delete_book(&self, id: i64) -> Result<(), ShelfError> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ShelfError::NotFound("Book"));
        }
        tx.commit().await?;
        Ok(())
    }

    fn row_to_user(row: SqliteRow) -> Result<DbUser, ShelfError> {
        let id: i64 = row.try_get("id")?;
        let username: String = row.try_get("username")?;
        let password_hash: String = row.try_get("password_hash")?;
        let role_str: String = row.try_get("role")?;
        let created_str: String = row.try_get("created_at")?;

        let role: Role = role_str
            .parse()
            .map_err(|e: String| SqlxError::Decode(e.into()))?;
        let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
            .map_err(|e| SqlxError::Decode(Box::new(e)))?
            .with_timezone(&Utc);

        Ok(DbUser {
            id,
            username,
            password_hash,
            role,
            created_at,
        })
    }
}

async fn ensure_genre_exists(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    genre_id: i64,
) -> Result<(), ShelfError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM genres WHERE id = ?")
        .bind(genre_id)
        .fetch_optional(&mut **tx)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(ShelfError::validation("genre", INVALID_CHOICE)),
    }
}

fn is_unique_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db) if db.is_unique_violation())
}

fn is_username_conflict(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db)
        if db.is_unique_violation() && db.message().contains("users.username"))
}

fn is_foreign_key_violation(e: &SqlxError) -> bool {
    matches!(e, SqlxError::Database(db) if db.is_foreign_key_violation())
}

fn genre_name_conflict(e: SqlxError, name: &str) -> ShelfError {
    if is_unique_violation(&e) {
        ShelfError::Conflict(format!("Genre '{name}' already exists"))
    } else {
        e.into()
    }
}

fn invalid_genre(e: SqlxError) -> ShelfError {
    if is_foreign_key_violation(&e) {
        ShelfError::validation("genre", INVALID_CHOICE)
    } else {
        e.into()
    }
}

/// `%query%` with LIKE wildcards and the escape character escaped.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
