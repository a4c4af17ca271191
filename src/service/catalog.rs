use crate::db::{Book, BookWithGenre, CatalogStorage, Genre};
use crate::error::ShelfError;
use crate::service::gate::{self, LOGIN_REQUIRED};
use crate::service::validation;
use crate::types::{BookForm, GenreForm, Session};
use tracing::info;

/// CRUD over books and genres. Every method runs the gate before touching storage.
#[derive(Clone)]
pub struct CatalogService {
    storage: CatalogStorage,
}

impl CatalogService {
    pub fn new(storage: CatalogStorage) -> Self {
        Self { storage }
    }

    pub async fn list_books(&self, session: &Session) -> Result<Vec<BookWithGenre>, ShelfError> {
        gate::ensure_authenticated(session, LOGIN_REQUIRED)?;
        self.storage.list_books().await
    }

    /// `None` when there is no query to run, which is not the same as no matches.
    pub async fn search_books(
        &self,
        session: &Session,
        query: Option<&str>,
    ) -> Result<Option<Vec<BookWithGenre>>, ShelfError> {
        gate::ensure_authenticated(session, "You must be logged in to search books")?;
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(None);
        };
        self.storage.search_books(query).await.map(Some)
    }

    pub async fn get_book(&self, session: &Session, id: i64) -> Result<Book, ShelfError> {
        gate::ensure_admin(session, "update a book")?;
        self.storage.get_book(id).await
    }

    pub async fn create_book(&self, session: &Session, form: &BookForm) -> Result<Book, ShelfError> {
        gate::ensure_admin(session, "add a book")?;
        let new = validation::validate_book(form)?;
        let book = self.storage.insert_book(&new).await?;
        info!(book_id = book.id, genre_id = book.genre_id, "book created");
        Ok(book)
    }

    pub async fn update_book(
        &self,
        session: &Session,
        id: i64,
        form: &BookForm,
    ) -> Result<Book, ShelfError> {
        gate::ensure_admin(session, "update a book")?;
        self.storage.get_book(id).await?;
        let new = validation::validate_book(form)?;
        let book = self.storage.update_book(id, &new).await?;
        info!(book_id = book.id, "book updated");
        Ok(book)
    }

    pub async fn delete_book(&self, session: &Session, id: i64) -> Result<(), ShelfError> {
        gate::ensure_admin(session, "delete a book")?;
        self.storage.delete_book(id).await?;
        info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Admin only: the genre list page and the book form's genre choices.
    pub async fn list_genres(&self, session: &Session) -> Result<Vec<Genre>, ShelfError> {
        gate::ensure_admin(session, "view genres")?;
        self.storage.list_genres().await
    }

    pub async fn get_genre(&self, session: &Session, id: i64) -> Result<Genre, ShelfError> {
        gate::ensure_admin(session, "update a genre")?;
        self.storage.get_genre(id).await
    }

    pub async fn create_genre(
        &self,
        session: &Session,
        form: &GenreForm,
    ) -> Result<Genre, ShelfError> {
        gate::ensure_admin(session, "add a genre")?;
        let name = validation::validate_genre(form)?;
        let genre = self.storage.insert_genre(&name).await?;
        info!(genre_id = genre.id, name = %genre.name, "genre created");
        Ok(genre)
    }

    pub async fn update_genre(
        &self,
        session: &Session,
        id: i64,
        form: &GenreForm,
    ) -> Result<Genre, ShelfError> {
        gate::ensure_admin(session, "update a genre")?;
        self.storage.get_genre(id).await?;
        let name = validation::validate_genre(form)?;
        let genre = self.storage.update_genre(id, &name).await?;
        info!(genre_id = genre.id, name = %genre.name, "genre updated");
        Ok(genre)
    }

    /// Fails with `Conflict` while any book still references the genre.
    pub async fn delete_genre(&self, session: &Session, id: i64) -> Result<(), ShelfError> {
        gate::ensure_admin(session, "delete a genre")?;
        self.storage.delete_genre(id).await?;
        info!(genre_id = id, "genre deleted");
        Ok(())
    }
}
