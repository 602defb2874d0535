use libris_catalog::{Book, BookPatch, LibraryStats, NewBook, ValidationErrors};
use libris_db::{Database, DbError};
use libris_http::error::AppError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use super::models::now_utc;
use super::repo;

#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("book {0} not found")]
    NotFound(Uuid),

    #[error("a book titled '{title}' by '{author}' already exists")]
    Duplicate { title: String, author: String },

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<rusqlite::Error> for BookError {
    fn from(err: rusqlite::Error) -> Self {
        BookError::Db(DbError::Sqlite(err))
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(errors) => {
                let details = errors
                    .errors
                    .iter()
                    .map(|e| json!({ "field": e.field, "message": e.message }))
                    .collect();
                AppError::validation(details, errors.to_string())
            }
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::Duplicate { .. } => AppError::conflict(
                vec![json!({ "field": "title", "message": "must be unique per author" })],
                err.to_string(),
            ),
            BookError::Db(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

/// Catalog operations backed by the shared database handle.
#[derive(Clone, Debug)]
pub struct BookService {
    db: Database,
}

impl BookService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        self.db.call(|conn| repo::list(conn)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Book, BookError> {
        self.db
            .call(move |conn| repo::get(conn, id)?.ok_or(BookError::NotFound(id)))
            .await
    }

    pub async fn create(&self, book: NewBook) -> Result<Book, BookError> {
        let created = self
            .db
            .call(move |conn| repo::insert(conn, &book, now_utc()))
            .await?;

        tracing::info!(
            book_id = %created.id,
            title = %created.title,
            total_copies = created.total_copies,
            "book created"
        );
        Ok(created)
    }

    /// Merge `patch` onto the stored record and persist it atomically.
    pub async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, BookError> {
        let updated = self
            .db
            .call(move |conn| repo::update(conn, id, &patch, now_utc()))
            .await?;

        tracing::info!(
            book_id = %id,
            available_copies = updated.available_copies,
            total_copies = updated.total_copies,
            "book updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), BookError> {
        self.db.call(move |conn| repo::delete(conn, id)).await?;
        tracing::info!(book_id = %id, "book deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<LibraryStats, BookError> {
        self.db.call(|conn| repo::stats(conn, now_utc())).await
    }
}
