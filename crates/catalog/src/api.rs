use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Book, BookPatch, LibraryStats, NewBook};

/// Failure reported by a catalog backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("book not found: {0}")]
    NotFound(String),

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Vec<serde_json::Value>,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// CRUD and statistics operations over the book catalog.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    async fn list_books(&self) -> ApiResult<Vec<Book>>;

    async fn get_book(&self, id: Uuid) -> ApiResult<Book>;

    async fn create_book(&self, book: &NewBook) -> ApiResult<Book>;

    /// Persist a partial update and return the authoritative record.
    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book>;

    async fn delete_book(&self, id: Uuid) -> ApiResult<()>;

    async fn stats(&self) -> ApiResult<LibraryStats>;
}
