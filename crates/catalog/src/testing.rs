//! In-memory catalog backend used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::{ApiError, ApiResult, LibraryApi};
use crate::model::{Book, BookPatch, LibraryStats, NewBook};
use crate::validation::{validate_book, validate_new_book};

#[derive(Default)]
pub struct InMemoryApi {
    books: Mutex<Vec<Book>>,
    updates: Mutex<Vec<(Uuid, BookPatch)>>,
    fail_next_update: Mutex<Option<String>>,
    list_calls: AtomicUsize,
}

impl InMemoryApi {
    pub fn with_book(title: &str, available: i64, total: i64) -> Self {
        let api = Self::default();
        api.books.lock().unwrap().push(Book {
            id: Uuid::now_v7(),
            title: title.to_string(),
            author: "Unknown".to_string(),
            series: None,
            publisher: None,
            genre: None,
            language: None,
            year_published: None,
            total_copies: total,
            available_copies: available,
            price: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        });
        api
    }

    pub fn first_id(&self) -> Uuid {
        self.books.lock().unwrap()[0].id
    }

    pub fn first_book(&self) -> Book {
        self.books.lock().unwrap()[0].clone()
    }

    /// Overwrite the stored counters as if another editor changed them.
    pub fn set_counts(&self, available: i64, total: i64) {
        let mut books = self.books.lock().unwrap();
        books[0].available_copies = available;
        books[0].total_copies = total;
    }

    pub fn fail_next_update(&self, message: &str) {
        *self.fail_next_update.lock().unwrap() = Some(message.to_string());
    }

    pub fn updates(&self) -> Vec<(Uuid, BookPatch)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LibraryApi for InMemoryApi {
    async fn list_books(&self) -> ApiResult<Vec<Book>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.books.lock().unwrap().clone())
    }

    async fn get_book(&self, id: Uuid) -> ApiResult<Book> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    async fn create_book(&self, book: &NewBook) -> ApiResult<Book> {
        validate_new_book(book).map_err(|e| ApiError::Validation {
            message: e.to_string(),
            details: vec![],
        })?;
        let now = OffsetDateTime::now_utc();
        let created = Book {
            id: Uuid::now_v7(),
            title: book.title.clone(),
            author: book.author.clone(),
            series: book.series.clone(),
            publisher: book.publisher.clone(),
            genre: book.genre.clone(),
            language: book.language.clone(),
            year_published: book.year_published,
            total_copies: book.total_copies,
            available_copies: book.initial_available(),
            price: book.price,
            created_at: now,
            updated_at: now,
        };
        self.books.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book> {
        self.updates.lock().unwrap().push((id, patch.clone()));
        if let Some(message) = self.fail_next_update.lock().unwrap().take() {
            return Err(ApiError::Server {
                status: 500,
                message,
            });
        }

        let mut books = self.books.lock().unwrap();
        let book = books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        let merged = book.merged(patch);
        validate_book(&merged).map_err(|e| ApiError::Validation {
            message: e.to_string(),
            details: vec![],
        })?;
        *book = merged;
        Ok(book.clone())
    }

    async fn delete_book(&self, id: Uuid) -> ApiResult<()> {
        let mut books = self.books.lock().unwrap();
        let before = books.len();
        books.retain(|b| b.id != id);
        if books.len() == before {
            return Err(ApiError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn stats(&self) -> ApiResult<LibraryStats> {
        let books = self.books.lock().unwrap();
        Ok(LibraryStats {
            total_books: books.len() as i64,
            total_copies: books.iter().map(|b| b.total_copies).sum(),
            available_copies: books.iter().map(|b| b.available_copies).sum(),
            top_genre: None,
            recent_additions: books.len() as i64,
        })
    }
}
