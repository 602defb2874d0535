//! Cached data-access layer over any [`LibraryApi`].
//!
//! Read-mostly views (the book list and the statistics cards) are kept in
//! explicit cache entries. Invalidation contract: after a successful
//! create, update, or delete, both the [`CacheKey::BookList`] and
//! [`CacheKey::Stats`] entries are dropped. A failed mutation leaves every
//! entry untouched.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{ApiResult, LibraryApi};
use crate::model::{Book, BookPatch, LibraryStats, NewBook};

/// Identifies one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    BookList,
    Stats,
}

/// Decorator adding list/stats caching to a catalog backend.
pub struct CachedCatalog<A> {
    inner: A,
    books: Mutex<Option<Vec<Book>>>,
    stats: Mutex<Option<LibraryStats>>,
}

impl<A: LibraryApi> CachedCatalog<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            books: Mutex::new(None),
            stats: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Whether an entry currently holds a value.
    pub async fn is_cached(&self, key: CacheKey) -> bool {
        match key {
            CacheKey::BookList => self.books.lock().await.is_some(),
            CacheKey::Stats => self.stats.lock().await.is_some(),
        }
    }

    pub async fn invalidate(&self, key: CacheKey) {
        tracing::debug!(?key, "invalidating cache entry");
        match key {
            CacheKey::BookList => *self.books.lock().await = None,
            CacheKey::Stats => *self.stats.lock().await = None,
        }
    }

    async fn invalidate_after_mutation(&self) {
        self.invalidate(CacheKey::BookList).await;
        self.invalidate(CacheKey::Stats).await;
    }
}

#[async_trait]
impl<A: LibraryApi> LibraryApi for CachedCatalog<A> {
    async fn list_books(&self) -> ApiResult<Vec<Book>> {
        let mut entry = self.books.lock().await;
        if let Some(books) = entry.as_ref() {
            return Ok(books.clone());
        }

        let books = self.inner.list_books().await?;
        *entry = Some(books.clone());
        Ok(books)
    }

    async fn get_book(&self, id: Uuid) -> ApiResult<Book> {
        self.inner.get_book(id).await
    }

    async fn create_book(&self, book: &NewBook) -> ApiResult<Book> {
        let created = self.inner.create_book(book).await?;
        self.invalidate_after_mutation().await;
        Ok(created)
    }

    async fn update_book(&self, id: Uuid, patch: &BookPatch) -> ApiResult<Book> {
        let updated = self.inner.update_book(id, patch).await?;
        self.invalidate_after_mutation().await;
        Ok(updated)
    }

    async fn delete_book(&self, id: Uuid) -> ApiResult<()> {
        self.inner.delete_book(id).await?;
        self.invalidate_after_mutation().await;
        Ok(())
    }

    async fn stats(&self) -> ApiResult<LibraryStats> {
        let mut entry = self.stats.lock().await;
        if let Some(stats) = entry.as_ref() {
            return Ok(stats.clone());
        }

        let stats = self.inner.stats().await?;
        *entry = Some(stats.clone());
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryApi;

    #[tokio::test]
    async fn test_list_is_served_from_cache() {
        let api = InMemoryApi::with_book("Middlemarch", 2, 2);
        let catalog = CachedCatalog::new(api);

        assert_eq!(catalog.list_books().await.unwrap().len(), 1);
        assert_eq!(catalog.list_books().await.unwrap().len(), 1);
        assert_eq!(catalog.inner().list_calls(), 1);
        assert!(catalog.is_cached(CacheKey::BookList).await);
    }

    #[tokio::test]
    async fn test_successful_update_invalidates_list_and_stats() {
        let api = InMemoryApi::with_book("Middlemarch", 2, 2);
        let id = api.first_id();
        let catalog = CachedCatalog::new(api);

        catalog.list_books().await.unwrap();
        catalog.stats().await.unwrap();

        catalog
            .update_book(id, &BookPatch::counts(1, None))
            .await
            .unwrap();

        assert!(!catalog.is_cached(CacheKey::BookList).await);
        assert!(!catalog.is_cached(CacheKey::Stats).await);

        let books = catalog.list_books().await.unwrap();
        assert_eq!(books[0].available_copies, 1);
        assert_eq!(catalog.inner().list_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_keeps_cache() {
        let api = InMemoryApi::with_book("Middlemarch", 2, 2);
        let id = api.first_id();
        api.fail_next_update("database unavailable");
        let catalog = CachedCatalog::new(api);

        catalog.list_books().await.unwrap();
        let result = catalog.update_book(id, &BookPatch::counts(1, None)).await;

        assert!(result.is_err());
        assert!(catalog.is_cached(CacheKey::BookList).await);
    }

    #[tokio::test]
    async fn test_create_and_delete_invalidate() {
        let api = InMemoryApi::default();
        let catalog = CachedCatalog::new(api);

        catalog.list_books().await.unwrap();
        let created = catalog
            .create_book(&NewBook {
                title: "Ulysses".to_string(),
                author: "James Joyce".to_string(),
                total_copies: 1,
                ..NewBook::default()
            })
            .await
            .unwrap();
        assert!(!catalog.is_cached(CacheKey::BookList).await);

        assert_eq!(catalog.list_books().await.unwrap().len(), 1);
        catalog.delete_book(created.id).await.unwrap();
        assert!(!catalog.is_cached(CacheKey::BookList).await);
        assert!(catalog.list_books().await.unwrap().is_empty());
    }
}
