//! Book catalog domain shared by the Libris service and its clients.

pub mod api;
pub mod cache;
pub mod filter;
pub mod model;
pub mod reconciler;
pub mod validation;

#[cfg(test)]
mod testing;

pub use api::{ApiError, ApiResult, LibraryApi};
pub use cache::{CacheKey, CachedCatalog};
pub use filter::{paginate, BookFilter, Page, PAGE_SIZE};
pub use model::{Book, BookPatch, CopyCounts, LibraryStats, NewBook};
pub use reconciler::{
    BookUpdater, CopyAction, CopyReconciler, CopyState, Notification, Notifier, Outcome,
};
pub use validation::{FieldError, ValidationErrors, MAX_COPIES};
