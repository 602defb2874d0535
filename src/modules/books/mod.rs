pub mod models;
mod openapi;
mod repo;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use once_cell::sync::OnceCell;

pub use repo::RECENT_WINDOW;
pub use service::{BookError, BookService};

/// Book catalog: CRUD, statistics, and copy-count updates.
pub struct BooksModule {
    service: OnceCell<BookService>,
}

impl BooksModule {
    pub const fn new() -> Self {
        Self {
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Option<&BookService> {
        self.service.get()
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.service.set(BookService::new(ctx.db.clone())).is_err() {
            anyhow::bail!("books module initialized twice");
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = ctx.db.location(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        match self.service.get() {
            Some(service) => routes::router(service.clone()),
            None => {
                tracing::warn!(
                    module = self.name(),
                    "routes requested before init; mounting nothing"
                );
                Router::new()
            }
        }
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: repo::MIGRATION_001,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new())
}
