use async_trait::async_trait;
use axum::Router;
use libris_db::Database;

/// Context provided to modules during initialization
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
    pub db: &'a Database,
}

/// Forward-only schema change contributed by a module
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// Contract every Libris module implements
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the `/api/{name}` mount point
    fn name(&self) -> &'static str;

    /// Called after migrations have run, before routes are collected
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Axum router for this module, mounted under `/api/{module_name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the
    /// service document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Migrations are executed in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
