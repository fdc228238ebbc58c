use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use shelf_store::{CollectionSpec, Store};

use crate::settings::Settings;

/// Shared application context handed to modules explicitly.
///
/// Carries the loaded settings and the store handle; modules never reach
/// for process globals.
#[derive(Clone)]
pub struct AppCtx {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn Store>,
}

/// Core module trait every shelf module implements.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name for this module
    fn name(&self) -> &'static str;

    /// Initialize the module with the provided context.
    /// Called during application startup after collections are registered.
    async fn init(&self, _ctx: &AppCtx) -> anyhow::Result<()> {
        Ok(())
    }

    /// Return the Axum router for this module's routes.
    /// Routes will be mounted under `/api/{module_name}`.
    fn routes(&self, _ctx: &AppCtx) -> Router {
        Router::new()
    }

    /// Return OpenAPI specification fragment for this module as JSON.
    /// Will be merged with other modules' specs.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Collections this module owns, including the unique indexes the
    /// store must enforce. Registered before `init` runs.
    fn collections(&self) -> Vec<CollectionSpec> {
        vec![]
    }

    /// Start background tasks for this module.
    /// Called after every module is initialized.
    async fn start(&self, _ctx: &AppCtx) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop the module and clean up resources.
    /// Called during application shutdown.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
