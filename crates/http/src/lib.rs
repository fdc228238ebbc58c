//! HTTP server facade for shelf with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde_json::json;

use shelf_kernel::{AppCtx, ModuleRegistry};

pub mod error;
pub mod extract;
pub mod response;
pub mod router;

use router::RouterBuilder;

/// Start the HTTP server with the given module registry
pub async fn start_server(registry: &ModuleRegistry, ctx: &AppCtx) -> anyhow::Result<()> {
    let server = &ctx.settings.server;

    tracing::info!("starting HTTP server on {}:{}", server.host, server.port);

    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port))
        .await
        .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        server.host,
        server.port
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &AppCtx) -> Router {
    let mut router_builder = RouterBuilder::new()
        .route("/", get(root))
        .route("/healthz", get(health_check));

    // Mount module routes
    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes(ctx));
    }

    // Add OpenAPI documentation, then global middlewares (layers wrap the
    // routes mounted above).
    router_builder
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(ctx.settings.server.request_timeout_ms)
        .with_principal_header(&ctx.settings.auth.principal_header)
        .build()
}

/// Root banner endpoint
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "welcome to the shelf book review API"
    }))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
