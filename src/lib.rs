//! Shelf application library.
//!
//! Wires the book and review modules into the kernel registry and drives
//! the service lifecycle: collection registration, module init/start, HTTP
//! serving, and shutdown.

use std::sync::Arc;

use shelf_kernel::settings::Settings;
use shelf_kernel::{AppCtx, ModuleRegistry};
use shelf_store::{MemoryStore, Store};

pub mod modules;
pub mod utils;

/// Run the service until the HTTP server exits.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let ctx = AppCtx {
        settings: Arc::new(settings),
        store,
    };

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    registry.apply_collections(ctx.store.as_ref()).await?;
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    shelf_http::start_server(&registry, &ctx).await?;

    registry.stop_all().await?;
    Ok(())
}
