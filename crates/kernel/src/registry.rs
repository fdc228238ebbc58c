use anyhow::Context;
use std::sync::Arc;

use shelf_store::Store;

use crate::module::{AppCtx, Module};

/// Registry managing module lifecycle: collection registration, init,
/// start, and stop in reverse registration order.
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Register a module with the registry
    pub fn register(&mut self, module: Arc<dyn Module>) {
        self.modules.push(module);
    }

    /// All registered modules, in registration order
    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.modules
    }

    /// Get a module by name
    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Register every module's collections (and their unique indexes) with
    /// the store. Runs before any module initializes, so invariants the
    /// store enforces are in place from the first write.
    pub async fn apply_collections(&self, store: &dyn Store) -> anyhow::Result<()> {
        for module in &self.modules {
            for spec in module.collections() {
                tracing::info!(
                    module = module.name(),
                    collection = spec.name,
                    "registering collection"
                );
                store.register(spec).await.with_context(|| {
                    format!("failed to register collections for module '{}'", module.name())
                })?;
            }
        }
        Ok(())
    }

    /// Initialize modules in registration order
    pub async fn init_all(&self, ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!("initializing {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "initializing module");

            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start modules in registration order
    pub async fn start_all(&self, ctx: &AppCtx) -> anyhow::Result<()> {
        tracing::info!("starting {} modules", self.modules.len());

        for module in &self.modules {
            tracing::info!(module = module.name(), "starting module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop modules in reverse registration order
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} modules", self.modules.len());

        for module in self.modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop module '{}'", module.name()))?;
        }

        Ok(())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use shelf_store::{CollectionSpec, Filter, MemoryStore};

    struct TestModule {
        name: &'static str,
    }

    #[async_trait::async_trait]
    impl Module for TestModule {
        fn name(&self) -> &'static str {
            self.name
        }

        fn collections(&self) -> Vec<CollectionSpec> {
            vec![CollectionSpec {
                name: "test",
                unique: &[&["slug"]],
            }]
        }
    }

    fn test_ctx() -> AppCtx {
        AppCtx {
            settings: Arc::new(Settings::default()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
    }

    #[test]
    fn get_module_by_name() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(TestModule { name: "test" }));

        assert!(registry.get_module("test").is_some());
        assert!(registry.get_module("missing").is_none());
    }

    #[tokio::test]
    async fn module_lifecycle() {
        let mut registry = ModuleRegistry::new();
        let ctx = test_ctx();

        registry.register(Arc::new(TestModule { name: "test" }));

        registry.apply_collections(ctx.store.as_ref()).await.unwrap();
        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();
    }

    #[tokio::test]
    async fn apply_collections_registers_with_store() {
        let mut registry = ModuleRegistry::new();
        let ctx = test_ctx();

        registry.register(Arc::new(TestModule { name: "test" }));
        registry.apply_collections(ctx.store.as_ref()).await.unwrap();

        // Collection is usable once applied.
        assert_eq!(ctx.store.count("test", &Filter::new()).await.unwrap(), 0);
    }
}
