pub mod books;
pub mod reviews;

use shelf_kernel::ModuleRegistry;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry) {
    registry.register(books::create_module());
    registry.register(reviews::create_module());
}
