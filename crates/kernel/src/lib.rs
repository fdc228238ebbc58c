pub mod module;
pub mod registry;
pub mod settings;

pub use module::{AppCtx, Module};
pub use registry::ModuleRegistry;
