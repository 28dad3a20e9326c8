pub mod axum_adapter;
pub mod middleware;
pub mod module_registry;
pub mod settings;

/// Re-export commonly used types from adapters
pub use axum_adapter::AxumRouteAdapter;
pub use middleware::*;
pub use module_registry::ModuleRegistry;
pub use settings::SharedSettings;
