pub mod loader;
pub mod models;
pub mod routes;
pub mod validation;

pub use loader::load_config;
pub use models::*;
pub use routes::declare_routes;
pub use validation::{AppConfigValidator, ValidationError, ValidationResult};
