use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::controller::{ControllerFactory, HandlerResult};

/// Resolves controller names to factories.
#[async_trait]
pub trait ModuleResolver: Send + Sync + 'static {
    /// Look up the factory registered under `name`, failing with
    /// [`HandlerError::ModuleNotFound`](crate::ports::controller::HandlerError::ModuleNotFound).
    async fn resolve(&self, name: &str) -> HandlerResult<Arc<dyn ControllerFactory>>;

    /// Drop cached resolutions. Called once before every routed request.
    async fn flush_cache(&self);

    /// `(name, origin)` pairs of modules resolved so far.
    async fn loaded_modules(&self) -> Vec<(String, String)>;

    /// Registered view templates, listed in the debug panel.
    fn views(&self) -> Vec<String> {
        Vec::new()
    }
}
