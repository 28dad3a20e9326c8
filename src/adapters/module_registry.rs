//! In-memory controller registry.
//!
//! Controllers are registered by name while the application starts. Lookups
//! go through a concurrent resolution cache which `flush_cache` empties
//! unless module caching is enabled, so a long-running debug session always
//! sees the current registrations.
use std::{collections::HashMap as StdHashMap, sync::Arc};

use async_trait::async_trait;
use scc::HashMap;

use crate::ports::{
    controller::{ControllerFactory, HandlerError, HandlerResult},
    module_resolver::ModuleResolver,
};

pub struct ModuleRegistry {
    modules: StdHashMap<String, Arc<dyn ControllerFactory>>,
    views: Vec<String>,
    resolved: HashMap<String, Arc<dyn ControllerFactory>>,
    cache_enabled: bool,
}

impl ModuleRegistry {
    pub fn builder() -> ModuleRegistryBuilder {
        ModuleRegistryBuilder::default()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Builder for [`ModuleRegistry`]
pub struct ModuleRegistryBuilder {
    modules: StdHashMap<String, Arc<dyn ControllerFactory>>,
    views: Vec<String>,
    cache_enabled: bool,
}

impl Default for ModuleRegistryBuilder {
    fn default() -> Self {
        Self {
            modules: StdHashMap::new(),
            views: Vec::new(),
            cache_enabled: true,
        }
    }
}

impl ModuleRegistryBuilder {
    /// Register a controller factory under `name`, replacing any previous one
    pub fn register(mut self, name: impl Into<String>, factory: Arc<dyn ControllerFactory>) -> Self {
        let name = name.into();
        if self.modules.insert(name.clone(), factory).is_some() {
            tracing::warn!("Controller {} registered twice; keeping the last one", name);
        }
        self
    }

    /// Record a view template name for diagnostics
    pub fn view(mut self, name: impl Into<String>) -> Self {
        self.views.push(name.into());
        self
    }

    /// Keep resolved controllers across requests
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn build(self) -> ModuleRegistry {
        ModuleRegistry {
            modules: self.modules,
            views: self.views,
            resolved: HashMap::new(),
            cache_enabled: self.cache_enabled,
        }
    }
}

#[async_trait]
impl ModuleResolver for ModuleRegistry {
    async fn resolve(&self, name: &str) -> HandlerResult<Arc<dyn ControllerFactory>> {
        if let Some(entry) = self.resolved.get_async(name).await {
            return Ok(entry.get().clone());
        }

        let factory = self
            .modules
            .get(name)
            .cloned()
            .ok_or_else(|| HandlerError::ModuleNotFound(name.to_string()))?;

        let _ = self
            .resolved
            .insert_async(name.to_string(), factory.clone())
            .await;
        tracing::debug!("Resolved controller {}", name);
        Ok(factory)
    }

    async fn flush_cache(&self) {
        if self.cache_enabled {
            return;
        }
        self.resolved.retain_async(|_, _| false).await;
    }

    async fn loaded_modules(&self) -> Vec<(String, String)> {
        let mut loaded = Vec::new();
        let loaded_ref = &mut loaded;
        self.resolved
            .retain_async(|name, factory| {
                loaded_ref.push((name.clone(), factory.name().to_string()));
                true
            })
            .await;
        loaded.sort();
        loaded
    }

    fn views(&self) -> Vec<String> {
        self.views.clone()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        core::{request::DispatchRequest, response::DispatchResult},
        ports::controller::Controller,
    };

    struct Nothing;

    #[async_trait]
    impl Controller for Nothing {
        async fn execute(&mut self) -> HandlerResult<DispatchResult> {
            Ok(DispatchResult::ok(""))
        }
    }

    struct NothingFactory;

    impl ControllerFactory for NothingFactory {
        fn name(&self) -> &str {
            "Nothing"
        }

        fn construct(&self, _request: DispatchRequest) -> HandlerResult<Box<dyn Controller>> {
            Ok(Box::new(Nothing))
        }
    }

    fn registry(cache_enabled: bool) -> ModuleRegistry {
        ModuleRegistry::builder()
            .register("controller/Nothing", Arc::new(NothingFactory))
            .view("layout/default")
            .cache_enabled(cache_enabled)
            .build()
    }

    #[tokio::test]
    async fn test_resolve_unknown_module() {
        let err = registry(true).resolve("controller/Missing").await.err().unwrap();
        assert_eq!(err.to_string(), "Module not found: controller/Missing");
    }

    #[tokio::test]
    async fn test_resolve_records_loaded_module() {
        let registry = registry(true);
        assert!(registry.loaded_modules().await.is_empty());

        let factory = registry.resolve("controller/Nothing").await.unwrap();
        assert_eq!(factory.name(), "Nothing");
        assert_eq!(
            registry.loaded_modules().await,
            vec![("controller/Nothing".to_string(), "Nothing".to_string())]
        );
        assert_eq!(registry.views(), vec!["layout/default".to_string()]);
    }

    #[tokio::test]
    async fn test_flush_respects_cache_setting() {
        let cached = registry(true);
        cached.resolve("controller/Nothing").await.unwrap();
        cached.flush_cache().await;
        assert_eq!(cached.loaded_modules().await.len(), 1);

        let uncached = registry(false);
        uncached.resolve("controller/Nothing").await.unwrap();
        uncached.flush_cache().await;
        assert!(uncached.loaded_modules().await.is_empty());
        assert!(uncached.is_registered("controller/Nothing"));
    }
}
