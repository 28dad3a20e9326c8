//! [`SettingsProvider`] backed by a swappable [`AppConfig`] snapshot.
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::{config::models::AppConfig, ports::settings::SettingsProvider};

/// Holds the live configuration. Readers never block; `store` swaps in a
/// new snapshot that subsequent dispatches observe.
pub struct SharedSettings {
    holder: ArcSwap<AppConfig>,
}

impl SharedSettings {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            holder: ArcSwap::new(config),
        }
    }

    pub fn load(&self) -> Arc<AppConfig> {
        self.holder.load_full()
    }

    pub fn store(&self, config: Arc<AppConfig>) {
        tracing::info!(
            debug = config.system.debug,
            "Settings updated"
        );
        self.holder.store(config);
    }
}

impl SettingsProvider for SharedSettings {
    fn debug_enabled(&self) -> bool {
        self.holder.load().system.debug
    }

    fn snapshot(&self) -> Value {
        let config = self.holder.load_full();
        match serde_json::to_value(&*config) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize settings snapshot: {}", e);
                Value::Null
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_toggles_debug() {
        let settings = SharedSettings::new(Arc::new(AppConfig::default()));
        assert!(!settings.debug_enabled());

        let mut config = AppConfig::default();
        config.system.debug = true;
        settings.store(Arc::new(config));
        assert!(settings.debug_enabled());
        assert_eq!(settings.snapshot()["system"]["debug"], true);
        assert_eq!(settings.load().listen_addr, "127.0.0.1:8080");
    }
}
