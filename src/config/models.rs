//! Configuration data structures for Switchyard.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files. They
//! carry serde defaults so that a config naming only its routes stays short.
use serde::{Deserialize, Serialize};

use crate::core::binding::{DEFAULT_ACTION, DEFAULT_WEIGHT, Method};

fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}

fn default_weight() -> i32 {
    DEFAULT_WEIGHT
}

/// Runtime switches read during dispatch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SystemConfig {
    /// Use the instrumented execution strategy and append the debug panel
    pub debug: bool,
    /// Keep resolved controllers across requests instead of flushing them
    pub cache_modules: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            debug: false,
            cache_modules: true,
        }
    }
}

/// Log output configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `switchyard=debug`
    pub level: String,
    /// Emit JSON lines instead of pretty console output
    pub json: bool,
    /// Attach the current span and span list to JSON lines
    pub spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            spans: false,
        }
    }
}

/// A controller route declaration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: String,
    /// Name the controller is registered under
    pub controller: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default = "default_weight")]
    pub weight: i32,
}

/// A stub route declaration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StubEntry {
    pub path: String,
    pub message: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default = "default_weight")]
    pub weight: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub listen_addr: String,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    #[serde(default)]
    pub stubs: Vec<StubEntry>,
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            system: SystemConfig::default(),
            logging: LoggingConfig::default(),
            routes: Vec::new(),
            stubs: Vec::new(),
        }
    }
}

/// Builder for AppConfig, mostly used by tests and embedders
#[derive(Default)]
pub struct AppConfigBuilder {
    listen_addr: Option<String>,
    system: SystemConfig,
    logging: Option<LoggingConfig>,
    routes: Vec<RouteEntry>,
    stubs: Vec<StubEntry>,
}

impl AppConfigBuilder {
    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Enable or disable debug mode
    pub fn debug(mut self, enabled: bool) -> Self {
        self.system.debug = enabled;
        self
    }

    /// Enable or disable the resolved-module cache
    pub fn cache_modules(mut self, enabled: bool) -> Self {
        self.system.cache_modules = enabled;
        self
    }

    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Declare a controller route
    pub fn route(
        mut self,
        path: impl Into<String>,
        controller: impl Into<String>,
        action: impl Into<String>,
        method: Method,
        weight: i32,
    ) -> Self {
        self.routes.push(RouteEntry {
            path: path.into(),
            controller: controller.into(),
            action: action.into(),
            method,
            weight,
        });
        self
    }

    /// Declare a stub route
    pub fn stub(mut self, path: impl Into<String>, message: impl Into<String>, method: Method) -> Self {
        self.stubs.push(StubEntry {
            path: path.into(),
            message: message.into(),
            method,
            weight: DEFAULT_WEIGHT,
        });
        self
    }

    /// Build the final AppConfig
    pub fn build(self) -> Result<AppConfig, String> {
        let listen_addr = self
            .listen_addr
            .ok_or_else(|| "listen_addr is required".to_string())?;

        Ok(AppConfig {
            listen_addr,
            system: self.system,
            logging: self.logging.unwrap_or_default(),
            routes: self.routes,
            stubs: self.stubs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_entry_defaults() {
        let entry: RouteEntry =
            serde_json::from_str(r#"{"path": "/", "controller": "welcome"}"#).unwrap();
        assert_eq!(entry.action, "index");
        assert_eq!(entry.method, Method::Get);
        assert_eq!(entry.weight, 5);
    }

    #[test]
    fn test_logging_flags_are_independent() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"spans": true}"#).unwrap();
        assert_eq!(logging.level, "info");
        assert!(!logging.json);
        assert!(logging.spans);
    }

    #[test]
    fn test_builder_requires_listen_addr() {
        assert!(AppConfig::builder().build().is_err());

        let config = AppConfig::builder()
            .listen_addr("127.0.0.1:3000")
            .debug(true)
            .stub("/soon", "coming soon", Method::Get)
            .build()
            .unwrap();
        assert!(config.system.debug);
        assert!(config.system.cache_modules);
        assert_eq!(config.stubs.len(), 1);
    }
}
