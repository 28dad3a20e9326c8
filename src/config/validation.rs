use std::net::SocketAddr;

use crate::{
    adapters::axum_adapter::check_path,
    config::{
        models::{AppConfig, LoggingConfig, RouteEntry, StubEntry},
        routes::declare_routes,
    },
    core::route_table::RouteTable,
};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Route conflict detected: {message}")]
    RouteConflict { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Application configuration validator
pub struct AppConfigValidator;

impl AppConfigValidator {
    /// Validate the entire configuration, reporting every problem found
    pub fn validate(config: &AppConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if config.routes.is_empty() && config.stubs.is_empty() {
            errors.push(ValidationError::MissingField {
                field: "routes".to_string(),
            });
        }

        for route in &config.routes {
            errors.extend(Self::validate_route(route));
        }

        for stub in &config.stubs {
            errors.extend(Self::validate_stub(stub));
        }

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if let Err(e) = Self::check_route_conflicts(config) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:3000' or '0.0.0.0:8080')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_route(route: &RouteEntry) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = check_path(&route.path) {
            errors.push(ValidationError::InvalidField {
                field: format!("route path: {}", route.path),
                message: e.to_string(),
            });
        }

        if route.controller.trim().is_empty() {
            errors.push(ValidationError::InvalidField {
                field: format!("route '{}' controller", route.path),
                message: "Controller name cannot be empty".to_string(),
            });
        }

        if route.action.trim().is_empty() {
            errors.push(ValidationError::InvalidField {
                field: format!("route '{}' action", route.path),
                message: "Action cannot be empty".to_string(),
            });
        }

        errors
    }

    fn validate_stub(stub: &StubEntry) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Err(e) = check_path(&stub.path) {
            errors.push(ValidationError::InvalidField {
                field: format!("stub path: {}", stub.path),
                message: e.to_string(),
            });
        }

        if stub.message.is_empty() {
            errors.push(ValidationError::InvalidField {
                field: format!("stub '{}' message", stub.path),
                message: "Stub message cannot be empty".to_string(),
            });
        }

        errors
    }

    fn validate_logging(logging: &LoggingConfig) -> ValidationResult<()> {
        if tracing_subscriber::EnvFilter::try_new(&logging.level).is_err() {
            return Err(ValidationError::InvalidField {
                field: "logging.level".to_string(),
                message: format!("Invalid log filter '{}'", logging.level),
            });
        }
        Ok(())
    }

    /// Load the declarations into a scratch table so equal-weight
    /// conflicts surface before the server starts
    fn check_route_conflicts(config: &AppConfig) -> ValidationResult<()> {
        let mut table = RouteTable::new();
        declare_routes(config, &mut table).map_err(|e| ValidationError::RouteConflict {
            message: e.to_string(),
        })
    }

    /// Format multiple validation errors into a single message
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        if errors.len() == 1 {
            return errors[0].to_string();
        }

        let mut message = format!("Found {} validation errors:\n", errors.len());
        for (i, error) in errors.iter().enumerate() {
            message.push_str(&format!("  {}. {}\n", i + 1, error));
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::Method;

    fn minimal_valid_config() -> AppConfig {
        AppConfig::builder()
            .listen_addr("127.0.0.1:3000")
            .route("/", "welcome", "index", Method::Get, 5)
            .build()
            .unwrap()
    }

    #[test]
    fn validate_accepts_minimal_config() {
        assert!(AppConfigValidator::validate(&minimal_valid_config()).is_ok());
    }

    #[test]
    fn validate_rejects_bad_listen_address() {
        let mut config = minimal_valid_config();
        config.listen_addr = "localhost".to_string();
        let err = AppConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid listen address"));
    }

    #[test]
    fn validate_rejects_legacy_param_syntax() {
        let mut config = minimal_valid_config();
        config.routes[0].path = "/books/:id".to_string();
        let err = AppConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("route path: /books/:id"));
    }

    #[test]
    fn validate_reports_equal_weight_conflict() {
        let mut config = minimal_valid_config();
        config.routes.push(RouteEntry {
            path: "/".to_string(),
            controller: "echo".to_string(),
            action: "index".to_string(),
            method: Method::Get,
            weight: 5,
        });
        let err = AppConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("Route already added: /-GET"));
    }

    #[test]
    fn validate_collects_every_error() {
        let config = AppConfig {
            listen_addr: "nowhere".to_string(),
            ..AppConfig::default()
        };
        let err = AppConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().starts_with("Validation failed: Found 2 validation errors"));
    }
}
