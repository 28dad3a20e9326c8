use async_trait::async_trait;
use thiserror::Error;

use crate::core::{request::DispatchRequest, response::DispatchResult};

/// Errors surfaced while resolving, constructing or running a controller
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HandlerError {
    /// No controller is registered under the requested name
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// The factory refused to build a controller for this request
    #[error("Failed to construct controller {controller}: {message}")]
    Construction { controller: String, message: String },

    /// The controller failed while executing; the message is shown verbatim
    #[error("{0}")]
    Execution(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl From<eyre::Report> for HandlerError {
    fn from(report: eyre::Report) -> Self {
        HandlerError::Other(report.into())
    }
}

/// Result type for controller operations
pub type HandlerResult<T> = Result<T, HandlerError>;

/// A controller instance, built for exactly one request.
#[async_trait]
pub trait Controller: Send {
    /// Run the action named by the request's `action` parameter.
    async fn execute(&mut self) -> HandlerResult<DispatchResult>;

    /// Error the controller caught and answered itself, if any.
    ///
    /// Controllers that turn a failure into a response rather than returning
    /// `Err` expose it here so the instrumented strategy can report it.
    fn take_error(&mut self) -> Option<HandlerError> {
        None
    }
}

/// Builds controllers. Plays the part of a controller "class".
pub trait ControllerFactory: Send + Sync + 'static {
    /// Name shown in logs, request parameters and the debug panel.
    fn name(&self) -> &str;

    fn construct(&self, request: DispatchRequest) -> HandlerResult<Box<dyn Controller>>;
}
