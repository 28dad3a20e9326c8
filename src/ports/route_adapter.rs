use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::core::{binding::Binding, request::DispatchRequest, response::DispatchResult};

/// Error type for route registration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdapterError {
    /// The server cannot accept this path pattern
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The server rejected the registration
    #[error("Registration failed: {0}")]
    Registration(String),
}

/// Callback registered for one table entry.
///
/// Receives the matched request and a fresh reply handle, and yields the
/// reply after the response has been written to it.
pub type RouteCallback<R> = Arc<dyn Fn(DispatchRequest, R) -> BoxFuture<'static, R> + Send + Sync>;

/// Bridges the route table to a concrete HTTP server.
pub trait RouteAdapter: Send + Sync + 'static {
    /// The server routes are registered on.
    type Server;
    /// Per-request response handle.
    type Reply: Send + 'static;

    /// Register `callback` for `binding`'s path under its verb.
    fn add_route(
        &self,
        server: &mut Self::Server,
        binding: &Binding,
        callback: RouteCallback<Self::Reply>,
    ) -> Result<(), AdapterError>;

    /// Copy a normalized result onto the reply.
    fn write_response(&self, result: DispatchResult, reply: &mut Self::Reply);
}
