//! Weighted route table.
//!
//! Declarations are buffered here until the table is finalized by the
//! [`DispatchPipeline`](super::DispatchPipeline). Collisions on the same
//! `(path, method)` key are resolved as follows:
//! * an identical re-declaration is ignored
//! * a heavier binding replaces the existing one
//! * a lighter binding is dropped
//! * an equal-weight binding with a different target is a [`RouteError::RouteConflict`]
//!
//! Iteration follows insertion order; a replaced binding keeps its slot.
use indexmap::IndexMap;
use thiserror::Error;

use crate::core::binding::{
    Binding, ControllerRef, DEFAULT_ACTION, DEFAULT_WEIGHT, Method, RouteBinding, RouteKey,
    StubBinding,
};

/// Errors raised while building or finalizing a route table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// Two bindings with the same weight but different targets share a key
    #[error("{kind} already added: {key}")]
    RouteConflict { kind: &'static str, key: String },

    /// Mutation attempted after the table was finalized
    #[error("Route {key} cannot be removed after routes are created")]
    TableFinalized { key: String },

    /// `finalize` called on a table that is already finalized
    #[error("Cannot create routes after routes are created")]
    AlreadyFinalized,
}

/// Result type for route table operations
pub type RouteResult<T> = Result<T, RouteError>;

/// Ordered `(path, method)` → [`Binding`] map with a one-way finalized flag.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: IndexMap<RouteKey, Binding>,
    created: bool,
    verbose: bool,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log declarations that are skipped because the table is finalized.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Declare a route with the default action, method and weight.
    pub fn add(
        &mut self,
        path: impl Into<String>,
        controller: impl Into<ControllerRef>,
    ) -> RouteResult<()> {
        self.add_with(path, controller, DEFAULT_ACTION, Method::Get, DEFAULT_WEIGHT)
    }

    /// Declare a route. Once the table is finalized this silently does nothing.
    pub fn add_with(
        &mut self,
        path: impl Into<String>,
        controller: impl Into<ControllerRef>,
        action: impl Into<String>,
        method: Method,
        weight: i32,
    ) -> RouteResult<()> {
        let path = path.into();
        if self.skip_after_finalize(&path) {
            return Ok(());
        }

        self.insert(Binding::Route(RouteBinding {
            path,
            method,
            controller: controller.into(),
            action: action.into(),
            weight,
        }))
    }

    /// Declare a stub with the default method and weight.
    pub fn stub(&mut self, path: impl Into<String>, message: impl Into<String>) -> RouteResult<()> {
        self.stub_with(path, message, Method::Get, DEFAULT_WEIGHT)
    }

    /// Declare a stub. Once the table is finalized this silently does nothing.
    pub fn stub_with(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        method: Method,
        weight: i32,
    ) -> RouteResult<()> {
        let path = path.into();
        if self.skip_after_finalize(&path) {
            return Ok(());
        }

        self.insert(Binding::Stub(StubBinding {
            path,
            method,
            message: message.into(),
            weight,
        }))
    }

    /// Remove the binding at `(path, method)`, if any.
    ///
    /// Unlike `add` and `stub`, this fails once the table is finalized: the
    /// route it names is already live.
    pub fn remove(&mut self, path: &str, method: Method) -> RouteResult<()> {
        let key = RouteKey::new(path, method);
        if self.created {
            return Err(RouteError::TableFinalized {
                key: key.to_string(),
            });
        }

        if self.routes.shift_remove(&key).is_some() {
            tracing::debug!("Removed route {}", key);
        }
        Ok(())
    }

    pub fn get(&self, path: &str, method: Method) -> Option<&Binding> {
        self.routes.get(&RouteKey::new(path, method))
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&RouteKey, &Binding)> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.created
    }

    pub(crate) fn mark_finalized(&mut self) {
        self.created = true;
    }

    fn skip_after_finalize(&self, path: &str) -> bool {
        if self.created && self.verbose {
            tracing::debug!("Cannot add route after routes are created: {}", path);
        }
        self.created
    }

    fn insert(&mut self, incoming: Binding) -> RouteResult<()> {
        let key = incoming.key();

        let Some(existing) = self.routes.get_mut(&key) else {
            self.routes.insert(key, incoming);
            return Ok(());
        };

        if existing.is_identical(&incoming) {
            return Ok(());
        }

        if incoming.weight() > existing.weight() {
            tracing::debug!(
                "Route {} replaced: weight {} over {}",
                key,
                incoming.weight(),
                existing.weight()
            );
            *existing = incoming;
            return Ok(());
        }

        if incoming.weight() < existing.weight() {
            tracing::debug!(
                "Route {} kept: weight {} over {}",
                key,
                existing.weight(),
                incoming.weight()
            );
            return Ok(());
        }

        tracing::error!(route = ?incoming, record = ?existing, "Conflicting route declarations");
        Err(RouteError::RouteConflict {
            kind: incoming.kind(),
            key: key.to_string(),
        })
    }
}
