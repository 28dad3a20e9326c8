//! Route bindings: the values stored in a [`RouteTable`](super::RouteTable).
//!
//! A table key is a `(path, method)` pair. Each key holds exactly one
//! [`Binding`], either an active controller binding or a stub that answers
//! with a fixed message. Bindings are immutable once inserted; a heavier
//! binding replaces a lighter one wholesale.
use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::controller::ControllerFactory;

/// Weight given to bindings declared without an explicit one.
pub const DEFAULT_WEIGHT: i32 = 5;

/// Action name used when a route does not name one.
pub const DEFAULT_ACTION: &str = "index";

/// HTTP verbs a binding can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unsupported verb
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unsupported method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    /// Verbs are case-sensitive, matching the key format of the table.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(UnsupportedMethod(other.to_string())),
        }
    }
}

/// Table key: a path pattern paired with a verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub path: String,
    pub method: Method,
}

impl RouteKey {
    pub fn new(path: impl Into<String>, method: Method) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.path, self.method)
    }
}

/// The controller a route points at.
///
/// A `Named` controller is looked up through the
/// [`ModuleResolver`](crate::ports::module_resolver::ModuleResolver) on every
/// request; a `Direct` one is used as is.
#[derive(Clone)]
pub enum ControllerRef {
    Named(String),
    Direct(Arc<dyn ControllerFactory>),
}

impl ControllerRef {
    /// Identifier injected into the request parameters as `controller`.
    pub fn name(&self) -> &str {
        match self {
            ControllerRef::Named(name) => name,
            ControllerRef::Direct(factory) => factory.name(),
        }
    }

    /// Two references are the same controller when they carry the same
    /// name, or point at the same factory instance.
    pub fn same_as(&self, other: &ControllerRef) -> bool {
        match (self, other) {
            (ControllerRef::Named(a), ControllerRef::Named(b)) => a == b,
            (ControllerRef::Direct(a), ControllerRef::Direct(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ControllerRef::Direct(factory) => f.debug_tuple("Direct").field(&factory.name()).finish(),
        }
    }
}

impl From<&str> for ControllerRef {
    fn from(name: &str) -> Self {
        ControllerRef::Named(name.to_string())
    }
}

impl From<String> for ControllerRef {
    fn from(name: String) -> Self {
        ControllerRef::Named(name)
    }
}

impl From<Arc<dyn ControllerFactory>> for ControllerRef {
    fn from(factory: Arc<dyn ControllerFactory>) -> Self {
        ControllerRef::Direct(factory)
    }
}

/// An active route: requests are handed to `controller` running `action`.
#[derive(Debug, Clone)]
pub struct RouteBinding {
    pub path: String,
    pub method: Method,
    pub controller: ControllerRef,
    pub action: String,
    pub weight: i32,
}

/// A placeholder route answering with a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubBinding {
    pub path: String,
    pub method: Method,
    pub message: String,
    pub weight: i32,
}

impl StubBinding {
    /// Body served for every request hitting this stub.
    pub fn body(&self) -> String {
        format!("stub: {} -> {}", self.path, self.message)
    }
}

/// What a table key resolves to.
#[derive(Debug, Clone)]
pub enum Binding {
    Route(RouteBinding),
    Stub(StubBinding),
}

impl Binding {
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.path(), self.method())
    }

    pub fn path(&self) -> &str {
        match self {
            Binding::Route(route) => &route.path,
            Binding::Stub(stub) => &stub.path,
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Binding::Route(route) => route.method,
            Binding::Stub(stub) => stub.method,
        }
    }

    pub fn weight(&self) -> i32 {
        match self {
            Binding::Route(route) => route.weight,
            Binding::Stub(stub) => stub.weight,
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Route(_) => "Route",
            Binding::Stub(_) => "Stub route",
        }
    }

    /// Same target and same weight. Re-declaring such a binding is a no-op.
    pub fn is_identical(&self, other: &Binding) -> bool {
        if self.weight() != other.weight() {
            return false;
        }
        match (self, other) {
            (Binding::Route(a), Binding::Route(b)) => {
                a.controller.same_as(&b.controller) && a.action == b.action
            }
            (Binding::Stub(a), Binding::Stub(b)) => a.message == b.message,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(controller: &str, action: &str, weight: i32) -> Binding {
        Binding::Route(RouteBinding {
            path: "/hello".to_string(),
            method: Method::Get,
            controller: controller.into(),
            action: action.to_string(),
            weight,
        })
    }

    #[test]
    fn test_method_parsing_is_case_sensitive() {
        assert_eq!("POST".parse::<Method>(), Ok(Method::Post));
        assert!("post".parse::<Method>().is_err());
        assert_eq!(Method::default(), Method::Get);
    }

    #[test]
    fn test_route_key_display() {
        let key = RouteKey::new("/hello-world/{id}", Method::Post);
        assert_eq!(key.to_string(), "/hello-world/{id}-POST");
    }

    #[test]
    fn test_identical_requires_same_weight() {
        assert!(route("controller/Test", "view", 5).is_identical(&route("controller/Test", "view", 5)));
        assert!(!route("controller/Test", "view", 5).is_identical(&route("controller/Test", "view", 6)));
        assert!(!route("controller/Test", "view", 5).is_identical(&route("controller/Test", "edit", 5)));
    }

    #[test]
    fn test_route_and_stub_never_identical() {
        let stub = Binding::Stub(StubBinding {
            path: "/hello".to_string(),
            method: Method::Get,
            message: "index".to_string(),
            weight: 5,
        });
        assert!(!stub.is_identical(&route("controller/Test", "index", 5)));
    }

    #[test]
    fn test_stub_body_embeds_path_and_message() {
        let stub = StubBinding {
            path: "/book/read/{id}".to_string(),
            method: Method::Get,
            message: "read book".to_string(),
            weight: DEFAULT_WEIGHT,
        };
        assert_eq!(stub.body(), "stub: /book/read/{id} -> read book");
    }
}
