use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::core::binding::Method;

/// Header carrying the id assigned to a request at the server edge.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A matched request as seen by controllers.
///
/// Server adapters build this from their native request type. `params`
/// holds the path parameters extracted by the server plus the `controller`
/// and `action` entries injected by the dispatch pipeline.
#[derive(Debug, Clone, Default)]
pub struct DispatchRequest {
    pub method: Method,
    /// Full request target including the query string.
    pub url: String,
    pub path: String,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    pub session: Value,
}

impl DispatchRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        let path = url.split('?').next().unwrap_or_default().to_string();
        Self {
            method,
            url,
            path,
            ..Default::default()
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Id assigned by the server edge, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(REQUEST_ID_HEADER).map(String::as_str)
    }

    /// Action injected by the pipeline, `index` if absent.
    pub fn action(&self) -> &str {
        self.param("action").unwrap_or(crate::core::binding::DEFAULT_ACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_path_from_query() {
        let request = DispatchRequest::new(Method::Get, "/books/7?page=2");
        assert_eq!(request.path, "/books/7");
        assert_eq!(request.url, "/books/7?page=2");
        assert_eq!(request.action(), "index");
        assert_eq!(request.request_id(), None);
    }

    #[test]
    fn test_request_id_from_headers() {
        let mut request = DispatchRequest::new(Method::Get, "/");
        request
            .headers
            .insert(REQUEST_ID_HEADER.to_string(), "abc-123".to_string());
        assert_eq!(request.request_id(), Some("abc-123"));
    }
}
