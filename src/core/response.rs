//! Normalized handler output.
use http::{HeaderMap, HeaderValue, StatusCode, header};
use serde_json::Value;

/// Content type applied when a handler leaves it unset.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Response body: plain text or a structured payload serialized on write.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl ResponseBody {
    pub fn into_text(self) -> String {
        match self {
            ResponseBody::Text(text) => text,
            ResponseBody::Json(value) => value.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Text(String::new())
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Text(text.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Text(text)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}

/// Uniform shape of every response produced by the dispatch pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResult {
    pub status: StatusCode,
    pub body: ResponseBody,
    pub headers: HeaderMap,
    /// Raw `Set-Cookie` values.
    pub cookies: Vec<String>,
}

impl DispatchResult {
    pub fn new(status: StatusCode, body: impl Into<ResponseBody>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
        }
    }

    pub fn ok(body: impl Into<ResponseBody>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// 500 response whose body is the error's message.
    pub fn failure(error: &dyn std::error::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Set the default content type if the handler did not set one.
    pub fn ensure_content_type(&mut self) {
        self.headers
            .entry(header::CONTENT_TYPE)
            .or_insert_with(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    }

    pub fn is_html(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.starts_with("text/html"))
    }

    /// JSON and script payloads, whose bodies are serialized rather than decorated.
    pub fn is_machine_readable(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.contains("json") || ct.contains("javascript"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_content_type_keeps_existing() {
        let mut result = DispatchResult::ok("{}").with_content_type("application/json");
        result.ensure_content_type();
        assert_eq!(result.content_type(), Some("application/json"));
        assert!(result.is_machine_readable());
        assert!(!result.is_html());
    }

    #[test]
    fn test_ensure_content_type_defaults_to_html() {
        let mut result = DispatchResult::ok("hello");
        assert_eq!(result.content_type(), None);
        result.ensure_content_type();
        assert_eq!(result.content_type(), Some(DEFAULT_CONTENT_TYPE));
        assert!(result.is_html());
    }

    #[test]
    fn test_json_body_into_text() {
        let body = ResponseBody::from(serde_json::json!({"ok": true}));
        assert_eq!(body.into_text(), r#"{"ok":true}"#);
    }
}
