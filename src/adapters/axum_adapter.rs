//! [`RouteAdapter`] for axum.
//!
//! Each binding becomes a `MethodRouter` on an `axum::Router`. The handler
//! converts the axum request into a [`DispatchRequest`], runs the route
//! callback and returns the written [`Response`].
use std::{
    collections::HashMap,
    panic::{AssertUnwindSafe, catch_unwind},
};

use axum::{
    Router,
    body::Body as AxumBody,
    extract::{Path, Request},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use http_body_util::LengthLimitError;
use serde_json::Value;

use crate::{
    core::{
        binding::{Binding, Method},
        request::DispatchRequest,
        response::DispatchResult,
    },
    ports::route_adapter::{AdapterError, RouteAdapter, RouteCallback},
};

/// Default cap on buffered request bodies (2 MiB).
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Check that `path` is a pattern the axum router accepts.
///
/// Paths must be absolute and name parameters as `{param}` / `{*rest}`;
/// the `:param` and `*rest` segment forms are rejected.
pub fn check_path(path: &str) -> Result<(), AdapterError> {
    if !path.starts_with('/') {
        return Err(AdapterError::InvalidPath {
            path: path.to_string(),
            reason: "Route paths must start with '/'".to_string(),
        });
    }

    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return Err(AdapterError::InvalidPath {
            path: path.to_string(),
            reason: "Use '{param}' or '{*rest}' for path parameters".to_string(),
        });
    }

    Ok(())
}

/// Registers route callbacks on an `axum::Router`.
#[derive(Debug, Clone)]
pub struct AxumRouteAdapter {
    body_limit: usize,
}

impl AxumRouteAdapter {
    pub fn new() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Maximum request body size buffered before dispatch.
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

impl Default for AxumRouteAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteAdapter for AxumRouteAdapter {
    type Server = Router;
    type Reply = Response;

    fn add_route(
        &self,
        server: &mut Router,
        binding: &Binding,
        callback: RouteCallback<Response>,
    ) -> Result<(), AdapterError> {
        check_path(binding.path())?;

        let body_limit = self.body_limit;
        let handler = move |params: Option<Path<HashMap<String, String>>>, req: Request| {
            let callback = callback.clone();
            async move {
                let params = params.map(|Path(params)| params).unwrap_or_default();
                match into_dispatch_request(req, params, body_limit).await {
                    Ok(request) => callback(request, Response::default()).await,
                    Err(e) if exceeds_limit(&e) => {
                        tracing::warn!("Request body exceeds {} bytes", body_limit);
                        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read request body: {}", e);
                        (StatusCode::BAD_REQUEST, "Invalid request body").into_response()
                    }
                }
            }
        };

        let method_router = match binding.method() {
            Method::Get => get(handler),
            Method::Post => post(handler),
            Method::Put => put(handler),
            Method::Delete => delete(handler),
        };

        // The router panics on patterns it cannot insert; keep the previous
        // router intact and report the failure instead.
        let path = binding.path().to_string();
        let candidate = server.clone();
        match catch_unwind(AssertUnwindSafe(move || candidate.route(&path, method_router))) {
            Ok(router) => {
                *server = router;
                Ok(())
            }
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "router rejected the route".to_string());
                Err(AdapterError::Registration(reason))
            }
        }
    }

    fn write_response(&self, result: DispatchResult, reply: &mut Response) {
        *reply.status_mut() = result.status;

        let headers = reply.headers_mut();
        headers.extend(result.headers);
        for cookie in result.cookies {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::warn!("Dropping invalid cookie: {}", e),
            }
        }

        *reply.body_mut() = AxumBody::from(result.body.into_text());
    }
}

fn exceeds_limit(error: &axum::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return true;
        }
        source = cause.source();
    }
    false
}

async fn into_dispatch_request(
    req: Request,
    params: HashMap<String, String>,
    body_limit: usize,
) -> Result<DispatchRequest, axum::Error> {
    let (parts, body) = req.into_parts();

    // Verbs outside the supported set are treated as GET.
    let method = parts.method.as_str().parse::<Method>().unwrap_or_default();
    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());
    let query = parts
        .uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();
    let body = axum::body::to_bytes(body, body_limit).await?;

    Ok(DispatchRequest {
        method,
        url,
        path: parts.uri.path().to_string(),
        params,
        query,
        headers,
        body,
        session: Value::Null,
    })
}
