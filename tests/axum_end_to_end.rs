// Full stack: config -> route table -> axum router -> built-in controllers
#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum::{Router, body::Body, http::Request, middleware, response::Response};
    use http::{StatusCode, header};
    use serde_json::Value;
    use switchyard::{
        AxumRouteAdapter, ModuleRegistry, SharedSettings,
        adapters::{request_timing_middleware, route_not_found},
        builtin::register_builtins,
        config::{AppConfig, AppConfigValidator, declare_routes},
        core::{DispatchPipeline, Method, RouteTable},
    };
    use tower::ServiceExt; // for oneshot

    fn config(debug: bool) -> AppConfig {
        AppConfig::builder()
            .listen_addr("127.0.0.1:0")
            .debug(debug)
            .route("/", "welcome", "index", Method::Get, 5)
            .route("/hello/{name}", "welcome", "index", Method::Get, 5)
            .route("/echo/{id}", "echo", "show", Method::Post, 5)
            .route("/broken", "missing", "index", Method::Get, 5)
            .stub("/books/{id}", "not ready", Method::Get)
            .build()
            .unwrap()
    }

    fn app(debug: bool) -> Router {
        let config = Arc::new(config(debug));
        AppConfigValidator::validate(&config).unwrap();

        let registry = register_builtins(ModuleRegistry::builder()).build();
        let pipeline = DispatchPipeline::new(
            Arc::new(registry),
            Arc::new(SharedSettings::new(config.clone())),
        );

        let mut table = RouteTable::new();
        declare_routes(&config, &mut table).unwrap();

        let mut router = Router::new();
        let report = pipeline
            .finalize(&mut table, &mut router, Arc::new(AxumRouteAdapter::new()))
            .unwrap();
        assert!(report.is_complete());

        router
            .fallback(route_not_found)
            .layer(middleware::from_fn(request_timing_middleware))
    }

    async fn send(router: Router, method: &str, uri: &str) -> Response {
        router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_welcome_page() {
        let response = send(app(false), "GET", "/hello/ann").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "<h1>Welcome, ann!</h1>");
    }

    #[tokio::test]
    async fn test_echo_returns_json() {
        let response = send(app(true), "POST", "/echo/42?page=3").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let document: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(document["action"], "show");
        assert_eq!(document["method"], "POST");
        assert_eq!(document["params"]["id"], "42");
        assert_eq!(document["query"]["page"], "3");
    }

    #[tokio::test]
    async fn test_stub_answers_without_controller() {
        let response = send(app(false), "GET", "/books/9").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "stub: /books/{id} -> not ready");
    }

    #[tokio::test]
    async fn test_unresolvable_controller_is_500() {
        let response = send(app(false), "GET", "/broken").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Module not found: missing");
    }

    #[tokio::test]
    async fn test_debug_panel_on_html() {
        let response = send(app(true), "GET", "/").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.starts_with("<h1>Welcome, stranger!</h1><div id=\"switchyard-debug-panel\""));
        assert!(body.contains("<td>welcome</td><td>:</td><td>Welcome</td>"));
        assert!(body.contains("&quot;debug&quot;: true"));
    }

    #[tokio::test]
    async fn test_wrong_method_and_unknown_path() {
        let response = send(app(false), "GET", "/echo/1").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = send(app(false), "GET", "/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "route not found");
    }
}
