//! Controllers shipped with the binary so a fresh config has something to
//! route to.
//!
//! - `welcome`: an HTML greeting, addressing `{name}` when the path has one.
//! - `echo`: a JSON document echoing the action, path parameters and query.
use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde_json::json;

use crate::{
    adapters::module_registry::ModuleRegistryBuilder,
    core::{debug_panel::escape_html, request::DispatchRequest, response::DispatchResult},
    ports::controller::{Controller, ControllerFactory, HandlerError, HandlerResult},
};

pub const WELCOME: &str = "welcome";
pub const ECHO: &str = "echo";

/// Register the built-in controllers under their well-known names.
pub fn register_builtins(builder: ModuleRegistryBuilder) -> ModuleRegistryBuilder {
    builder
        .register(WELCOME, Arc::new(WelcomeFactory))
        .register(ECHO, Arc::new(EchoFactory))
}

pub struct Welcome {
    request: DispatchRequest,
}

#[async_trait]
impl Controller for Welcome {
    async fn execute(&mut self) -> HandlerResult<DispatchResult> {
        match self.request.action() {
            "index" => {
                let name = self.request.param("name").unwrap_or("stranger");
                Ok(DispatchResult::ok(format!(
                    "<h1>Welcome, {}!</h1>",
                    escape_html(name)
                )))
            }
            other => Err(HandlerError::Execution(format!(
                "Unknown action '{other}' on welcome"
            ))),
        }
    }
}

pub struct WelcomeFactory;

impl ControllerFactory for WelcomeFactory {
    fn name(&self) -> &str {
        "Welcome"
    }

    fn construct(&self, request: DispatchRequest) -> HandlerResult<Box<dyn Controller>> {
        Ok(Box::new(Welcome { request }))
    }
}

pub struct Echo {
    request: DispatchRequest,
}

#[async_trait]
impl Controller for Echo {
    async fn execute(&mut self) -> HandlerResult<DispatchResult> {
        // Sorted so the document is stable across requests.
        let params: BTreeMap<_, _> = self
            .request
            .params
            .iter()
            .filter(|(key, _)| key.as_str() != "action" && key.as_str() != "controller")
            .collect();
        let query: BTreeMap<_, _> = self.request.query.iter().collect();

        let document = json!({
            "action": self.request.action(),
            "method": self.request.method.as_str(),
            "path": self.request.path,
            "params": params,
            "query": query,
        });

        Ok(DispatchResult::ok(document).with_content_type("application/json"))
    }
}

pub struct EchoFactory;

impl ControllerFactory for EchoFactory {
    fn name(&self) -> &str {
        "Echo"
    }

    fn construct(&self, request: DispatchRequest) -> HandlerResult<Box<dyn Controller>> {
        Ok(Box::new(Echo { request }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::core::{binding::Method, response::ResponseBody};

    fn request(url: &str, action: &str) -> DispatchRequest {
        let mut request = DispatchRequest::new(Method::Get, url);
        request
            .params
            .insert("action".to_string(), action.to_string());
        request
    }

    #[tokio::test]
    async fn test_welcome_escapes_name() {
        let mut req = request("/hello", "index");
        req.params
            .insert("name".to_string(), "<b>ann</b>".to_string());

        let mut controller = WelcomeFactory.construct(req).unwrap();
        let result = controller.execute().await.unwrap();
        assert_eq!(
            result.body.as_text(),
            Some("<h1>Welcome, &lt;b&gt;ann&lt;/b&gt;!</h1>")
        );
    }

    #[tokio::test]
    async fn test_welcome_rejects_unknown_action() {
        let mut controller = WelcomeFactory.construct(request("/", "delete")).unwrap();
        let err = controller.execute().await.err().unwrap();
        assert_eq!(err.to_string(), "Unknown action 'delete' on welcome");
    }

    #[tokio::test]
    async fn test_echo_reports_params_and_query() {
        let mut req = request("/echo/7?page=2", "show");
        req.params.insert("id".to_string(), "7".to_string());
        req.params
            .insert("controller".to_string(), "echo".to_string());
        req.query.insert("page".to_string(), "2".to_string());

        let mut controller = EchoFactory.construct(req).unwrap();
        let result = controller.execute().await.unwrap();
        assert_eq!(result.content_type(), Some("application/json"));

        let ResponseBody::Json(document) = result.body else {
            panic!("expected a JSON body");
        };
        assert_eq!(document["action"], "show");
        assert_eq!(document["path"], "/echo/7");
        assert_eq!(document["params"], json!({ "id": "7" }));
        assert_eq!(document["query"]["page"], Value::from("2"));
    }

    #[test]
    fn test_register_builtins() {
        let registry = register_builtins(ModuleRegistryBuilder::default()).build();
        assert_eq!(registry.names(), vec!["echo".to_string(), "welcome".to_string()]);
    }
}
