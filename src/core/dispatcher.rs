//! Dispatch pipeline.
//!
//! [`DispatchPipeline::finalize`] walks a [`RouteTable`] once, registering a
//! callback per binding with the server through a [`RouteAdapter`], and
//! freezes the table. At request time each callback:
//! 1. flushes the resolver cache,
//! 2. injects `controller` and `action` into the request parameters,
//! 3. picks the execution strategy from the debug flag,
//! 4. resolves the controller and runs it through the strategy,
//! 5. writes the normalized result through the adapter.
//!
//! Stubs skip all of this and answer with their fixed message.
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    core::{
        binding::{Binding, ControllerRef, RouteBinding, RouteKey},
        execution::{ExecutionStrategy, Instrumentation},
        request::DispatchRequest,
        response::DispatchResult,
        route_table::{RouteError, RouteResult, RouteTable},
    },
    ports::{
        module_resolver::ModuleResolver,
        route_adapter::{AdapterError, RouteAdapter, RouteCallback},
        settings::SettingsProvider,
    },
};

/// Outcome of registering a table with a server.
///
/// Registration is best-effort: an entry the adapter rejects is recorded in
/// `failures` and the walk continues with the next one.
#[derive(Debug, Default)]
pub struct FinalizeReport {
    pub registered: Vec<RouteKey>,
    pub failures: Vec<(RouteKey, AdapterError)>,
}

impl FinalizeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs matched requests against their bindings. Cheap to clone.
#[derive(Clone)]
pub struct DispatchPipeline {
    resolver: Arc<dyn ModuleResolver>,
    settings: Arc<dyn SettingsProvider>,
}

impl DispatchPipeline {
    pub fn new(resolver: Arc<dyn ModuleResolver>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self { resolver, settings }
    }

    /// Register every binding of `table` on `server` and freeze the table.
    ///
    /// Fails with [`RouteError::AlreadyFinalized`] if the table was already
    /// finalized. Adapter failures do not abort the walk; they are returned
    /// in the report.
    pub fn finalize<A: RouteAdapter>(
        &self,
        table: &mut RouteTable,
        server: &mut A::Server,
        adapter: Arc<A>,
    ) -> RouteResult<FinalizeReport> {
        if table.is_finalized() {
            return Err(RouteError::AlreadyFinalized);
        }

        let mut report = FinalizeReport::default();
        for (key, binding) in table.iter() {
            let callback = self.callback_for(binding.clone(), adapter.clone());
            match adapter.add_route(server, binding, callback) {
                Ok(()) => {
                    tracing::debug!("Registered {} {}", binding.kind(), key);
                    report.registered.push(key.clone());
                }
                Err(e) => {
                    tracing::error!("Failed to register route {}: {}", key, e);
                    report.failures.push((key.clone(), e));
                }
            }
        }

        table.mark_finalized();
        tracing::info!(
            "Route table finalized: {} registered, {} failed",
            report.registered.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Strategy for the next request, chosen from the current debug flag.
    pub fn strategy(&self) -> ExecutionStrategy {
        if self.settings.debug_enabled() {
            ExecutionStrategy::Instrumented(Instrumentation::new(
                self.resolver.clone(),
                self.settings.clone(),
            ))
        } else {
            ExecutionStrategy::Plain
        }
    }

    /// Produce the response for one request matched to `binding`.
    pub async fn dispatch(&self, binding: &Binding, request: DispatchRequest) -> DispatchResult {
        let mut result = match binding {
            Binding::Stub(stub) => DispatchResult::ok(stub.body()),
            Binding::Route(route) => self.dispatch_route(route, request).await,
        };
        result.ensure_content_type();
        result
    }

    async fn dispatch_route(&self, route: &RouteBinding, mut request: DispatchRequest) -> DispatchResult {
        let request_id = request
            .request_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = tracing::info_span!(
            "dispatch",
            request.id = %request_id,
            http.method = %route.method,
            http.path = %request.path,
            controller = route.controller.name(),
            action = %route.action,
        );

        async move {
            self.resolver.flush_cache().await;

            request
                .params
                .insert("action".to_string(), route.action.clone());
            request
                .params
                .insert("controller".to_string(), route.controller.name().to_string());

            let strategy = self.strategy();
            let resolved = match &route.controller {
                ControllerRef::Named(name) => self.resolver.resolve(name).await,
                ControllerRef::Direct(factory) => Ok(factory.clone()),
            };

            strategy.run(resolved, request).await
        }
        .instrument(span)
        .await
    }

    fn callback_for<A: RouteAdapter>(
        &self,
        binding: Binding,
        adapter: Arc<A>,
    ) -> RouteCallback<A::Reply> {
        let pipeline = self.clone();
        let binding = Arc::new(binding);

        Arc::new(move |request: DispatchRequest, mut reply: A::Reply| {
            let pipeline = pipeline.clone();
            let binding = binding.clone();
            let adapter = adapter.clone();
            async move {
                let result = pipeline.dispatch(&binding, request).await;
                adapter.write_response(result, &mut reply);
                reply
            }
            .boxed()
        })
    }
}
