//! Execution strategies: how a controller is built and run for one request.
//!
//! Both strategies split the work the same way. `execute` produces a
//! [`HandlerOutcome`], which is either the controller's result or the
//! error raised while resolving, constructing or running it. `render` then
//! turns that outcome into a [`DispatchResult`]. Failures never escape a
//! strategy; they become 500 responses.
//!
//! * [`ExecutionStrategy::Plain`] returns results untouched and answers
//!   failures with the error message alone.
//! * [`ExecutionStrategy::Instrumented`] times each step in a
//!   request-scoped [`BenchmarkRecord`] and decorates HTML responses with a
//!   diagnostic panel.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use serde_json::{Value, json};

use crate::{
    core::{
        debug_panel::{self, PanelContext},
        request::DispatchRequest,
        response::{DispatchResult, ResponseBody},
    },
    ports::{
        controller::{ControllerFactory, HandlerError, HandlerResult},
        module_resolver::ModuleResolver,
        settings::SettingsProvider,
    },
};

/// Result of running a controller, before formatting.
#[derive(Debug)]
pub enum HandlerOutcome {
    Completed(DispatchResult),
    Failed(HandlerError),
}

impl From<HandlerResult<DispatchResult>> for HandlerOutcome {
    fn from(result: HandlerResult<DispatchResult>) -> Self {
        match result {
            Ok(result) => HandlerOutcome::Completed(result),
            Err(error) => HandlerOutcome::Failed(error),
        }
    }
}

/// One timing marker.
#[derive(Debug, Clone)]
pub struct BenchmarkEntry {
    pub label: String,
    /// Time since the previous marker; zero for the first.
    pub delta: Duration,
}

/// Timing markers collected during a single instrumented dispatch.
#[derive(Debug, Default, Clone)]
pub struct BenchmarkRecord {
    entries: Vec<BenchmarkEntry>,
    last: Option<Instant>,
}

impl BenchmarkRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, label: &str) {
        let now = Instant::now();
        let delta = self.last.map_or(Duration::ZERO, |last| now - last);
        self.entries.push(BenchmarkEntry {
            label: label.to_string(),
            delta,
        });
        self.last = Some(now);
    }

    pub fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }

    /// `[{"label": .., "ms": ..}, ..]`
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|entry| json!({ "label": entry.label, "ms": entry.delta.as_secs_f64() * 1000.0 }))
                .collect(),
        )
    }
}

/// Sources the instrumented strategy reads when building the debug panel.
#[derive(Clone)]
pub struct Instrumentation {
    resolver: Arc<dyn ModuleResolver>,
    settings: Arc<dyn SettingsProvider>,
}

impl Instrumentation {
    pub fn new(resolver: Arc<dyn ModuleResolver>, settings: Arc<dyn SettingsProvider>) -> Self {
        Self { resolver, settings }
    }
}

/// Strategy used to run the controller bound to a route.
#[derive(Clone)]
pub enum ExecutionStrategy {
    Plain,
    Instrumented(Instrumentation),
}

impl ExecutionStrategy {
    pub fn is_instrumented(&self) -> bool {
        matches!(self, ExecutionStrategy::Instrumented(_))
    }

    /// Build and run a controller, then format the outcome.
    ///
    /// `resolved` is the factory lookup done by the caller; a lookup failure
    /// goes through the same formatting as a failing controller.
    pub async fn run(
        &self,
        resolved: HandlerResult<Arc<dyn ControllerFactory>>,
        request: DispatchRequest,
    ) -> DispatchResult {
        match self {
            ExecutionStrategy::Plain => {
                let (outcome, captured) = execute(resolved, request, None).await;
                render_plain(outcome, captured)
            }
            ExecutionStrategy::Instrumented(instrumentation) => {
                let mut benchmark = BenchmarkRecord::new();
                let (outcome, captured) =
                    execute(resolved, request.clone(), Some(&mut benchmark)).await;
                render_instrumented(instrumentation, outcome, captured, &request, &benchmark)
                    .await
            }
        }
    }
}

async fn execute(
    resolved: HandlerResult<Arc<dyn ControllerFactory>>,
    request: DispatchRequest,
    mut benchmark: Option<&mut BenchmarkRecord>,
) -> (HandlerOutcome, Option<HandlerError>) {
    if let Some(benchmark) = benchmark.as_deref_mut() {
        benchmark.mark("start");
    }

    let factory = match resolved {
        Ok(factory) => factory,
        Err(error) => return (HandlerOutcome::Failed(error), None),
    };

    let mut controller = match factory.construct(request) {
        Ok(controller) => controller,
        Err(error) => return (HandlerOutcome::Failed(error), None),
    };
    if let Some(benchmark) = benchmark.as_deref_mut() {
        benchmark.mark("init controller");
    }

    let result = controller.execute().await;
    if let Some(benchmark) = benchmark.as_deref_mut() {
        benchmark.mark("exec controller");
    }

    (result.into(), controller.take_error())
}

fn render_plain(outcome: HandlerOutcome, captured: Option<HandlerError>) -> DispatchResult {
    if let Some(error) = &captured {
        tracing::error!(error = %error, "Controller reported an error");
    }

    match outcome {
        HandlerOutcome::Completed(result) => result,
        HandlerOutcome::Failed(error) => {
            tracing::error!(error = %error, "Controller failed");
            DispatchResult::failure(&error)
        }
    }
}

async fn render_instrumented(
    instrumentation: &Instrumentation,
    outcome: HandlerOutcome,
    captured: Option<HandlerError>,
    request: &DispatchRequest,
    benchmark: &BenchmarkRecord,
) -> DispatchResult {
    let (mut result, error) = match outcome {
        HandlerOutcome::Completed(result) => (result, captured),
        HandlerOutcome::Failed(error) => (DispatchResult::failure(&error), Some(error)),
    };

    let timings = benchmark.to_json();
    tracing::info!("{} :::: {}", request.url, timings);

    result.ensure_content_type();

    if let Some(error) = &error {
        tracing::error!("{}", debug_panel::error_trace(error));
    }

    // No panel outside HTML.
    if !result.is_html() {
        if result.is_machine_readable() {
            let body = std::mem::take(&mut result.body);
            result.body = ResponseBody::Text(body.into_text());
        }
        return result;
    }

    let modules = instrumentation.resolver.loaded_modules().await;
    let panel = debug_panel::render(&PanelContext {
        error: error.as_ref(),
        timings: &timings,
        modules: &modules,
        views: &instrumentation.resolver.views(),
        config: &instrumentation.settings.snapshot(),
        controller: request.param("controller").unwrap_or_default(),
        action: request.action(),
        session: &request.session,
    });

    let body = std::mem::take(&mut result.body);
    result.body = ResponseBody::Text(body.into_text() + &panel);
    result
}
