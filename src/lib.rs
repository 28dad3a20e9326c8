//! Switchyard - a weighted route table and request dispatch pipeline.
//!
//! Switchyard sits between an HTTP server and a set of controllers. Routes
//! and stubs are declared on a [`RouteTable`](core::RouteTable) where
//! duplicate declarations for the same path and method are settled by
//! weight. The table is then finalized onto a server through a
//! [`RouteAdapter`](ports::route_adapter::RouteAdapter), and every matched
//! request runs through the [`DispatchPipeline`](core::DispatchPipeline).
//!
//! # Features
//! - Weighted route and stub declarations with deterministic conflict rules
//! - Controllers resolved by name at request time, or bound directly
//! - Plain and instrumented execution, picked per request from the debug flag
//! - HTML debug panel with timings, loaded modules, config and error traces
//! - axum adapter, TOML/YAML/JSON configuration and structured tracing
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use switchyard::{
//!     AxumRouteAdapter, DispatchPipeline, ModuleRegistry, RouteTable, SharedSettings,
//!     builtin::register_builtins, config::AppConfig,
//! };
//!
//! # fn main() -> eyre::Result<()> {
//! let config = Arc::new(AppConfig::default());
//! let registry = Arc::new(register_builtins(ModuleRegistry::builder()).build());
//! let pipeline = DispatchPipeline::new(registry, Arc::new(SharedSettings::new(config)));
//!
//! let mut table = RouteTable::new();
//! table.add("/", "welcome")?;
//! table.stub("/soon", "coming soon")?;
//!
//! let mut router = axum::Router::new();
//! let report = pipeline.finalize(&mut table, &mut router, Arc::new(AxumRouteAdapter::new()))?;
//! assert!(report.is_complete());
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations) while keeping
//! route resolution and dispatch inside `core`.
//!
//! # Error Handling
//! Library operations return domain error types (`RouteError`, `HandlerError`,
//! `AdapterError`). Configuration loading returns `eyre::Result<T>` with `WrapErr` context.
pub mod builtin;
pub mod config;
pub mod ports;
pub mod tracing_setup;

pub mod adapters;
pub mod core;

pub use crate::{
    adapters::{AxumRouteAdapter, ModuleRegistry, SharedSettings},
    core::{
        Binding, ControllerRef, DispatchPipeline, DispatchRequest, DispatchResult,
        FinalizeReport, Method, RouteError, RouteTable,
    },
    ports::controller::{Controller, ControllerFactory, HandlerError, HandlerResult},
};
