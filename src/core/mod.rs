pub mod binding;
pub mod debug_panel;
pub mod dispatcher;
pub mod execution;
pub mod request;
pub mod response;
pub mod route_table;

pub use binding::{Binding, ControllerRef, Method, RouteBinding, RouteKey, StubBinding};
pub use dispatcher::{DispatchPipeline, FinalizeReport};
pub use execution::{BenchmarkRecord, ExecutionStrategy, HandlerOutcome};
pub use request::DispatchRequest;
pub use response::{DispatchResult, ResponseBody};
pub use route_table::{RouteError, RouteTable};
