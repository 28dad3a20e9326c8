pub mod controller;
pub mod module_resolver;
pub mod route_adapter;
pub mod settings;
