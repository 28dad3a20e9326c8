use crate::{
    config::models::AppConfig,
    core::route_table::{RouteResult, RouteTable},
};

/// Declare every route and stub of `config` on `table`, routes first.
pub fn declare_routes(config: &AppConfig, table: &mut RouteTable) -> RouteResult<()> {
    for route in &config.routes {
        table.add_with(
            route.path.clone(),
            route.controller.clone(),
            route.action.clone(),
            route.method,
            route.weight,
        )?;
    }

    for stub in &config.stubs {
        table.stub_with(stub.path.clone(), stub.message.clone(), stub.method, stub.weight)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::{Binding, Method};

    #[test]
    fn test_declare_routes_resolves_by_weight() {
        let config = AppConfig::builder()
            .listen_addr("127.0.0.1:3000")
            .route("/", "welcome", "index", Method::Get, 5)
            .route("/", "echo", "index", Method::Get, 9)
            .stub("/soon", "coming soon", Method::Get)
            .build()
            .unwrap();

        let mut table = RouteTable::new();
        declare_routes(&config, &mut table).unwrap();

        assert_eq!(table.len(), 2);
        let Some(Binding::Route(route)) = table.get("/", Method::Get) else {
            panic!("expected a route binding");
        };
        assert_eq!(route.controller.name(), "echo");
    }
}
