use std::{path::Path, sync::Arc};

use axum::{Router, middleware};
use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use switchyard::{
    adapters::{
        AxumRouteAdapter, ModuleRegistry, SharedSettings, request_id_middleware,
        request_timing_middleware, route_not_found,
    },
    builtin::register_builtins,
    config::{AppConfig, AppConfigValidator, declare_routes, load_config},
    core::{Binding, DispatchPipeline, RouteTable},
    tracing_setup,
};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Print the route table in registration order
    Routes {
        /// Configuration file to read routes from
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Start the server (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Some(Commands::Validate { config }) => validate_config_command(&config).await,
        Some(Commands::Init { config }) => init_config_command(&config).await,
        Some(Commands::Routes { config }) => routes_command(&config).await,
        Some(Commands::Serve { config }) => serve(&config).await,
        None => serve(&args.config).await,
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let config = load_config(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    tracing_setup::init_from_config(&config.logging)
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    AppConfigValidator::validate(&config).context("Configuration is invalid")?;
    tracing::info!("Loaded configuration from {config_path}");

    run_server(Arc::new(config))
        .instrument(tracing_setup::configure_component_tracing("server"))
        .await
}

async fn run_server(config: Arc<AppConfig>) -> Result<()> {
    let registry = register_builtins(ModuleRegistry::builder())
        .cache_enabled(config.system.cache_modules)
        .build();
    let settings = SharedSettings::new(config.clone());
    let pipeline = DispatchPipeline::new(Arc::new(registry), Arc::new(settings));

    let mut table = RouteTable::new().with_verbose(config.system.debug);
    declare_routes(&config, &mut table).context("Failed to declare routes")?;

    let mut router = Router::new();
    let report = pipeline
        .finalize(&mut table, &mut router, Arc::new(AxumRouteAdapter::new()))
        .context("Failed to finalize route table")?;
    for (key, error) in &report.failures {
        tracing::error!("Route {} was not registered: {}", key, error);
    }

    let app = router
        .fallback(route_not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(request_timing_middleware))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;

    tracing::info!(
        "Switchyard listening on {} with {} routes (debug: {})",
        config.listen_addr,
        report.registered.len(),
        config.system.debug
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Switchyard shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
    }
}

/// Validate configuration file
async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match AppConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!("   • Routes: {}", config.routes.len());
            println!("   • Stubs: {}", config.stubs.len());
            println!("   • Debug Panel: {}", config.system.debug);
            println!("   • Module Cache: {}", config.system.cache_modules);
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            println!();
            println!("💡 Common fixes:");
            println!("   • Write path parameters as '{{id}}', not ':id'");
            println!("   • Give one of two routes on the same path and method a higher weight");
            println!("   • Verify listen address format (e.g., '127.0.0.1:3000')");
            std::process::exit(1);
        }
    }
}

/// Print every binding in the order it would be registered
async fn routes_command(config_path: &str) -> Result<()> {
    let config: AppConfig = load_config(config_path)
        .await
        .with_context(|| format!("Failed to load config from {config_path}"))?;

    let mut table = RouteTable::new();
    declare_routes(&config, &mut table).context("Failed to declare routes")?;

    println!("📋 {} bindings from {config_path}:", table.len());
    for (key, binding) in table.iter() {
        let target = match binding {
            Binding::Route(route) => format!("{} : {}", route.controller.name(), route.action),
            Binding::Stub(stub) => format!("\"{}\"", stub.message),
        };
        println!(
            "   • {:<24} {:<10} weight {:<3} {}",
            key.to_string(),
            binding.kind(),
            binding.weight(),
            target
        );
    }
    Ok(())
}

/// Initialize a new configuration file
async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# Switchyard Configuration

# The address to listen on
listen_addr = "127.0.0.1:8080"

[system]
# Append the debug panel to HTML responses
debug = false
# Keep resolved controllers between requests
cache_modules = true

[logging]
level = "info"
json = false
# Include span context in JSON lines
spans = false

# Built-in greeting page
[[routes]]
path = "/"
controller = "welcome"

[[routes]]
path = "/hello/{name}"
controller = "welcome"

# Echo the request back as JSON
[[routes]]
path = "/echo/{id}"
controller = "echo"
action = "show"
method = "GET"
weight = 5

# Placeholder answered with a fixed message
[[stubs]]
path = "/books/{id}"
message = "book details are not ready yet"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'switchyard serve --config {config_path}' to start the server");
    Ok(())
}
