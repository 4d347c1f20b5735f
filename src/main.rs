//! htmlnojs gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                   GATEWAY                    │
//!   handler files ─────┼─▶ discovery ──▶ routing ──▶ registry (frozen)│
//!   markup pages  ─────┼─▶                               │            │
//!   style sheets  ─────┼─▶                               ▼            │
//!                      │                        ┌──────────────┐      │
//!   Client Request ────┼───────────────────────▶│ http server  │      │
//!                      │                        └──────┬───────┘      │
//!                      │                   page ◀──────┴──────▶ proxy─┼──▶ Backend
//!   Client Response ◀──┼───────────────────────────────────────────── │    (handlers)
//!                      │                                              │
//!                      │  config · health · observability · lifecycle │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use htmlnojs::config::{self, GatewayConfig};
use htmlnojs::health::check_backend;
use htmlnojs::http::response::RouteListing;
use htmlnojs::http::{BackendClient, HttpServer};
use htmlnojs::lifecycle::{self, Shutdown};
use htmlnojs::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "htmlnojs")]
#[command(about = "HTML-first gateway for handler-backed pages", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root (overrides project.root)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Listen port (overrides the port of listener.bind_address)
    #[arg(short, long)]
    port: Option<u16>,

    /// Backend base URL (overrides backend.base_url)
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level (overrides observability.log_level)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Discover routes and serve them (default)
    Serve,
    /// Discover routes, print the table as JSON and exit
    Routes,
    /// Probe the backend health endpoint once
    CheckBackend,
}

impl Cli {
    fn resolve_config(&self) -> Result<GatewayConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(directory) = &self.directory {
            config.project.root = directory.clone();
        }
        if let Some(port) = self.port {
            config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
                Ok(mut addr) => {
                    addr.set_port(port);
                    addr.to_string()
                }
                Err(_) => format!("127.0.0.1:{}", port),
            };
        }
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }

        config::finalize(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init_logging(&config.observability)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Routes => print_routes(&config),
        Commands::CheckBackend => check(&config).await,
    }
}

async fn serve(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "htmlnojs starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        project_root = %config.project.root.display(),
        backend = %config.backend.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let registry = lifecycle::compile_routes(&config)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, routes = registry.len(), "Listening for connections");

    let shutdown = Shutdown::new();
    lifecycle::shutdown_on_signal(shutdown.clone());

    let server = HttpServer::new(config, registry)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = lifecycle::compile_routes(config)?;
    let listing = RouteListing::from_registry(&registry);
    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

async fn check(config: &GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.backend, &config.timeouts)?;
    let timeout = Duration::from_secs(config.timeouts.health_secs);

    match check_backend(&client, &config.backend.health_path, timeout).await {
        Ok(()) => {
            println!("backend {} is healthy", client.base_url());
            Ok(())
        }
        Err(e) => {
            eprintln!("backend {} is unhealthy: {}", client.base_url(), e);
            Err(e.into())
        }
    }
}
