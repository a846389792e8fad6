//! chain-router demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum/tower-http ──▶ Router::dispatch ──▶ (path, method) lookup
//!                      (trace, timeout,                          │
//!                       request id,                     miss ────┴──── hit
//!                       catch panic)                     │              │
//!                                                    404 "not       Context::next()
//!                                                    found page"    mw → mw → handler
//!     Client Response                                                   │
//!     ◀────────────── ResponseWriter ◀──────────────────────────────────┘
//! ```

use std::path::PathBuf;

use axum::http::{header, HeaderValue, StatusCode};
use clap::Parser;

use chain_router::config::{load_config, validate_config, ConfigError, ServerConfig};
use chain_router::middleware::{bearer_auth, logger};
use chain_router::observability::{logging, metrics};
use chain_router::{handler, HttpServer, Router};

#[derive(Parser)]
#[command(name = "chain-router")]
#[command(about = "Minimal HTTP dispatcher with middleware chains", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration file.
    #[arg(short, long)]
    bind: Option<String>,

    /// Token accepted by the /api/admin routes.
    #[arg(long, default_value = "change-me")]
    admin_token: String,
}

fn build_routes(admin_token: &str) -> Router {
    let mut router = Router::new();
    router.use_([logger()]);

    router.get(
        "/ping",
        [handler(|c| {
            c.writer.write("pong");
        })],
    );

    router.group("/api", [], |api| {
        api.get(
            "/status",
            [handler(|c| {
                let body = serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "status": "operational",
                });
                c.writer
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
                c.writer.write(body.to_string());
            })],
        );

        api.post(
            "/echo",
            [handler(|c| {
                let body = c.request.body().clone();
                c.writer.write(body);
            })],
        );

        api.group("/admin", [bearer_auth(admin_token)], |admin| {
            admin.get(
                "/health",
                [handler(|c| {
                    c.writer.write_header(StatusCode::NO_CONTENT);
                })],
            );
        });
    });

    router
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = build_routes(&cli.admin_token);
    for key in router.routes() {
        tracing::info!(route = %key, "Route ready");
    }

    HttpServer::new(config, router).serve().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
