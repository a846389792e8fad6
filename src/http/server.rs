//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app that forwards every request to the dispatcher
//! - Wire up middleware (tracing, timeout, request ID, panic recovery)
//! - Buffer request bodies within the configured limit
//! - Bind the listener and serve until shutdown
//! - Record dispatch metrics

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::ResponseWriter;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::Router as ChainRouter;

/// Error type for serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener or connection handling failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ChainRouter>,
    pub max_body_bytes: usize,
}

/// HTTP server hosting a frozen [`ChainRouter`].
pub struct HttpServer {
    app: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and routes.
    pub fn new(config: ServerConfig, router: ChainRouter) -> Self {
        let state = AppState {
            router: Arc::new(router),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(state)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum app, for in-process use (e.g. `tower::ServiceExt::oneshot`).
    pub fn app(&self) -> Router {
        self.app.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server on `listener` until a message arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured address and run until Ctrl+C / SIGTERM.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr = self.config.listener.bind_address.clone();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        tokio::spawn(async move {
            signals::wait_for_shutdown().await;
            shutdown.trigger();
        });

        self.run(listener, receiver).await
    }
}

/// Buffers the body and hands the request to the handler chain router.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let req_id = request_id(&request).to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %req_id, path = %path, error = %e, "Failed to buffer request body");
            metrics::record_dispatch(method.as_str(), StatusCode::PAYLOAD_TOO_LARGE.as_u16(), start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let mut writer = ResponseWriter::new();
    if let Err(e) = state.router.dispatch(Request::from_parts(parts, body), &mut writer) {
        tracing::debug!(request_id = %req_id, error = %e, "Dispatch miss");
    }

    metrics::record_dispatch(method.as_str(), writer.status().as_u16(), start_time);
    writer.into_response()
}
