//! Minimal HTTP request dispatcher with cooperative middleware chains.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::ServerConfig;
pub use http::{HttpServer, ResponseWriter};
pub use lifecycle::Shutdown;
pub use routing::{handler, Context, DispatchError, Group, HandlerFunc, Router};
