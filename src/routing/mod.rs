//! Routing subsystem: handler chains and the router that dispatches to them.
//!
//! # Data Flow
//! ```text
//! Registration (at startup):
//!     Router::use_ / group / get / post
//!     → path.rs (join group prefix + route path)
//!     → chain.rs (outer middleware ++ group middleware ++ route handlers)
//!     → table.rs (store under path + method)
//!
//! Request time:
//!     Router::dispatch(request, writer)
//!     → percent-decode path, table.rs (exact (path, method) lookup)
//!     → miss: 404 "not found page"
//!     → hit: context.rs (fresh cursor over the shared chain) → next()
//! ```
//!
//! # Design Decisions
//! - Routes resolved at registration, immutable while serving
//! - No path parameters, wildcards or trailing-slash normalization
//! - Chain execution is a plain synchronous call stack, one frame per handler

pub mod chain;
pub mod context;
pub mod error;
pub mod path;
pub mod router;
pub mod table;

pub use chain::{handler, HandlerChain, HandlerFunc};
pub use context::Context;
pub use error::DispatchError;
pub use router::{Group, Router};
pub use table::{Route, RouteKey, RouteTable};
