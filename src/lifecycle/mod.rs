//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve wait_for_shutdown()
//!
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast → server stops accepting → in-flight chains finish
//! ```
//!
//! # Design Decisions
//! - Routes are registered before the server starts; nothing is torn down mid-flight
//! - Graceful: requests already dispatched run their chains to completion

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
