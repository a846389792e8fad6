//! Dispatch error taxonomy.

use axum::http::{Method, StatusCode};

/// Fixed body sent when no route matches.
pub const NOT_FOUND_BODY: &str = "not found page";

/// Reasons a request could not be handed to a handler chain.
///
/// Routes are keyed by path and method together, so a registered path
/// requested with an unregistered method is also `RouteNotFound`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no route for {method} {path}")]
    RouteNotFound { method: Method, path: String },
}

impl DispatchError {
    /// Status code surfaced to the client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// Plain-text body surfaced to the client.
    pub fn body(&self) -> &'static str {
        match self {
            DispatchError::RouteNotFound { .. } => NOT_FOUND_BODY,
        }
    }
}
