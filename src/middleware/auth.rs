//! Bearer token check.

use std::sync::Arc;

use axum::http::{header, StatusCode};

use crate::routing::{handler, HandlerFunc};

/// Continue the chain only for requests carrying `Authorization: Bearer <token>`.
///
/// Anything else gets `401 unauthorized` and the chain stops here.
pub fn bearer_auth(token: impl Into<String>) -> HandlerFunc {
    let expected: Arc<str> = format!("Bearer {}", token.into()).into();

    handler(move |c| {
        let authorized = c
            .request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|value| value == &*expected);

        if authorized {
            c.next();
            return;
        }

        tracing::debug!(path = %c.request.uri().path(), "Rejected unauthenticated request");
        c.writer.write_header(StatusCode::UNAUTHORIZED);
        c.writer.write("unauthorized");
    })
}
