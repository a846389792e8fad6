//! Outbound response sink handed to handler chains.
//!
//! # Responsibilities
//! - Collect status, headers and body bytes written by handlers
//! - Enforce "status is written once" semantics
//! - Convert the collected response into an axum `Response`
//!
//! # Design Decisions
//! - The first status written wins; later `write_header` calls are ignored
//!   and logged, as with any HTTP response writer
//! - Writing body bytes before a status implies `200 OK`
//! - An untouched writer produces `200 OK` with an empty body

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Response sink a handler chain writes into.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response headers. Mutations made after the body is finished still apply,
    /// since nothing is flushed until the chain returns.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Write the status code. Only the first call has an effect.
    pub fn write_header(&mut self, status: StatusCode) {
        if let Some(current) = self.status {
            tracing::warn!(
                current = %current,
                ignored = %status,
                "Superfluous write_header call"
            );
            return;
        }
        self.status = Some(status);
    }

    /// Append body bytes, implicitly writing `200 OK` if no status was set.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(bytes.as_ref());
    }

    /// Status that will be sent (`200 OK` if none was written).
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Whether a handler has written a status or body bytes.
    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(Bytes::from(self.body)));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
