//! Access logging middleware.

use std::time::Instant;

use crate::http::request::request_id;
use crate::routing::{handler, HandlerFunc};

/// Log each request once the rest of the chain has returned.
pub fn logger() -> HandlerFunc {
    handler(|c| {
        let start = Instant::now();
        c.next();

        tracing::info!(
            request_id = %request_id(&c.request),
            method = %c.request.method(),
            path = %c.request.uri().path(),
            status = c.writer.status().as_u16(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Request handled"
        );
    })
}
