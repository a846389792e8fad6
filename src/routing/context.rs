//! Per-request execution context.
//!
//! # Responsibilities
//! - Carry the inbound request and the response sink
//! - Hold the matched route's handler chain and the cursor into it
//! - Advance the chain one handler at a time on request
//!
//! # Design Decisions
//! - No implicit looping: a handler that never calls `next()` ends the chain
//! - One cursor per request: calling `next()` twice resumes from the cursor,
//!   it never replays handlers that already ran
//! - `abort()` freezes the cursor so outer handlers cannot resume the chain

use std::fmt;
use std::sync::Arc;

use axum::{body::Bytes, http::Request};

use crate::http::response::ResponseWriter;
use crate::routing::chain::HandlerChain;

/// State for one dispatched request.
pub struct Context<'w> {
    /// The inbound request, body fully buffered.
    pub request: Request<Bytes>,
    /// The outbound response sink.
    pub writer: &'w mut ResponseWriter,
    handlers: HandlerChain,
    /// Number of handlers entered so far; the next handler to run sits here.
    index: usize,
    aborted: bool,
}

impl<'w> Context<'w> {
    /// Create a context positioned before the first handler.
    pub fn new(request: Request<Bytes>, writer: &'w mut ResponseWriter, handlers: HandlerChain) -> Self {
        Self {
            request,
            writer,
            handlers,
            index: 0,
            aborted: false,
        }
    }

    /// Run the next handler in the chain, if there is one.
    ///
    /// Control returns here once that handler (and everything it chose to run
    /// after it) has finished.
    pub fn next(&mut self) {
        if self.aborted {
            return;
        }
        let handlers = Arc::clone(&self.handlers);
        if let Some(handler) = handlers.get(self.index) {
            self.index += 1;
            handler(self);
        }
    }

    /// Stop the chain: no later `next()` call, from any handler, runs anything.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Number of handlers entered so far.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Total number of handlers in the chain.
    pub fn chain_len(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("path", &self.request.uri().path())
            .field("index", &self.index)
            .field("chain_len", &self.handlers.len())
            .field("aborted", &self.aborted)
            .finish()
    }
}
