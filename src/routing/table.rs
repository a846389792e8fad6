//! Route storage and lookup.
//!
//! # Responsibilities
//! - Store routes under a (path, method) key
//! - Look up the route for an inbound method and path
//!
//! # Design Decisions
//! - Path and method form one key: GET and POST on a path are independent
//! - Re-registering an identical key replaces the earlier route, no error
//! - Exact matching only; the dispatcher hands in decoded paths
//! - Read-only once the owning router starts serving

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;

use crate::routing::chain::{HandlerChain, HandlerFunc};

/// Dispatch key of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub path: String,
    pub method: Method,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.path, self.method)
    }
}

/// A registered route: its method and resolved handler chain.
#[derive(Clone)]
pub struct Route {
    method: Method,
    handlers: HandlerChain,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Shared handle to the immutable handler chain.
    pub fn handlers(&self) -> HandlerChain {
        self.handlers.clone()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Mapping from [`RouteKey`] to [`Route`].
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<RouteKey, Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route. An existing route under the same key is replaced.
    pub fn insert(&mut self, method: Method, path: String, handlers: Vec<HandlerFunc>) {
        let key = RouteKey::new(method.clone(), path);
        let route = Route {
            method,
            handlers: handlers.into(),
        };

        tracing::debug!(
            key = %key,
            handlers = route.handlers.len(),
            "Route registered"
        );

        if self.routes.insert(key.clone(), route).is_some() {
            tracing::debug!(key = %key, "Route replaced");
        }
    }

    pub fn get(&self, method: &Method, path: &str) -> Option<&Route> {
        self.routes.get(&RouteKey::new(method.clone(), path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &RouteKey> {
        self.routes.keys()
    }
}
