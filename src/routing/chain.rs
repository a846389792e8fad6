//! Handler functions and the shared chains they form.

use std::sync::Arc;

use crate::routing::context::Context;

/// A unit of work in a handler chain.
///
/// Handlers influence control flow only through the [`Context`]: by writing the
/// response, and by calling [`Context::next`] to pass control onwards.
pub type HandlerFunc = Arc<dyn Fn(&mut Context<'_>) + Send + Sync>;

/// Ordered, immutable handler sequence of one route.
///
/// Shared between every request dispatched to the route.
pub type HandlerChain = Arc<[HandlerFunc]>;

/// Wrap a closure as a [`HandlerFunc`].
pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&mut Context<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Concatenate two handler sequences, outer handlers first.
pub(crate) fn combine(outer: &[HandlerFunc], inner: &[HandlerFunc]) -> Vec<HandlerFunc> {
    let mut combined = Vec::with_capacity(outer.len() + inner.len());
    combined.extend(outer.iter().cloned());
    combined.extend(inner.iter().cloned());
    combined
}
