//! Route registration and dispatch.
//!
//! # Responsibilities
//! - Accumulate middleware and path prefixes for nested groups
//! - Resolve each registration into one handler chain in the route table
//! - Dispatch inbound requests to the matching chain
//!
//! # Design Decisions
//! - A group works on its own `Scope` value derived from the parent's; the
//!   parent scope is never mutated, so nothing has to be restored on exit
//! - Chains are resolved at registration: outer middleware, then group
//!   middleware, then route handlers
//! - `run` consumes the router, so routes cannot change while serving

use axum::{
    body::Bytes,
    http::{header, HeaderValue, Method, Request},
};
use percent_encoding::percent_decode_str;

use crate::config::ServerConfig;
use crate::http::response::ResponseWriter;
use crate::http::server::{HttpServer, ServerError};
use crate::routing::chain::{combine, HandlerFunc};
use crate::routing::context::Context;
use crate::routing::error::DispatchError;
use crate::routing::path;
use crate::routing::table::{Route, RouteKey, RouteTable};

/// Registration context: path prefix plus middleware visible at one nesting level.
#[derive(Clone)]
struct Scope {
    base_path: String,
    handlers: Vec<HandlerFunc>,
}

impl Scope {
    fn root() -> Self {
        Self {
            base_path: "/".to_string(),
            handlers: Vec::new(),
        }
    }

    fn nest(&self, sub_path: &str, handlers: Vec<HandlerFunc>) -> Self {
        Self {
            base_path: path::join(&self.base_path, sub_path),
            handlers: combine(&self.handlers, &handlers),
        }
    }

    fn register(
        &self,
        table: &mut RouteTable,
        method: Method,
        sub_path: &str,
        handlers: impl IntoIterator<Item = HandlerFunc>,
    ) {
        let full_path = path::join(&self.base_path, sub_path);
        let handlers: Vec<HandlerFunc> = handlers.into_iter().collect();
        table.insert(method, full_path, combine(&self.handlers, &handlers));
    }
}

/// Top-level router: registration API and dispatch entry point.
pub struct Router {
    table: RouteTable,
    scope: Scope,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            scope: Scope::root(),
        }
    }

    /// Add middleware for every route registered after this call.
    pub fn use_(&mut self, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.scope.handlers.extend(handlers);
    }

    /// Register routes under `sub_path`, with `handlers` running after the
    /// router's middleware and before each route's own handlers.
    pub fn group<F>(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>, build: F)
    where
        F: FnOnce(&mut Group<'_>),
    {
        let mut group = Group {
            table: &mut self.table,
            scope: self.scope.nest(sub_path, handlers.into_iter().collect()),
        };
        build(&mut group);
    }

    pub fn get(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.handle(Method::GET, sub_path, handlers);
    }

    pub fn post(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.handle(Method::POST, sub_path, handlers);
    }

    /// Register a route for any method.
    pub fn handle(&mut self, method: Method, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.scope.register(&mut self.table, method, sub_path, handlers);
    }

    /// Look up a registered route.
    pub fn route(&self, method: &Method, path: &str) -> Option<&Route> {
        self.table.get(method, path)
    }

    /// Registered route keys, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteKey> {
        self.table.keys()
    }

    /// Resolve `request` to a route and run its chain against `writer`.
    ///
    /// On a miss the 404 response is written before the error is returned.
    /// On a hit nothing is written here; the chain owns the response.
    /// The request path is percent-decoded before lookup; a path that does
    /// not decode to UTF-8 matches nothing.
    pub fn dispatch(&self, request: Request<Bytes>, writer: &mut ResponseWriter) -> Result<(), DispatchError> {
        let decoded = percent_decode_str(request.uri().path())
            .decode_utf8()
            .ok()
            .map(|path| path.into_owned());
        let route = decoded
            .as_deref()
            .and_then(|path| self.table.get(request.method(), path));

        let Some(route) = route else {
            let err = DispatchError::RouteNotFound {
                method: request.method().clone(),
                path: decoded.unwrap_or_else(|| request.uri().path().to_string()),
            };
            writer
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
            writer.write_header(err.status_code());
            writer.write(err.body());
            return Err(err);
        };

        let mut ctx = Context::new(request, writer, route.handlers());
        ctx.next();
        Ok(())
    }

    /// Serve this router on `addr` until the listener fails or a shutdown
    /// signal arrives.
    pub async fn run(self, addr: &str) -> Result<(), ServerError> {
        let mut config = ServerConfig::default();
        config.listener.bind_address = addr.to_string();
        HttpServer::new(config, self).serve().await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("middleware", &self.scope.handlers.len())
            .finish()
    }
}

/// Registrar handed to a group's build closure.
///
/// Everything registered through it is prefixed with the group path and runs
/// the group's middleware first.
pub struct Group<'r> {
    table: &'r mut RouteTable,
    scope: Scope,
}

impl Group<'_> {
    /// Add middleware for routes registered later in this group.
    pub fn use_(&mut self, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.scope.handlers.extend(handlers);
    }

    /// Nest a group inside this one.
    pub fn group<F>(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>, build: F)
    where
        F: FnOnce(&mut Group<'_>),
    {
        let mut group = Group {
            table: &mut *self.table,
            scope: self.scope.nest(sub_path, handlers.into_iter().collect()),
        };
        build(&mut group);
    }

    pub fn get(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.handle(Method::GET, sub_path, handlers);
    }

    pub fn post(&mut self, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.handle(Method::POST, sub_path, handlers);
    }

    pub fn handle(&mut self, method: Method, sub_path: &str, handlers: impl IntoIterator<Item = HandlerFunc>) {
        self.scope.register(self.table, method, sub_path, handlers);
    }

    /// Full path prefix of this group.
    pub fn base_path(&self) -> &str {
        &self.scope.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::chain::handler;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn request(method: Method, path: &str) -> Request<Bytes> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    fn serve(router: &Router, method: Method, path: &str) -> (Result<(), DispatchError>, ResponseWriter) {
        let mut writer = ResponseWriter::new();
        let result = router.dispatch(request(method, path), &mut writer);
        (result, writer)
    }

    fn flag(flag: &Arc<AtomicBool>) -> HandlerFunc {
        let flag = flag.clone();
        handler(move |c| {
            flag.store(true, Ordering::SeqCst);
            c.next();
        })
    }

    fn mark(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> HandlerFunc {
        let log = log.clone();
        handler(move |c| {
            log.lock().unwrap().push(name);
            c.next();
        })
    }

    #[test]
    fn test_router_get() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.get("/test", [flag(&routed)]);

        let (result, _) = serve(&router, Method::GET, "/test");
        assert!(result.is_ok());
        assert!(routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_router_post() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.post("/test", [flag(&routed)]);

        serve(&router, Method::POST, "/test").0.unwrap();
        assert!(routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_chain_runs_in_registration_order() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.get("/test", [mark(&log, "first"), mark(&log, "second"), mark(&log, "third")]);

        serve(&router, Method::GET, "/test").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_router_group() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.group("api", [], |g| {
            g.get("test", [flag(&routed)]);
        });

        serve(&router, Method::GET, "/api/test").0.unwrap();
        assert!(routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_use_runs_before_group_route() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.use_([mark(&log, "mw")]);
        router.group("/api", [], |g| {
            g.get("/test", [mark(&log, "handler")]);
        });

        serve(&router, Method::GET, "/api/test").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["mw", "handler"]);
    }

    #[test]
    fn test_nested_groups_join_paths() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.group("/a", [mark(&log, "a")], |a| {
            a.group("/b", [mark(&log, "b")], |b| {
                assert_eq!(b.base_path(), "/a/b");
                b.get("/c", [mark(&log, "c")]);
            });
        });

        assert!(router.route(&Method::GET, "/a/b/c").is_some());
        serve(&router, Method::GET, "/a/b/c").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sibling_groups_do_not_leak() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.group("/a", [mark(&log, "a-mw")], |g| {
            g.use_([mark(&log, "a-use")]);
            g.get("/x", [mark(&log, "a-x")]);
        });
        router.group("/b", [mark(&log, "b-mw")], |g| {
            g.get("/x", [mark(&log, "b-x")]);
        });
        router.get("/root", [mark(&log, "root")]);

        serve(&router, Method::GET, "/b/x").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b-mw", "b-x"]);

        log.lock().unwrap().clear();
        serve(&router, Method::GET, "/root").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["root"]);

        assert!(router.route(&Method::GET, "/x").is_none());
        assert!(router.route(&Method::GET, "/a/b/x").is_none());
    }

    #[test]
    fn test_use_after_group_does_not_apply_to_it() {
        let mut router = Router::new();
        let late = Arc::new(AtomicBool::new(false));
        router.group("/api", [], |g| {
            g.get("/early", [handler(|_| {})]);
        });
        router.use_([flag(&late)]);

        serve(&router, Method::GET, "/api/early").0.unwrap();
        assert!(!late.load(Ordering::SeqCst));
        assert_eq!(router.route(&Method::GET, "/api/early").unwrap().handlers().len(), 1);
    }

    #[test]
    fn test_not_found() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.post("/test", [flag(&routed)]);

        let (result, writer) = serve(&router, Method::POST, "/test1");
        assert_eq!(
            result,
            Err(DispatchError::RouteNotFound {
                method: Method::POST,
                path: "/test1".to_string(),
            })
        );
        assert_eq!(writer.status(), StatusCode::NOT_FOUND);
        assert_eq!(writer.body(), b"not found page");
        assert!(!routed.load(Ordering::SeqCst));
    }

    // Routes are keyed by (path, method): a wrong method is a 404, not a 501.
    #[test]
    fn test_wrong_method_is_not_found() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.post("/test", [flag(&routed)]);

        let (result, writer) = serve(&router, Method::GET, "/test");
        assert!(result.is_err());
        assert_eq!(writer.status(), StatusCode::NOT_FOUND);
        assert!(!routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_percent_encoded_path_matches_decoded_route() {
        let mut router = Router::new();
        let spaced = Arc::new(AtomicBool::new(false));
        let accented = Arc::new(AtomicBool::new(false));
        router.get("/hello world", [flag(&spaced)]);
        router.get("/café", [flag(&accented)]);

        serve(&router, Method::GET, "/hello%20world").0.unwrap();
        serve(&router, Method::GET, "/caf%C3%A9").0.unwrap();
        assert!(spaced.load(Ordering::SeqCst));
        assert!(accented.load(Ordering::SeqCst));
    }

    #[test]
    fn test_not_found_reports_decoded_path() {
        let router = Router::new();
        let (result, _) = serve(&router, Method::GET, "/missing%20page");
        assert_eq!(
            result,
            Err(DispatchError::RouteNotFound {
                method: Method::GET,
                path: "/missing page".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_utf8_path_is_not_found() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.get("/x", [flag(&routed)]);

        let (result, writer) = serve(&router, Method::GET, "/%FF");
        assert_eq!(
            result,
            Err(DispatchError::RouteNotFound {
                method: Method::GET,
                path: "/%FF".to_string(),
            })
        );
        assert_eq!(writer.status(), StatusCode::NOT_FOUND);
        assert!(!routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_same_path_different_methods_coexist() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.group("/api", [], |g| {
            g.get("/test", [mark(&log, "get")]);
            g.post("/test", [mark(&log, "post")]);
        });

        serve(&router, Method::GET, "/api/test").0.unwrap();
        serve(&router, Method::POST, "/api/test").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["get", "post"]);
        assert_eq!(router.routes().count(), 2);
    }

    #[test]
    fn test_reregistration_replaces_route() {
        let mut router = Router::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        router.get("/test", [mark(&log, "old")]);
        router.get("/test", [mark(&log, "new")]);

        serve(&router, Method::GET, "/test").0.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["new"]);
    }

    #[test]
    fn test_short_circuit_skips_downstream() {
        let mut router = Router::new();
        let downstream = Arc::new(AtomicBool::new(false));
        router.use_([handler(|c| {
            c.writer.write_header(StatusCode::UNAUTHORIZED);
        })]);
        router.group("/api", [flag(&downstream)], |g| {
            g.get("/test", [flag(&downstream)]);
        });

        let (result, writer) = serve(&router, Method::GET, "/api/test");
        assert!(result.is_ok());
        assert_eq!(writer.status(), StatusCode::UNAUTHORIZED);
        assert!(!downstream.load(Ordering::SeqCst));
    }

    #[test]
    fn test_empty_chain_completes() {
        let mut router = Router::new();
        router.get("/empty", []);

        let (result, writer) = serve(&router, Method::GET, "/empty");
        assert!(result.is_ok());
        assert!(!writer.is_written());
    }

    #[test]
    fn test_custom_method() {
        let mut router = Router::new();
        let routed = Arc::new(AtomicBool::new(false));
        router.handle(Method::DELETE, "/items", [flag(&routed)]);

        serve(&router, Method::DELETE, "/items").0.unwrap();
        assert!(routed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_concurrent_dispatch_shares_chain() {
        let mut router = Router::new();
        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        router.get("/count", [handler(move |c| {
            counter.fetch_add(1, Ordering::SeqCst);
            c.writer.write("ok");
        })]);
        let router = Arc::new(router);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let router = router.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let (result, writer) = serve(&router, Method::GET, "/count");
                        assert!(result.is_ok());
                        assert_eq!(writer.body(), b"ok");
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(hits.load(Ordering::SeqCst), 400);
    }
}
