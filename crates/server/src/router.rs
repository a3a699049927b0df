//! Route registration and sub-router groups.
//!
//! A [`Router`] is mutable while the service starts up. [`Router::build`]
//! resolves every route to its fully wrapped handler and freezes the result
//! into a [`RouteTable`], which is what actually serves requests.
//!
//! Wrapping order for a grouped route is
//! `global(group(handler))`: router-global middlewares are outermost.

use core::fmt;
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::header::ALLOW;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use thiserror::Error;
use tower::Service;

use crate::handler::{Handler, Request};
use crate::middleware::Pipeline;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("route {method} {path} is already registered")]
    DuplicateRoute { method: Method, path: String },

    #[error("invalid route path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

/// One entry of a sub-router group.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub path: String,
    pub method: Method,
    pub handler: Handler,
}

impl RouteDefinition {
    pub fn new(method: Method, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            path: path.into(),
            method,
            handler,
        }
    }

    pub fn get(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(Method::GET, path, handler)
    }

    pub fn post(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(Method::POST, path, handler)
    }

    pub fn put(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    pub fn delete(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(Method::DELETE, path, handler)
    }
}

#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

#[derive(Debug)]
struct SubRouter {
    prefix: String,
    middlewares: Pipeline,
    routes: Vec<Route>,
}

#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    groups: Vec<SubRouter>,
    registered: HashSet<(Method, String)>,
    middlewares: Pipeline,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a root route, wrapped only by the router-global middlewares.
    pub fn register(
        &mut self,
        method: Method,
        path: impl Into<String>,
        handler: Handler,
    ) -> Result<&mut Self, RouterError> {
        let path = path.into();
        validate_path(&path)?;

        let key = (method.clone(), path.clone());
        if self.registered.contains(&key) {
            return Err(RouterError::DuplicateRoute { method, path });
        }

        self.registered.insert(key);
        self.routes.push(Route {
            method,
            path,
            handler,
        });
        Ok(self)
    }

    pub fn get(&mut self, path: impl Into<String>, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::GET, path, handler)
    }

    pub fn post(&mut self, path: impl Into<String>, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::POST, path, handler)
    }

    pub fn put(&mut self, path: impl Into<String>, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::PUT, path, handler)
    }

    pub fn delete(&mut self, path: impl Into<String>, handler: Handler) -> Result<&mut Self, RouterError> {
        self.register(Method::DELETE, path, handler)
    }

    /// Register `routes` under `prefix`, each wrapped by `middlewares`.
    ///
    /// The whole group is checked before anything is inserted: on error the
    /// router is unchanged.
    pub fn group(
        &mut self,
        prefix: &str,
        routes: impl IntoIterator<Item = RouteDefinition>,
        middlewares: Pipeline,
    ) -> Result<&mut Self, RouterError> {
        validate_path(prefix)?;

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for def in routes {
            validate_path(&def.path)?;
            let path = join(prefix, &def.path);
            let key = (def.method.clone(), path.clone());

            if self.registered.contains(&key) || !seen.insert(key) {
                return Err(RouterError::DuplicateRoute {
                    method: def.method,
                    path,
                });
            }

            resolved.push(Route {
                method: def.method,
                path,
                handler: def.handler,
            });
        }

        self.registered.extend(seen);
        self.groups.push(SubRouter {
            prefix: prefix.to_string(),
            middlewares,
            routes: resolved,
        });
        Ok(self)
    }

    /// Append router-global middlewares. They wrap every route, groups
    /// included, and the not-found fallback.
    pub fn set_middlewares(&mut self, middlewares: Pipeline) -> &mut Self {
        self.middlewares.extend(middlewares);
        self
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Resolve every route to its final handler.
    pub fn build(self) -> RouteTable {
        let global = self.middlewares;
        let mut routes: HashMap<String, HashMap<Method, Handler>> = HashMap::new();

        for route in self.routes {
            routes
                .entry(route.path)
                .or_default()
                .insert(route.method, global.apply(route.handler));
        }

        for group in self.groups {
            tracing::debug!(
                prefix = %group.prefix,
                routes = group.routes.len(),
                middlewares = group.middlewares.len(),
                "mounting route group"
            );
            for route in group.routes {
                let handler = global.apply(group.middlewares.apply(route.handler));
                routes
                    .entry(route.path)
                    .or_default()
                    .insert(route.method, handler);
            }
        }

        let routes = routes
            .into_iter()
            .map(|(path, methods)| {
                let method_not_allowed = global.apply(method_not_allowed(&methods));
                (
                    path,
                    PathRoutes {
                        methods,
                        method_not_allowed,
                    },
                )
            })
            .collect();

        RouteTable {
            inner: Arc::new(Table {
                routes,
                not_found: global.apply(status_handler(StatusCode::NOT_FOUND)),
            }),
        }
    }
}

fn validate_path(path: &str) -> Result<(), RouterError> {
    if !path.starts_with('/') {
        return Err(RouterError::InvalidPath {
            path: path.to_string(),
            reason: "must start with '/'",
        });
    }
    Ok(())
}

fn join(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix.trim_end_matches('/'), path)
}

fn status_handler(status: StatusCode) -> Handler {
    Handler::new(move |_req| async move { status })
}

/// `405` listing the methods registered for the path in `Allow`.
fn method_not_allowed(methods: &HashMap<Method, Handler>) -> Handler {
    let mut allowed: Vec<&str> = methods.keys().map(Method::as_str).collect();
    allowed.sort_unstable();
    let allow = allowed.join(", ");

    Handler::new(move |_req| {
        let allow = allow.clone();
        async move { (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, allow)]) }
    })
}

struct PathRoutes {
    methods: HashMap<Method, Handler>,
    method_not_allowed: Handler,
}

struct Table {
    routes: HashMap<String, PathRoutes>,
    not_found: Handler,
}

/// Immutable, shareable routing table produced by [`Router::build`].
#[derive(Clone)]
pub struct RouteTable {
    inner: Arc<Table>,
}

impl RouteTable {
    /// Route `req` to its handler and turn the outcome into a response.
    ///
    /// A [`Fault`](crate::Fault) that no middleware recovered from is logged
    /// and answered with a bare `500`.
    pub async fn dispatch(&self, req: Request) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let handler = self.lookup(&method, &path).clone();

        match handler.call(req).await {
            Ok(response) => response,
            Err(fault) => {
                let error = format!("{fault:#}");
                tracing::error!(%method, %path, error = %error, "unrecovered handler fault");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    fn lookup(&self, method: &Method, path: &str) -> &Handler {
        match self.inner.routes.get(path) {
            None => &self.inner.not_found,
            Some(path) => path.methods.get(method).unwrap_or(&path.method_not_allowed),
        }
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.inner
            .routes
            .get(path)
            .is_some_and(|path| path.methods.contains_key(method))
    }

    pub fn len(&self) -> usize {
        self.inner.routes.values().map(|path| path.methods.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serve this table as an axum application.
    pub fn into_axum(self) -> axum::Router {
        axum::Router::new().fallback_service(self)
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.len())
            .finish_non_exhaustive()
    }
}

impl Service<Request> for RouteTable {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let table = self.clone();
        Box::pin(async move { Ok(table.dispatch(req).await) })
    }
}
