//! Layered request router.
//!
//! A router is an ordered stack of layers. Dispatch walks the stack top to
//! bottom:
//!
//! - **middleware** runs for every request that reaches it and decides
//!   whether to answer or call [`Next::run`];
//! - **routes** match one method and one pattern through a radix tree. A
//!   match calls the handler, a miss falls through to the next layer. Routes
//!   are tried in registration order: an earlier `/:slug` wins over a later
//!   `/new`;
//! - **nested routers** match a path prefix and dispatch the remainder
//!   through their own stack. When that stack is exhausted, dispatch resumes
//!   in the parent after the nested layer.
//!
//! Matching is not strict about one trailing slash (`/posts/7/` is `/posts/7`),
//! and captured parameters are percent-decoded.
//!
//! Falling off the bottom of the root stack yields `404 Not Found`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::method::Method;
use crate::path;
use crate::request::Request;
use crate::response::Response;

/// Catch-all parameter name used to capture what follows a mount prefix.
const REST: &str = "__rest";

// ── RouteTable ────────────────────────────────────────────────────────────────

/// Registration surface a [`Controller`](crate::Controller) compiles onto.
///
/// [`Router`] implements it; anything else that can take per-method routes
/// plus blanket middleware can too.
pub trait RouteTable {
    /// Register `handler` for one method and path (`:name` segments allowed).
    fn add_route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error>;

    /// Register `handler` as middleware that runs whatever the method or path.
    fn add_middleware(&mut self, handler: BoxedHandler);
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or call [`Router::handle`] directly. Builder methods return `self` so
/// registrations chain naturally.
pub struct Router {
    layers: Vec<Layer>,
}

enum Layer {
    Use(BoxedHandler),
    Route(Route),
    Nest(Nest),
}

struct Route {
    method: Method,
    tree: MatchitRouter<BoxedHandler>,
}

struct Nest {
    prefix: Prefix,
    router: Arc<Router>,
    merge_params: bool,
}

/// A mount path. `None` is the root mount, which matches everything.
struct Prefix {
    tree: Option<MatchitRouter<()>>,
}

impl Router {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `:name` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust
    /// # use ctrlr::{Method, Request, Router};
    /// # async fn get_user(_: Request) -> &'static str { "" }
    /// # async fn delete_user(_: Request) -> &'static str { "" }
    /// Router::new()
    ///     .on(Method::Delete, "/users/:id", delete_user)
    ///     .on(Method::Get,    "/users/:id", get_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the radix tree rejects `path`. Route tables are static, so
    /// this surfaces at startup.
    pub fn on<H, T>(mut self, method: Method, path: &str, handler: H) -> Self
    where
        H: Handler<T>,
    {
        self.add_route(method, path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("{e}"));
        self
    }

    /// Register middleware that runs for every request reaching this point
    /// of the stack.
    pub fn middleware<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T>,
    {
        self.add_middleware(handler.into_boxed_handler());
        self
    }

    /// Mount `router` under `prefix`.
    ///
    /// Parameters captured by `prefix` are *not* visible to the nested
    /// router's handlers. Use [`Router::nest_merged`] for that.
    pub fn nest(self, prefix: &str, router: Router) -> Result<Self, Error> {
        self.mount(prefix, router, false)
    }

    /// Mount `router` under `prefix`, merging the prefix's parameters into
    /// those of every route the nested router matches.
    pub fn nest_merged(self, prefix: &str, router: Router) -> Result<Self, Error> {
        self.mount(prefix, router, true)
    }

    fn mount(mut self, prefix: &str, router: Router, merge_params: bool) -> Result<Self, Error> {
        debug!(prefix, merge_params, layers = router.layers.len(), "mounting router");
        self.layers.push(Layer::Nest(Nest {
            prefix: Prefix::new(prefix)?,
            router: Arc::new(router),
            merge_params,
        }));
        Ok(self)
    }

    /// Dispatches one request in-process.
    pub async fn handle(self: Arc<Self>, req: http::Request<Bytes>) -> Response {
        let path = req.uri().path().to_owned();
        Next::new(self, path, HashMap::new(), None).run(Request::new(req)).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("layers", &self.layers.len()).finish()
    }
}

impl RouteTable for Router {
    /// Every route is its own layer, so registration order is match order.
    fn add_route(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), Error> {
        let normalized = path::normalize(path);
        let pattern = path::to_pattern(path::trim_trailing_slash(&normalized));

        let mut tree = MatchitRouter::new();
        tree.insert(pattern, handler)
            .map_err(|source| Error::InvalidRoute { path: path.to_owned(), source })?;
        self.layers.push(Layer::Route(Route { method, tree }));
        Ok(())
    }

    fn add_middleware(&mut self, handler: BoxedHandler) {
        self.layers.push(Layer::Use(handler));
    }
}

// ── Layers ────────────────────────────────────────────────────────────────────

/// What a layer wants done with the current request.
enum Step {
    Skip,
    Call(BoxedHandler, HashMap<String, String>),
    Enter {
        router: Arc<Router>,
        path: String,
        params: HashMap<String, String>,
        merge: bool,
    },
}

impl Layer {
    fn step(&self, method: &http::Method, path: &str) -> Step {
        match self {
            Self::Use(handler) => Step::Call(Arc::clone(handler), HashMap::new()),
            Self::Route(route) => match route.lookup(method, path) {
                Some((handler, params)) => Step::Call(handler, params),
                None => Step::Skip,
            },
            Self::Nest(nest) => match nest.prefix.strip(path) {
                Some((path, params)) => Step::Enter {
                    router: Arc::clone(&nest.router),
                    path,
                    params,
                    merge: nest.merge_params,
                },
                None => Step::Skip,
            },
        }
    }
}

impl Route {
    fn lookup(
        &self,
        method: &http::Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        if Method::from_http(method)? != self.method {
            return None;
        }
        let matched = self.tree.at(path::trim_trailing_slash(path)).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), path::decode(v)))
            .collect();
        Some((handler, params))
    }
}

impl Prefix {
    fn new(prefix: &str) -> Result<Self, Error> {
        let pattern = path::to_pattern(path::normalize(prefix).trim_end_matches('/'));
        if pattern.is_empty() {
            return Ok(Self { tree: None });
        }

        let invalid = |source| Error::InvalidRoute { path: prefix.to_owned(), source };
        let mut tree = MatchitRouter::new();
        tree.insert(pattern.clone(), ()).map_err(invalid)?;
        tree.insert(format!("{pattern}/{{*{REST}}}"), ()).map_err(invalid)?;
        Ok(Self { tree: Some(tree) })
    }

    /// Splits `path` into the part below the prefix and the prefix's params.
    fn strip(&self, path: &str) -> Option<(String, HashMap<String, String>)> {
        let Some(tree) = &self.tree else {
            return Some((path.to_owned(), HashMap::new()));
        };
        let matched = tree.at(path::trim_trailing_slash(path)).ok()?;

        let mut rest = String::from("/");
        let mut params = HashMap::new();
        for (key, value) in matched.params.iter() {
            if key == REST {
                rest.push_str(value);
            } else {
                params.insert(key.to_owned(), path::decode(value));
            }
        }
        Some((rest, params))
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The rest of the dispatch stack, handed to middleware.
///
/// Calling [`Next::run`] continues with the layer after the current one.
/// Dropping it ends dispatch there: the middleware's own response is sent.
pub struct Next {
    router: Arc<Router>,
    index: usize,
    path: String,
    params: HashMap<String, String>,
    parent: Option<Box<Next>>,
}

impl Next {
    fn new(
        router: Arc<Router>,
        path: String,
        params: HashMap<String, String>,
        parent: Option<Box<Next>>,
    ) -> Self {
        Self { router, index: 0, path, params, parent }
    }

    /// Runs the remaining layers and returns their response.
    pub async fn run(self, req: Request) -> Response {
        self.dispatch(req).await
    }

    // Boxed so nested routers and middleware can recurse through it.
    fn dispatch(self, req: Request) -> BoxFuture {
        Box::pin(self.resume(req))
    }

    async fn resume(mut self, mut req: Request) -> Response {
        loop {
            let step = match self.router.layers.get(self.index) {
                Some(layer) => layer.step(req.method(), &self.path),
                None => break,
            };
            self.index += 1;

            match step {
                Step::Skip => {}
                Step::Call(handler, params) => {
                    req.params = self.params.clone();
                    req.params.extend(params);
                    return handler.call(req, self).await;
                }
                Step::Enter { router, path, params, merge } => {
                    let params = if merge {
                        let mut merged = self.params.clone();
                        merged.extend(params);
                        merged
                    } else {
                        HashMap::new()
                    };
                    let child = Next::new(router, path, params, Some(Box::new(self)));
                    return child.dispatch(req).await;
                }
            }
        }

        match self.parent {
            Some(parent) => parent.dispatch(req).await,
            None => Response::status(StatusCode::NOT_FOUND),
        }
    }
}
