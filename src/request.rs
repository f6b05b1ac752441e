//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;

/// An incoming HTTP request with its body already collected.
///
/// Path parameters are rewritten as the request moves through the router:
/// each handler sees the parameters captured by the route it matched (plus
/// any merged in from a [`Controller::router_at`](crate::Controller::router_at)
/// mount path).
pub struct Request {
    parts: http::request::Parts,
    body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self { parts, body, params: HashMap::new() }
    }

    pub fn method(&self) -> &http::Method { &self.parts.method }
    pub fn uri(&self) -> &http::Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &http::HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a `show` action, `req.param("id")` on `/posts/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Per-request values shared between middleware and handlers.
    ///
    /// A `before` action can insert a value here; every handler it calls
    /// `next` into will see it.
    pub fn extensions(&self) -> &http::Extensions { &self.parts.extensions }
    pub fn extensions_mut(&mut self) -> &mut http::Extensions { &mut self.parts.extensions }
}
