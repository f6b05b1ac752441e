//! Handler trait and type erasure.
//!
//! # Two handler shapes, one stored type
//!
//! Actions come in two shapes. Endpoints answer a request:
//!
//! ```text
//! async fn show(req: Request) -> impl IntoResponse
//! ```
//!
//! Middleware may answer, or hand the request on to whatever is registered
//! after it:
//!
//! ```text
//! async fn auth(req: Request, next: Next) -> impl IntoResponse
//! ```
//!
//! The router stores both in the same layer stack, so both are erased into
//! one trait object:
//!
//! ```text
//! async fn show(req: Request) -> Response { … }    ← user writes this
//!        ↓ controller.show(show)
//! show.into_boxed_handler()                        ← Handler<(Request,)> blanket impl
//!        ↓
//! Arc::new(Endpoint(show))                         ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req, next)  at request time         ← one vtable dispatch
//! ```
//!
//! The `T` parameter on [`Handler`] only exists to keep the two blanket impls
//! apart; callers never name it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Next;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in
/// [`BoxedHandler`], which [`RouteTable`](crate::RouteTable) implementers see.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased handler, shared between every router a controller compiles
/// into and across concurrent requests. This is what a
/// [`RouteTable`](crate::RouteTable) receives.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid action handler.
///
/// Satisfied automatically by any function or closure of the form
/// `Fn(Request) -> impl Future<Output: IntoResponse>` (an endpoint) or
/// `Fn(Request, Next) -> impl Future<Output: IntoResponse>` (middleware).
///
/// The trait is sealed: only the blanket impls below can satisfy it.
pub trait Handler<T>: private::Sealed<T> + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed<T> {}
}

// ── Endpoints ─────────────────────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed<(Request,)> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler<(Request,)> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Endpoint(self))
    }
}

struct Endpoint<F>(F);

impl<F, Fut, R> ErasedHandler for Endpoint<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    // Endpoints terminate dispatch; the continuation is dropped.
    fn call(&self, req: Request, _next: Next) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed<(Request, Next)> for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler<(Request, Next)> for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(Middleware(self))
    }
}

struct Middleware<F>(F);

impl<F, Fut, R> ErasedHandler for Middleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}
