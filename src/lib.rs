//! # ctrlr
//!
//! Rails-style resourceful controllers on a minimal radix-tree HTTP router.
//!
//! Declare what a resource does: `before` middleware, the conventional CRUD
//! actions, and any custom actions. ctrlr compiles the declarations onto a
//! [`Router`] in a fixed order, so `before` always runs first and custom
//! actions always win over CRUD routes at the same or an overlapping path
//! (`/:slug` shadows `new`), however the
//! controller was written.
//!
//! What ctrlr leaves to you or to the proxy in front of it:
//!
//! - **Body parsing** — handlers get the raw bytes
//! - **Method override** — `_method` form fields are not interpreted
//! - **TLS, rate limiting, body-size limits** — nginx / ingress
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ctrlr::{controller, Next, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ctrlr::Error> {
//!     let mut posts = controller();
//!     posts
//!         .before(log_request)
//!         .index(list_posts)?
//!         .show(show_post)?;
//!
//!     let mut comments = controller();
//!     comments.show(show_comment)?;
//!
//!     let app = Router::new()
//!         .nest("/posts", posts.router()?)?
//!         .nest("/", comments.router_at("/posts/:post_id/comments")?)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn log_request(req: Request, next: Next) -> Response {
//!     tracing::info!(path = req.path(), "posts");
//!     next.run(req).await
//! }
//!
//! async fn list_posts(_req: Request) -> Response {
//!     Response::json(r#"[{"id":"1"}]"#)
//! }
//!
//! async fn show_post(req: Request) -> String {
//!     format!("post {}", req.param("id").unwrap_or("?"))
//! }
//!
//! async fn show_comment(req: Request) -> String {
//!     let post = req.param("post_id").unwrap_or("?");
//!     let id = req.param("id").unwrap_or("?");
//!     format!("comment {id} on post {post}")
//! }
//! ```

mod controller;
mod error;
mod handler;
mod method;
mod path;
mod request;
mod response;
mod router;
mod server;

pub use controller::{controller, Action, ActionOptions, Controller, Crud, Kind};
pub use error::Error;
pub use handler::{BoxedHandler, ErasedHandler, Handler};
pub use method::{Method, Verb};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Next, RouteTable, Router};
pub use server::Server;
