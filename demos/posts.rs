//! A posts resource with nested comments.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example posts
//!
//! Try:
//!   curl http://localhost:3000/posts
//!   curl http://localhost:3000/posts/42
//!   curl http://localhost:3000/posts/rss
//!   curl -X POST http://localhost:3000/posts -d '{"title":"hello"}'
//!   curl http://localhost:3000/posts/42/comments/7
//!   curl -X DELETE http://localhost:3000/posts/42

use ctrlr::{controller, ActionOptions, Next, Request, Response, Router, Server};
use http::StatusCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ctrlr::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut posts = controller();
    posts
        .before(log_request)
        .index(list_posts)?
        .show(show_post)?
        .create(create_post)?
        .destroy(delete_post)?
        .action("rss", feed)?
        .action_with("/", ActionOptions::new().method("all"), powered_by)?;

    let mut comments = controller();
    comments.show(show_comment)?;

    let app = Router::new()
        .nest("/", comments.router_at("/posts/:post_id/comments")?)?
        .nest("/posts", posts.router()?)?;

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

async fn log_request(req: Request, next: Next) -> Response {
    tracing::info!(method = %req.method(), path = req.path(), "posts controller");
    next.run(req).await
}

async fn powered_by(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    tracing::debug!(status = res.status_code().as_u16(), "posts response");
    res
}

// GET /posts
async fn list_posts(_req: Request) -> Response {
    Response::json(r#"[{"id":"42","title":"hello"}]"#)
}

// GET /posts/:id
async fn show_post(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","title":"hello"}}"#))
}

// POST /posts — the body is passed through untouched.
async fn create_post(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/posts/43")
        .json(req.body().to_vec())
}

// DELETE /posts/:id
async fn delete_post(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /posts/rss
async fn feed(_req: Request) -> Response {
    Response::builder().bytes("application/rss+xml", "<rss version=\"2.0\"/>")
}

// GET /posts/:post_id/comments/:id
async fn show_comment(req: Request) -> Response {
    let post = req.param("post_id").unwrap_or("unknown");
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","post_id":"{post}"}}"#))
}
