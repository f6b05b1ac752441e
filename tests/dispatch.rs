use std::sync::Arc;

use bytes::Bytes;
use ctrlr::{controller, ActionOptions, Next, Request, Response, Router};
use http::StatusCode;

#[derive(Clone)]
struct Locals(&'static str);

#[derive(Clone, Default)]
struct Order(Vec<u8>);

fn request(method: &str, path: &str, body: &str) -> http::Request<Bytes> {
    http::Request::builder()
        .method(method)
        .uri(path)
        .body(Bytes::copy_from_slice(body.as_bytes()))
        .unwrap()
}

async fn send(app: &Arc<Router>, method: &str, path: &str, body: &str) -> (StatusCode, String) {
    let res = Arc::clone(app).handle(request(method, path, body)).await;
    (res.status_code(), String::from_utf8_lossy(res.body()).into_owned())
}

async fn get(app: &Arc<Router>, path: &str) -> (StatusCode, String) {
    send(app, "GET", path, "").await
}

fn ok_response() -> (StatusCode, String) {
    (StatusCode::OK, "OK".to_owned())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn ok(_req: Request) -> &'static str {
    "OK"
}

async fn echo(req: Request) -> Response {
    Response::json(req.body().to_vec())
}

async fn params(req: Request) -> String {
    let mut pairs: Vec<_> = req.params().iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join("&")
}

async fn id_and_body(req: Request) -> String {
    let body = String::from_utf8_lossy(req.body());
    format!("{} {body}", req.param("id").unwrap_or("-"))
}

async fn locals(req: Request) -> &'static str {
    req.extensions().get::<Locals>().map_or("none", |l| l.0)
}

fn record(req: &mut Request, step: u8) {
    if let Some(order) = req.extensions_mut().get_mut::<Order>() {
        order.0.push(step);
    }
}

fn order_of(req: &Request) -> String {
    let order = req.extensions().get::<Order>().cloned().unwrap_or_default();
    order.0.iter().map(u8::to_string).collect::<Vec<_>>().join(",")
}

fn mounted(router: Router) -> Arc<Router> {
    Arc::new(Router::new().nest("/posts", router).unwrap())
}

// ── CRUD ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn crud_actions_answer_their_routes() {
    let mut c = controller();
    c.index(ok).unwrap()
        .new(ok).unwrap()
        .create(echo).unwrap()
        .show(params).unwrap()
        .edit(params).unwrap()
        .update(id_and_body).unwrap()
        .patch(id_and_body).unwrap()
        .destroy(params).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts").await, ok_response());
    assert_eq!(get(&app, "/posts/new").await, ok_response());
    assert_eq!(send(&app, "POST", "/posts", r#"{"foo":"bar"}"#).await.1, r#"{"foo":"bar"}"#);
    assert_eq!(get(&app, "/posts/123").await.1, "id=123");
    assert_eq!(get(&app, "/posts/123/edit").await.1, "id=123");
    assert_eq!(send(&app, "PUT", "/posts/123", "foo=bar").await.1, "123 foo=bar");
    assert_eq!(send(&app, "PATCH", "/posts/123", "foo=baz").await.1, "123 foo=baz");
    assert_eq!(send(&app, "DELETE", "/posts/123", "").await.1, "id=123");
}

#[tokio::test]
async fn undeclared_routes_are_not_found() {
    let mut c = controller();
    c.show(params).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(send(&app, "DELETE", "/posts/1", "").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/posts").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/elsewhere/1").await.0, StatusCode::NOT_FOUND);
}

// ── Custom actions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn custom_actions_answer_their_routes() {
    let mut c = controller();
    c.action("/new", ok).unwrap()
        .action_with("/", ActionOptions::new().method("POST"), echo).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/new").await, ok_response());
    assert_eq!(send(&app, "POST", "/posts", "payload").await.1, "payload");
}

#[tokio::test]
async fn custom_actions_win_over_crud_at_an_overlapping_path() {
    let mut c = controller();
    c.show(params).unwrap()
        .action("/:slug", |req: Request| async move {
            format!("custom {}", req.param("slug").unwrap_or("-"))
        })
        .unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/hello").await.1, "custom hello");
}

#[tokio::test]
async fn custom_param_action_shadows_crud_new() {
    let mut c = controller();
    c.new(ok).unwrap()
        .action("/:slug", |req: Request| async move {
            format!("custom {}", req.param("slug").unwrap_or("-"))
        })
        .unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/new").await.1, "custom new");
}

// ── Paths ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn trailing_slashes_reach_the_same_action() {
    let mut c = controller();
    c.index(ok).unwrap()
        .show(params).unwrap()
        .edit(params).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/").await, ok_response());
    assert_eq!(get(&app, "/posts/7/").await.1, "id=7");
    assert_eq!(get(&app, "/posts/7/edit/").await.1, "id=7");
}

#[tokio::test]
async fn params_arrive_percent_decoded() {
    let mut c = controller();
    c.show(params).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/a%20b").await.1, "id=a b");
    assert_eq!(get(&app, "/posts/caf%C3%A9").await.1, "id=caf\u{e9}");
}

// ── Before ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn before_runs_ahead_of_every_action() {
    let mut c = controller();
    c.before(|mut req: Request, next: Next| async move {
            req.extensions_mut().insert(Locals("bar"));
            next.run(req).await
        })
        .action("/new", locals).unwrap()
        .update(locals).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/new").await.1, "bar");
    assert_eq!(send(&app, "PUT", "/posts/123", "").await.1, "bar");
}

#[tokio::test]
async fn before_can_answer_without_calling_next() {
    let mut c = controller();
    c.before(|_req: Request| async { (StatusCode::UNAUTHORIZED, "denied") })
        .index(ok).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts").await, (StatusCode::UNAUTHORIZED, "denied".to_owned()));
}

// ── Ordering ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn orders_before_then_actions_then_crud() {
    let all = || ActionOptions::new().method("ALL");
    let mut c = controller();
    c.index(|mut req: Request| async move {
            record(&mut req, 5);
            order_of(&req)
        })
        .unwrap()
        .create(|mut req: Request| async move {
            record(&mut req, 4);
            order_of(&req)
        })
        .unwrap()
        .before(|mut req: Request, next: Next| async move {
            req.extensions_mut().insert(Order(vec![0]));
            next.run(req).await
        })
        .action_with("/", all(), |mut req: Request, next: Next| async move {
            record(&mut req, 2);
            next.run(req).await
        })
        .unwrap()
        .before(|mut req: Request, next: Next| async move {
            record(&mut req, 1);
            next.run(req).await
        })
        .action_with("/", all(), |mut req: Request, next: Next| async move {
            record(&mut req, 3);
            next.run(req).await
        })
        .unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts").await.1, "0,1,2,3,5");
    assert_eq!(send(&app, "POST", "/posts", "").await.1, "0,1,2,3,4");
}

#[tokio::test]
async fn crud_order_holds_regardless_of_declaration() {
    let mut c = controller();
    c.show(params).unwrap().new(ok).unwrap();
    let app = mounted(c.router().unwrap());

    assert_eq!(get(&app, "/posts/new").await, ok_response());
    assert_eq!(get(&app, "/posts/123").await.1, "id=123");
}

// ── Mounting ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn router_at_defines_the_mount_path() {
    let mut c = controller();
    c.show(params).unwrap();
    let app = Arc::new(c.router_at("/posts").unwrap());

    assert_eq!(get(&app, "/posts/12345").await.1, "id=12345");
}

#[tokio::test]
async fn nested_mount_paths_compose_params() {
    let mut c = controller();
    c.show(params).unwrap();
    let app = Arc::new(
        Router::new()
            .nest("/api", c.router_at("/posts/:post_id/comments").unwrap()).unwrap()
            .nest("/api", c.router_at("/tasks/:task_id/comments").unwrap()).unwrap(),
    );

    assert_eq!(get(&app, "/api/posts/12345/comments/09876").await.1, "id=09876&post_id=12345");
    assert_eq!(get(&app, "/api/tasks/abcde/comments/54321").await.1, "id=54321&task_id=abcde");
}

#[tokio::test]
async fn nest_does_not_capture_prefix_params() {
    let mut c = controller();
    c.show(params).unwrap();
    let app = Arc::new(
        Router::new()
            .nest("/posts/:post_id/comments", c.router().unwrap())
            .unwrap(),
    );

    assert_eq!(get(&app, "/posts/12345/comments/09876").await.1, "id=09876");
}

#[tokio::test]
async fn before_is_scoped_to_the_mount() {
    let mut c = controller();
    c.before(|mut req: Request, next: Next| async move {
            req.extensions_mut().insert(Locals("posts"));
            next.run(req).await
        })
        .show(locals).unwrap();
    let app = Arc::new(
        Router::new()
            .nest("/posts", c.router().unwrap()).unwrap()
            .on(ctrlr::Method::Get, "/other", locals),
    );

    assert_eq!(get(&app, "/posts/1").await.1, "posts");
    assert_eq!(get(&app, "/other").await.1, "none");
}
