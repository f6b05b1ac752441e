//! Resourceful controllers.
//!
//! A [`Controller`] collects actions and compiles them onto a router in a
//! fixed order, whatever order they were declared in:
//!
//! 1. `before` middleware, in declaration order;
//! 2. custom actions, in declaration order;
//! 3. CRUD actions, in the order of [`Crud::ALL`].
//!
//! | action    | method   | path        |
//! |-----------|----------|-------------|
//! | `index`   | `GET`    | `/`         |
//! | `new`     | `GET`    | `/new`      |
//! | `create`  | `POST`   | `/`         |
//! | `show`    | `GET`    | `/:id`      |
//! | `edit`    | `GET`    | `/:id/edit` |
//! | `update`  | `PUT`    | `/:id`      |
//! | `patch`   | `PATCH`  | `/:id`      |
//! | `destroy` | `DELETE` | `/:id`      |
//!
//! Declaring the same method and path twice is an error at the point of
//! declaration. Actions declared with the `all` verb never collide: they are
//! mounted as middleware.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::{Method, Verb};
use crate::path;
use crate::router::{RouteTable, Router};

/// The eight conventional resource actions.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Crud {
    Index,
    New,
    Create,
    Show,
    Edit,
    Update,
    Patch,
    Destroy,
}

impl Crud {
    /// Every CRUD action, in compile order.
    pub const ALL: [Crud; 8] = [
        Self::Index,
        Self::New,
        Self::Create,
        Self::Show,
        Self::Edit,
        Self::Update,
        Self::Patch,
        Self::Destroy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Index   => "index",
            Self::New     => "new",
            Self::Create  => "create",
            Self::Show    => "show",
            Self::Edit    => "edit",
            Self::Update  => "update",
            Self::Patch   => "patch",
            Self::Destroy => "destroy",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::Index | Self::New | Self::Show | Self::Edit => Method::Get,
            Self::Create  => Method::Post,
            Self::Update  => Method::Put,
            Self::Patch   => Method::Patch,
            Self::Destroy => Method::Delete,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Index | Self::Create => "/",
            Self::New  => "/new",
            Self::Show | Self::Update | Self::Patch | Self::Destroy => "/:id",
            Self::Edit => "/:id/edit",
        }
    }
}

/// Which compile tier an action belongs to.
///
/// The derived ordering *is* the compile order: every `Before` sorts ahead of
/// every `Custom`, which sorts ahead of every `Crud`; CRUD actions sort by
/// their position in [`Crud::ALL`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Kind {
    Before,
    Custom,
    Crud(Crud),
}

/// One declared action.
pub struct Action {
    kind: Kind,
    verb: Verb,
    path: Option<String>,
    handler: BoxedHandler,
}

impl Action {
    pub fn kind(&self) -> Kind { self.kind }
    pub fn verb(&self) -> Verb { self.verb }

    /// `None` for `before` actions.
    pub fn path(&self) -> Option<&str> { self.path.as_deref() }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("kind", &self.kind)
            .field("verb", &self.verb)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Options for [`Controller::action_with`].
///
/// ```rust
/// use ctrlr::ActionOptions;
///
/// let opts = ActionOptions::new().method("POST");
/// ```
#[derive(Clone, Debug)]
pub struct ActionOptions {
    method: String,
}

impl ActionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP method, case-insensitive, or `"all"`. Defaults to `GET`.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self { method: "GET".to_owned() }
    }
}

/// Creates an empty [`Controller`].
pub fn controller() -> Controller {
    Controller::default()
}

/// A resourceful controller: an ordered registry of actions.
///
/// ```rust
/// use ctrlr::{controller, Next, Request, Response, Router};
///
/// # async fn load_user(req: Request, next: Next) -> Response { next.run(req).await }
/// # async fn list(_: Request) -> &'static str { "" }
/// # async fn show(_: Request) -> &'static str { "" }
/// # async fn rss(_: Request) -> &'static str { "" }
/// # fn main() -> Result<(), ctrlr::Error> {
/// let mut posts = controller();
/// posts
///     .before(load_user)
///     .index(list)?
///     .show(show)?
///     .action("/rss", rss)?;
///
/// let app = Router::new().nest("/posts", posts.router()?)?;
/// # Ok(())
/// # }
/// ```
///
/// Builder methods take `&mut self`: a declaration that fails leaves the
/// controller exactly as it was.
#[derive(Debug, Default)]
pub struct Controller {
    actions: Vec<Action>,
}

impl Controller {
    /// Middleware run ahead of every other action.
    pub fn before<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T>,
    {
        self.actions.push(Action {
            kind: Kind::Before,
            verb: Verb::All,
            path: None,
            handler: handler.into_boxed_handler(),
        });
        self
    }

    /// `GET /`
    pub fn index<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Index, handler)
    }

    /// `GET /new`
    pub fn new<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::New, handler)
    }

    /// `POST /`
    pub fn create<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Create, handler)
    }

    /// `GET /:id`
    pub fn show<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Show, handler)
    }

    /// `GET /:id/edit`
    pub fn edit<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Edit, handler)
    }

    /// `PUT /:id`
    pub fn update<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Update, handler)
    }

    /// `PATCH /:id`
    pub fn patch<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Patch, handler)
    }

    /// `DELETE /:id`
    pub fn destroy<H: Handler<T>, T>(&mut self, handler: H) -> Result<&mut Self, Error> {
        self.crud(Crud::Destroy, handler)
    }

    /// A custom `GET` action at `path`. A missing leading `/` is added.
    pub fn action<H: Handler<T>, T>(&mut self, path: &str, handler: H) -> Result<&mut Self, Error> {
        self.action_with(path, ActionOptions::default(), handler)
    }

    /// A custom action with explicit options.
    ///
    /// With method `"all"` the action becomes middleware: it runs for every
    /// request reaching the controller, and `path` is ignored.
    pub fn action_with<H: Handler<T>, T>(
        &mut self,
        path: &str,
        options: ActionOptions,
        handler: H,
    ) -> Result<&mut Self, Error> {
        let verb = options.method.parse()?;
        self.push(Kind::Custom, verb, path::normalize(path), handler.into_boxed_handler())
    }

    fn crud<H: Handler<T>, T>(&mut self, crud: Crud, handler: H) -> Result<&mut Self, Error> {
        let verb = Verb::Method(crud.method());
        self.push(Kind::Crud(crud), verb, crud.path().to_owned(), handler.into_boxed_handler())
    }

    fn push(
        &mut self,
        kind: Kind,
        verb: Verb,
        path: String,
        handler: BoxedHandler,
    ) -> Result<&mut Self, Error> {
        if let Verb::Method(method) = verb {
            if self.collides(method, &path) {
                return Err(Error::RouteCollision { method, path });
            }
        }
        self.actions.push(Action { kind, verb, path: Some(path), handler });
        Ok(self)
    }

    fn collides(&self, method: Method, path: &str) -> bool {
        self.actions.iter()
            .any(|a| a.verb == Verb::Method(method) && a.path.as_deref() == Some(path))
    }

    /// Actions in compile order.
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions: Vec<&Action> = self.actions.iter().collect();
        // Stable: declaration order survives within a tier.
        actions.sort_by_key(|a| a.kind);
        actions
    }

    /// Compiles every action onto `table`, in [`actions`](Self::actions) order.
    pub fn register(&self, table: &mut impl RouteTable) -> Result<(), Error> {
        for action in self.actions() {
            let handler = Arc::clone(&action.handler);
            match (action.verb, action.path()) {
                (Verb::Method(method), Some(path)) => {
                    debug!(kind = ?action.kind, %method, path, "registering route");
                    table.add_route(method, path, handler)?;
                }
                _ => {
                    debug!(kind = ?action.kind, "registering middleware");
                    table.add_middleware(handler);
                }
            }
        }
        Ok(())
    }

    /// Compiles the controller into a fresh [`Router`].
    ///
    /// May be called any number of times; handlers are shared between the
    /// routers produced.
    pub fn router(&self) -> Result<Router, Error> {
        let mut router = Router::new();
        self.register(&mut router)?;
        Ok(router)
    }

    /// Like [`router`](Self::router), mounted under `mount_path`.
    ///
    /// Parameters in `mount_path` reach the handlers alongside the action's
    /// own: mounting at `/posts/:post_id/comments` gives `show` both
    /// `post_id` and `id`.
    pub fn router_at(&self, mount_path: &str) -> Result<Router, Error> {
        Router::new().nest_merged(mount_path, self.router()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    async fn ok(_req: Request) -> &'static str {
        "OK"
    }

    fn crud_of(c: &Controller) -> Vec<Kind> {
        c.actions().iter().map(|a| a.kind()).collect()
    }

    #[test]
    fn crud_table_is_fixed() {
        let pairs: Vec<_> = Crud::ALL.iter()
            .map(|c| (c.name(), c.method(), c.path()))
            .collect();
        assert_eq!(pairs, [
            ("index",   Method::Get,    "/"),
            ("new",     Method::Get,    "/new"),
            ("create",  Method::Post,   "/"),
            ("show",    Method::Get,    "/:id"),
            ("edit",    Method::Get,    "/:id/edit"),
            ("update",  Method::Put,    "/:id"),
            ("patch",   Method::Patch,  "/:id"),
            ("destroy", Method::Delete, "/:id"),
        ]);
    }

    #[test]
    fn failed_declaration_leaves_controller_untouched() {
        let mut c = controller();
        c.new(ok).unwrap();
        assert!(c.action("new", ok).is_err());
        assert!(c.action_with("/x", ActionOptions::new().method("FOO"), ok).is_err());
        assert_eq!(crud_of(&c), [Kind::Crud(Crud::New)]);
    }

    #[test]
    fn before_actions_have_no_path() {
        let mut c = controller();
        c.before(ok);
        let actions = c.actions();
        assert_eq!(actions[0].verb(), Verb::All);
        assert_eq!(actions[0].path(), None);
    }
}
