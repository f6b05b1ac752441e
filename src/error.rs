//! Unified error type.

use crate::method::Method;

/// The error type returned by ctrlr's fallible operations.
///
/// Declaration errors (`InvalidVerb`, `RouteCollision`) surface while a
/// [`Controller`](crate::Controller) is being built. `InvalidRoute` comes from
/// the radix tree when a pattern is compiled. Application-level errors (404,
/// 422, etc.) are [`Response`](crate::Response) values, never `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The verb is neither a known HTTP method nor `all`.
    #[error("`{0}` is not a valid verb")]
    InvalidVerb(String),

    /// The same method and path were declared twice on one controller.
    #[error("`{method} {path}` is already defined")]
    RouteCollision { method: Method, path: String },

    /// The radix tree rejected a route or mount pattern.
    #[error("invalid route `{path}`: {source}")]
    InvalidRoute {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
