//! HTTP method as a typed enum, plus the `all` wildcard verb.
//!
//! Covers RFC 9110 standard methods, WebDAV extensions (RFC 4918 / 4791 / 3253 / 5323),
//! and `PURGE` used by nginx and Varnish for cache invalidation.
//!
//! Requests carrying a method outside this set never match a route; blanket
//! middleware still sees them.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    // RFC 9110 ─────────────────────────────────────────────────────────────────
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    // WebDAV RFC 4918 ──────────────────────────────────────────────────────────
    Copy,
    Lock,
    Mkcol,
    Move,
    Propfind,
    Proppatch,
    Unlock,
    // WebDAV extensions ────────────────────────────────────────────────────────
    Mkcalendar, // RFC 4791 — CalDAV
    Report,     // RFC 3253
    Search,     // RFC 5323
    // Cache invalidation ───────────────────────────────────────────────────────
    Purge, // nginx / Varnish
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect    => "CONNECT",
            Self::Copy       => "COPY",
            Self::Delete     => "DELETE",
            Self::Get        => "GET",
            Self::Head       => "HEAD",
            Self::Lock       => "LOCK",
            Self::Mkcalendar => "MKCALENDAR",
            Self::Mkcol      => "MKCOL",
            Self::Move       => "MOVE",
            Self::Options    => "OPTIONS",
            Self::Patch      => "PATCH",
            Self::Post       => "POST",
            Self::Propfind   => "PROPFIND",
            Self::Proppatch  => "PROPPATCH",
            Self::Purge      => "PURGE",
            Self::Put        => "PUT",
            Self::Report     => "REPORT",
            Self::Search     => "SEARCH",
            Self::Trace      => "TRACE",
            Self::Unlock     => "UNLOCK",
        }
    }

    /// Maps a request's `http::Method` onto a known method, if any.
    pub(crate) fn from_http(method: &http::Method) -> Option<Self> {
        method.as_str().parse().ok()
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT"    => Ok(Self::Connect),
            "COPY"       => Ok(Self::Copy),
            "DELETE"     => Ok(Self::Delete),
            "GET"        => Ok(Self::Get),
            "HEAD"       => Ok(Self::Head),
            "LOCK"       => Ok(Self::Lock),
            "MKCALENDAR" => Ok(Self::Mkcalendar),
            "MKCOL"      => Ok(Self::Mkcol),
            "MOVE"       => Ok(Self::Move),
            "OPTIONS"    => Ok(Self::Options),
            "PATCH"      => Ok(Self::Patch),
            "POST"       => Ok(Self::Post),
            "PROPFIND"   => Ok(Self::Propfind),
            "PROPPATCH"  => Ok(Self::Proppatch),
            "PURGE"      => Ok(Self::Purge),
            "PUT"        => Ok(Self::Put),
            "REPORT"     => Ok(Self::Report),
            "SEARCH"     => Ok(Self::Search),
            "TRACE"      => Ok(Self::Trace),
            "UNLOCK"     => Ok(Self::Unlock),
            _            => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Verb ──────────────────────────────────────────────────────────────────────

/// The verb an action is declared with: one concrete method, or `all`.
///
/// `all` actions are mounted as blanket middleware. They run for every
/// request that reaches the controller, whatever its method or path.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Verb {
    All,
    Method(Method),
}

/// Case-insensitive: `"post"`, `"POST"` and `"Post"` are the same verb.
///
/// Unknown verbs are reported lowercased, the way they were normalised.
impl FromStr for Verb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if upper == "ALL" {
            return Ok(Self::All);
        }
        upper
            .parse()
            .map(Self::Method)
            .map_err(|()| Error::InvalidVerb(s.to_ascii_lowercase()))
    }
}

impl From<Method> for Verb {
    fn from(method: Method) -> Self {
        Self::Method(method)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Method(method) => method.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_case_insensitively() {
        assert_eq!("post".parse::<Verb>().unwrap(), Verb::Method(Method::Post));
        assert_eq!("Delete".parse::<Verb>().unwrap(), Verb::Method(Method::Delete));
        assert_eq!("ALL".parse::<Verb>().unwrap(), Verb::All);
        assert_eq!("all".parse::<Verb>().unwrap(), Verb::All);
    }

    #[test]
    fn unknown_verb_is_reported_lowercased() {
        let err = "FOO".parse::<Verb>().unwrap_err();
        assert!(matches!(&err, Error::InvalidVerb(v) if v == "foo"));
        assert_eq!(err.to_string(), "`foo` is not a valid verb");
    }

    #[test]
    fn methods_stay_case_sensitive() {
        assert!("get".parse::<Method>().is_err());
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
    }

    #[test]
    fn http_methods_map_onto_known_methods() {
        assert_eq!(Method::from_http(&http::Method::PATCH), Some(Method::Patch));
        let odd = http::Method::from_bytes(b"BREW").unwrap();
        assert_eq!(Method::from_http(&odd), None);
    }
}
