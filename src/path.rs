//! Route path helpers.
//!
//! Actions are declared with Express-style `:name` segments. The radix tree
//! spells the same thing `{name}`, so patterns are translated on the way in.

use percent_encoding::percent_decode_str;

/// Prefixes a leading `/` when the path has none.
pub(crate) fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Translates `:name` segments into `{name}` tree parameters.
pub(crate) fn to_pattern(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Drops one trailing `/`, except from the root path.
pub(crate) fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Percent-decodes a captured parameter. Invalid UTF-8 is replaced.
pub(crate) fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
