//! Identifier recovery from the `data-theater` attribute.
//!
//! The attribute holds a small object literal, either JSON (`{"id":"E0610"}`)
//! or single-quoted (`{'id': 42}`). Only the `id` entry is read; the text is
//! matched, never evaluated: a value must be a quoted string or a bare
//! token followed by `,` or `}`.

use once_cell::sync::Lazy;
use regex::Regex;

static ID_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:^|[{,\s])(?:"id"|'id')\s*:\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|([A-Za-z0-9_.+-]+))\s*(?:[,}]|$)"#,
    )
    .unwrap_or_else(|e| panic!("invalid id pattern: {e}"))
});

/// Returns the `id` value as a string, or `None` when the key is missing,
/// null, or empty.
pub fn parse_id_attr(raw: &str) -> Option<String> {
    let caps = ID_ENTRY.captures(raw)?;
    let value = caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))?
        .as_str()
        .trim();

    match value {
        "" | "null" | "None" | "undefined" => None,
        v => Some(unescape(v)),
    }
}

fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
