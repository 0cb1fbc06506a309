//! Field-name normalization for report lines.

use regex::Regex;
use std::sync::LazyLock;

/// A value that itself starts with `word: ` belongs to the key (e.g. `date:create: ...`).
static EMBEDDED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+): ").expect("valid embedded-key pattern"));

/// Fold a leading `word: ` of the value back into the key.
///
/// `("date", "create: 2013-01-21")` becomes `("date create", "2013-01-21")`.
pub fn split_embedded_key<'a>(key: &str, value: &'a str) -> (String, &'a str) {
    match EMBEDDED_KEY.captures(value) {
        Some(caps) => {
            let word = &caps[1];
            (format!("{key} {word}"), &value[word.len() + 2..])
        }
        None => (key.to_string(), value),
    }
}

/// Lower-case a key and join its space- or hyphen-separated words in camelCase.
pub fn camel_case(key: &str) -> String {
    let lower = key.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ' ' || c == '-' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }

    out
}
