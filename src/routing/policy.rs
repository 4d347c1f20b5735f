//! Naming-convention and annotation policies.
//!
//! # Responsibilities
//! - Infer an HTTP method from a handler name
//! - Read auth, rate-limit and cache annotations from documentation
//!
//! # Design Decisions
//! - Method keywords are checked in a fixed precedence order; the first
//!   group with a hit wins, so `get_and_create_log` is POST
//! - All matching is case-insensitive
//! - Annotation values use the leftmost match of either the `@name(N)` form
//!   or the free-text `name: N` form

use crate::routing::route::HttpMethod;

/// Keyword groups in precedence order.
const METHOD_KEYWORDS: [(&[&str], HttpMethod); 4] = [
    (&["create", "add", "post"], HttpMethod::Post),
    (&["update", "edit", "put"], HttpMethod::Put),
    (&["delete", "remove"], HttpMethod::Delete),
    (&["get", "fetch", "load"], HttpMethod::Get),
];

/// Handlers are mostly triggered by form or button submission.
const DEFAULT_METHOD: HttpMethod = HttpMethod::Post;

const AUTH_MARKERS: [&str; 3] = ["@auth", "requires auth", "login required"];

/// Infer the HTTP method for a full (unstripped) handler name.
pub fn infer_method(handler_name: &str) -> HttpMethod {
    let name = handler_name.to_lowercase();
    METHOD_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
        .map_or(DEFAULT_METHOD, |(_, method)| *method)
}

/// Whether the documentation marks the handler as requiring authentication.
pub fn requires_auth(documentation: &str) -> bool {
    let doc = documentation.to_lowercase();
    AUTH_MARKERS.iter().any(|marker| doc.contains(marker))
}

/// Rate limit from `@rate_limit(N)` or `rate limit: N`; 0 if absent.
pub fn rate_limit(documentation: &str) -> u32 {
    annotation_value(documentation, "@rate_limit", &["rate", "limit"])
}

/// Cache timeout from `@cache(N)` or `cache: N`; 0 if absent.
pub fn cache_timeout(documentation: &str) -> u32 {
    annotation_value(documentation, "@cache", &["cache"])
}

/// Scan `documentation` for the leftmost occurrence of either
/// `<annotation>(<digits>)` or `<words joined by any one char>[: \s]+<digits>`.
fn annotation_value(documentation: &str, annotation: &str, words: &[&str]) -> u32 {
    let doc = documentation.to_lowercase();

    doc.char_indices()
        .find_map(|(at, _)| {
            let rest = &doc[at..];
            annotation_form(rest, annotation).or_else(|| free_text_form(rest, words))
        })
        .unwrap_or(0)
}

/// `@name(123)` at the start of `text`.
fn annotation_form(text: &str, annotation: &str) -> Option<u32> {
    let rest = text.strip_prefix(annotation)?.strip_prefix('(')?;
    let (value, rest) = leading_digits(rest)?;
    rest.starts_with(')').then_some(value)
}

/// `rate-limit: 123` / `cache 123` at the start of `text`.
fn free_text_form(text: &str, words: &[&str]) -> Option<u32> {
    let mut rest = text;
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            let mut chars = rest.chars();
            chars.next()?;
            rest = chars.as_str();
        }
        rest = rest.strip_prefix(word)?;
    }

    let trimmed = rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
    if trimmed.len() == rest.len() {
        return None;
    }
    leading_digits(trimmed).map(|(value, _)| value)
}

/// Parse the run of ASCII digits at the start of `text`, saturating on overflow.
fn leading_digits(text: &str) -> Option<(u32, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse::<u32>().unwrap_or(u32::MAX);
    Some((value, &text[end..]))
}
