//! Handler extraction from handler source text.
//!
//! # Responsibilities
//! - Find every `def htmx_<name>(<params>) [-> <annotation>]:` declaration
//! - Split the parameter list on top-level commas and strip annotations/defaults
//! - Capture the documentation block that immediately follows the declaration
//!
//! # Design Decisions
//! - A small scanner, not a parser: anything that does not look like a
//!   conventional declaration is skipped and scanning resumes after it
//! - Unbalanced parameter lists skip that occurrence only, never the file
//! - A declaration with no leading documentation block has empty documentation

/// Prefix that marks a function as a routable handler.
pub const HANDLER_PREFIX: &str = "htmx_";

const DEF_KEYWORD: &str = "def";
const DOC_DELIMITERS: [&str; 2] = ["\"\"\"", "'''"];

/// A handler declaration found in one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDescriptor {
    /// Full handler name, prefix included (e.g. `htmx_get_profile`).
    pub name: String,
    /// Parameter names in declaration order, `self` and annotations removed.
    pub parameters: Vec<String>,
    /// Return annotation text, if the declaration carries one.
    pub return_annotation: Option<String>,
    /// Documentation block text joined with single spaces; empty if none.
    pub documentation: String,
    /// 1-based line of the `def` keyword.
    pub line: usize,
}

/// Extract every handler declaration from `source`, in source order.
pub fn extract_handlers(source: &str) -> Vec<HandlerDescriptor> {
    let mut handlers = Vec::new();
    let mut pos = 0;

    while let Some(found) = find_keyword(source, pos) {
        match parse_declaration(source, found) {
            Some((mut handler, end)) => {
                handler.line = line_number(source, found);
                handler.documentation = extract_documentation(&source[end..]);
                handlers.push(handler);
                pos = end;
            }
            None => pos = found + DEF_KEYWORD.len(),
        }
    }

    handlers
}

/// Split a raw parameter list into parameter names.
pub fn parse_parameters(raw: &str) -> Vec<String> {
    split_top_level(raw, b',')
        .into_iter()
        .filter_map(|entry| {
            let name = entry
                .find(|c: char| c == ':' || c == '=')
                .map_or(entry, |cut| &entry[..cut])
                .trim();
            (!name.is_empty() && name != "self").then(|| name.to_string())
        })
        .collect()
}

/// Locate the next `def` keyword at or after `from` that stands alone as a token.
fn find_keyword(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut search = from;

    while let Some(offset) = source.get(search..)?.find(DEF_KEYWORD) {
        let at = search + offset;
        let after = at + DEF_KEYWORD.len();
        let starts_token = at == 0 || !is_ident_byte(bytes[at - 1]);
        let followed_by_space = bytes.get(after).is_some_and(|b| b.is_ascii_whitespace());
        if starts_token && followed_by_space {
            return Some(at);
        }
        search = after;
    }
    None
}

/// Parse the declaration starting at the `def` keyword.
///
/// Returns the descriptor (documentation still empty) and the byte offset
/// just past the block-opening `:`.
fn parse_declaration(source: &str, at: usize) -> Option<(HandlerDescriptor, usize)> {
    let bytes = source.as_bytes();
    let mut pos = skip_whitespace(bytes, at + DEF_KEYWORD.len());

    let name_start = pos;
    while pos < bytes.len() && is_ident_byte(bytes[pos]) {
        pos += 1;
    }
    let name = &source[name_start..pos];
    if name.len() <= HANDLER_PREFIX.len() || !name.starts_with(HANDLER_PREFIX) {
        return None;
    }

    pos = skip_whitespace(bytes, pos);
    if bytes.get(pos) != Some(&b'(') {
        return None;
    }
    let close = matching_paren(bytes, pos)?;
    let parameters = parse_parameters(&source[pos + 1..close]);

    pos = skip_whitespace(bytes, close + 1);
    let mut return_annotation = None;
    if source[pos..].starts_with("->") {
        let rest = &source[pos + 2..];
        let colon = rest.find(':')?;
        let annotation = rest[..colon].trim();
        if annotation.is_empty() {
            return None;
        }
        return_annotation = Some(annotation.to_string());
        pos += 2 + colon;
    }

    if bytes.get(pos) != Some(&b':') {
        return None;
    }

    let handler = HandlerDescriptor {
        name: name.to_string(),
        parameters,
        return_annotation,
        documentation: String::new(),
        line: 0,
    };
    Some((handler, pos + 1))
}

/// Scan the lines following a declaration for its documentation block.
///
/// `body` starts immediately after the declaration's `:`; the remainder of
/// that line is the declaration itself and is ignored.
fn extract_documentation(body: &str) -> String {
    let mut lines = body.lines().skip(1);
    let mut doc = Vec::new();

    let delimiter = loop {
        let Some(line) = lines.next() else {
            return String::new();
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match DOC_DELIMITERS.iter().copied().find(|d| trimmed.starts_with(d)) {
            Some(delimiter) => {
                let inner = &trimmed[delimiter.len()..];
                if let Some(end) = inner.find(delimiter) {
                    return inner[..end].trim().to_string();
                }
                push_text(&mut doc, inner);
                break delimiter;
            }
            // Ordinary code before any documentation block.
            None => return String::new(),
        }
    };

    for line in lines {
        let trimmed = line.trim();
        if let Some(end) = trimmed.find(delimiter) {
            push_text(&mut doc, &trimmed[..end]);
            break;
        }
        push_text(&mut doc, trimmed);
    }

    doc.join(" ")
}

fn push_text(doc: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        doc.push(text.to_string());
    }
}

/// Find the `)` that closes the `(` at `open`, honoring nesting and quotes.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut pos = open;

    while pos < bytes.len() {
        let b = bytes[pos];
        match quote {
            Some(_) if b == b'\\' => pos += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return (b == b')').then_some(pos);
                    }
                }
                _ => {}
            },
        }
        pos += 1;
    }
    None
}

/// Split on `separator` where it is not nested in brackets or quotes.
fn split_top_level(raw: &str, separator: u8) -> Vec<&str> {
    let bytes = raw.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        match quote {
            Some(_) if b == b'\\' => pos += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                _ if b == separator && depth == 0 => {
                    parts.push(raw[start..pos].trim());
                    start = pos + 1;
                }
                _ => {}
            },
        }
        pos += 1;
    }
    parts.push(raw[start..].trim());
    parts
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn line_number(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}
