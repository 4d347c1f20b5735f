//! Route synthesis for markup pages.
//!
//! Every page becomes a GET route named after its file. Auth and admin
//! flags come from `_auth` / `_admin` in the file name, and style sheets are
//! associated by name matching. Sheet names are lowercased; the page name is
//! used as written. Association keeps candidate order and may repeat a sheet
//! that several rules select; consumers must tolerate that.

use crate::discovery::DiscoveredFile;
use crate::routing::route::{Dispatch, HttpMethod, RouteEntry, RouteMetadata};

/// Sheets whose name contains one of these are linked into every page.
const GLOBAL_STYLE_TOKENS: [&str; 4] = ["global", "main", "reset", "variables"];

/// Sheets sharing one of these with the page name are linked into it.
const COMPONENT_TOKENS: [&str; 3] = ["form", "button", "nav"];

/// Select the style sheets for the page named `page`.
pub fn associate_styles(page: &str, candidates: &[DiscoveredFile]) -> Vec<String> {
    let mut selected = Vec::new();

    for candidate in candidates {
        let sheet = candidate.file_name().to_lowercase();
        let link = candidate.relative_slash();

        if GLOBAL_STYLE_TOKENS.iter().any(|t| sheet.contains(t)) {
            selected.push(link.clone());
        }
        if !page.is_empty() && sheet.contains(page) {
            selected.push(link.clone());
        }
        for token in COMPONENT_TOKENS {
            if page.contains(token) && sheet.contains(token) {
                selected.push(link.clone());
            }
        }
    }

    selected
}

/// Build the GET route for one markup page.
pub fn synthesize(page: &DiscoveredFile, styles: &[DiscoveredFile]) -> RouteEntry {
    let name = page.stem();
    let url_path = if name == "index" {
        "/".to_string()
    } else {
        format!("/{}", name)
    };
    let admin_required = name.contains("_admin");

    RouteEntry {
        name: name.to_string(),
        source_file: page.path.clone(),
        url_path,
        method: HttpMethod::Get,
        requires_auth: admin_required || name.contains("_auth"),
        rate_limit: 0,
        cache_timeout_secs: 0,
        documentation: String::new(),
        style_files: associate_styles(name, styles),
        dispatch: Dispatch::Static {
            file: page.path.clone(),
        },
        metadata: RouteMetadata::Page {
            admin_required,
            is_api: name.starts_with("api_"),
        },
    }
}
