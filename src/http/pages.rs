//! Static markup pages.
//!
//! Pages are read from disk on every request so edits show up without a
//! restart. Associated style sheets are linked in before `</head>`, each
//! sheet once even when the route lists it several times.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::header,
    response::{IntoResponse, Response},
};

use crate::http::response;

/// URL prefix under which style sheets are served.
pub const STYLE_MOUNT: &str = "/css";

/// A page route bound to its markup file.
#[derive(Clone)]
pub struct PageTarget {
    file: Arc<PathBuf>,
    links: Arc<str>,
}

impl PageTarget {
    pub fn new(file: PathBuf, style_files: &[String]) -> Self {
        Self {
            file: Arc::new(file),
            links: Arc::from(style_links(style_files)),
        }
    }

    pub async fn render(&self) -> Response {
        match tokio::fs::read_to_string(self.file.as_path()).await {
            Ok(markup) => (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                inject_styles(&markup, &self.links),
            )
                .into_response(),
            Err(e) => {
                tracing::error!(file = %self.file.display(), error = %e, "Failed to read page");
                response::internal_error(&format!("Failed to read page {}", self.file.display()))
            }
        }
    }
}

/// `<link>` tags for `style_files`, first occurrence of each only.
pub fn style_links(style_files: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    let mut links = String::new();
    for sheet in style_files {
        if seen.contains(&sheet.as_str()) {
            continue;
        }
        seen.push(sheet);
        links.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}/{}\">\n",
            STYLE_MOUNT,
            response::escape_html(sheet)
        ));
    }
    links
}

/// Insert `links` before the first `</head>` (any case), or prepend them.
pub fn inject_styles(markup: &str, links: &str) -> String {
    if links.is_empty() {
        return markup.to_string();
    }
    match markup.to_ascii_lowercase().find("</head>") {
        Some(at) => format!("{}{}{}", &markup[..at], links, &markup[at..]),
        None => format!("{}{}", links, markup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn links_are_deduplicated_in_order() {
        let styles = vec!["main.css".to_string(), "nav.css".to_string(), "main.css".to_string()];
        assert_eq!(
            style_links(&styles),
            "<link rel=\"stylesheet\" href=\"/css/main.css\">\n\
             <link rel=\"stylesheet\" href=\"/css/nav.css\">\n"
        );
        assert_eq!(style_links(&[]), "");
    }

    #[test]
    fn injects_before_head_close() {
        let html = "<html><HEAD><title>x</title></HEAD><body></body></html>";
        let out = inject_styles(html, "<link>");
        assert_eq!(out, "<html><HEAD><title>x</title><link></HEAD><body></body></html>");
    }

    #[test]
    fn prepends_without_head() {
        assert_eq!(inject_styles("<p>hi</p>", "<link>"), "<link><p>hi</p>");
        assert_eq!(inject_styles("<p>hi</p>", ""), "<p>hi</p>");
    }

    #[tokio::test]
    async fn renders_page_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("index.html");
        std::fs::write(&file, "<head></head><h1>Home</h1>").unwrap();

        let page = PageTarget::new(file, &["components/forms.css".to_string()]);
        let response = page.render().await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("<head><link rel=\"stylesheet\" href=\"/css/components/forms.css\">"));
    }

    #[tokio::test]
    async fn missing_file_is_a_500_fragment() {
        let page = PageTarget::new(PathBuf::from("/nonexistent/page.html"), &[]);
        let response = page.render().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
