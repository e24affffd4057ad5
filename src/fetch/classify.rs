// src/fetch/classify.rs
// =============================================================================
// This module classifies a fetched page before extraction runs.
//
// Classification precedence:
// 1. Hard 404/410 status                                  -> "404"
// 2. Final URL path matching the site's not-found route   -> "soft404"
// 3. Empty response body (includes dead transports, which
//    surface as status 0 with no body)                    -> "empty"
// 4. Not-found markers in the rendered content            -> "soft404-content"
// 5. Everything else                                      -> "ok"
//
// The content scan is bounded: only the first 500 body elements are
// inspected, since not-found markers live near the top of the document and
// unbounded scans hurt on megabyte-sized pages.
// =============================================================================

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::dom::{class_attr, sel, text_of};
use crate::fetch::http::is_hard_not_found;

const CONTENT_SCAN_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "404")]
    NotFound,
    #[serde(rename = "soft404")]
    Soft404,
    #[serde(rename = "soft404-content")]
    Soft404Content,
    #[serde(rename = "empty")]
    Empty,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Ok => "ok",
            Classification::NotFound => "404",
            Classification::Soft404 => "soft404",
            Classification::Soft404Content => "soft404-content",
            Classification::Empty => "empty",
        }
    }

    /// Failure classifications collapse to a single "404" row in reports.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Classification::Ok)
    }
}

/// Which signal produced a non-ok classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reason {
    HttpStatus,
    PathPattern,
    EmptyHtml,
    BodyClass,
    Title,
    ElementId,
    ElementClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageClass {
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl PageClass {
    fn ok() -> Self {
        PageClass {
            classification: Classification::Ok,
            reason: None,
        }
    }

    fn of(classification: Classification, reason: Reason) -> Self {
        PageClass {
            classification,
            reason: Some(reason),
        }
    }
}

/// Classifies a fetched page. Pure over (status, final URL, body) so the
/// decision table is directly testable without a network.
pub fn classify(status: u16, final_url: &str, html: &str) -> PageClass {
    if is_hard_not_found(status) {
        return PageClass::of(Classification::NotFound, Reason::HttpStatus);
    }

    static NOT_FOUND_PATH: OnceLock<Regex> = OnceLock::new();
    let not_found_path =
        NOT_FOUND_PATH.get_or_init(|| Regex::new(r"(?i)/not-found(/|$)").unwrap());
    if not_found_path.is_match(final_url) {
        return PageClass::of(Classification::Soft404, Reason::PathPattern);
    }

    if html.trim().is_empty() {
        return PageClass::of(Classification::Empty, Reason::EmptyHtml);
    }

    if let Some(reason) = content_not_found_marker(html) {
        return PageClass::of(Classification::Soft404Content, reason);
    }

    PageClass::ok()
}

// Scans the rendered content for not-found markers, in precedence order:
// body class, document title, element ids, element classes.
fn content_not_found_marker(html: &str) -> Option<Reason> {
    let doc = Html::parse_document(html);

    static CLASS_MARKER: OnceLock<Regex> = OnceLock::new();
    let class_marker = CLASS_MARKER.get_or_init(|| {
        Regex::new(r"(?i)\bnot[-_]found\b|\berror[-_]?404\b|\bpage[-_]not[-_]found\b").unwrap()
    });
    static ID_MARKER: OnceLock<Regex> = OnceLock::new();
    let id_marker = ID_MARKER.get_or_init(|| {
        Regex::new(r"(?i)^(404|page[-_]?not[-_]?found|error[-_]?404)$").unwrap()
    });

    if let Some(body) = doc.select(&sel("body")).next() {
        if class_marker.is_match(class_attr(&body)) {
            return Some(Reason::BodyClass);
        }
    }

    static TITLE_404: OnceLock<Regex> = OnceLock::new();
    let title_404 = TITLE_404.get_or_init(|| Regex::new(r"\b404\b").unwrap());
    if let Some(title) = doc.select(&sel("title")).next() {
        if title_404.is_match(&text_of(title)) {
            return Some(Reason::Title);
        }
    }

    for el in doc.select(&sel("body *")).take(CONTENT_SCAN_LIMIT) {
        if let Some(id) = el.value().attr("id") {
            if id_marker.is_match(id) {
                return Some(Reason::ElementId);
            }
        }
        if class_marker.is_match(class_attr(&el)) {
            return Some(Reason::ElementClass);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_status_beats_everything() {
        let page = classify(404, "https://example.com/not-found", "<html>404</html>");
        assert_eq!(page.classification, Classification::NotFound);
        assert_eq!(page.reason, Some(Reason::HttpStatus));
        assert_eq!(page.classification.label(), "404");
    }

    #[test]
    fn test_transport_failure_is_empty() {
        // a dead transport comes back as status 0 with no body; the page is
        // recorded in diagnostics but never as a "404" component row
        let page = classify(0, "https://example.com/x", "");
        assert_eq!(page.classification, Classification::Empty);
        assert_eq!(page.reason, Some(Reason::EmptyHtml));
    }

    #[test]
    fn test_not_found_path_is_soft404() {
        let page = classify(200, "https://example.com/not-found", "<html>x</html>");
        assert_eq!(page.classification, Classification::Soft404);
        assert_eq!(page.reason, Some(Reason::PathPattern));

        let nested = classify(200, "https://example.com/not-found/extra", "<html>x</html>");
        assert_eq!(nested.classification, Classification::Soft404);

        // a path merely containing the words must not match
        let fine = classify(200, "https://example.com/whats-not-found-here", "<html>x</html>");
        assert_eq!(fine.classification, Classification::Ok);
    }

    #[test]
    fn test_empty_body() {
        let page = classify(200, "https://example.com/x", "   \n  ");
        assert_eq!(page.classification, Classification::Empty);
        assert_eq!(page.reason, Some(Reason::EmptyHtml));
    }

    #[test]
    fn test_body_class_marker() {
        let html = r#"<html><body class="path-frontpage page-not-found"><p>x</p></body></html>"#;
        let page = classify(200, "https://example.com/x", html);
        assert_eq!(page.classification, Classification::Soft404Content);
        assert_eq!(page.reason, Some(Reason::BodyClass));
    }

    #[test]
    fn test_title_marker() {
        let html = "<html><head><title>404 | Example</title></head><body><p>x</p></body></html>";
        let page = classify(200, "https://example.com/x", html);
        assert_eq!(page.classification, Classification::Soft404Content);
        assert_eq!(page.reason, Some(Reason::Title));
    }

    #[test]
    fn test_element_id_marker() {
        let html = r#"<html><body><div id="page-not-found">Sorry</div></body></html>"#;
        let page = classify(200, "https://example.com/x", html);
        assert_eq!(page.classification, Classification::Soft404Content);
        assert_eq!(page.reason, Some(Reason::ElementId));
    }

    #[test]
    fn test_element_class_marker() {
        let html = r#"<html><body><div class="block error-404">Sorry</div></body></html>"#;
        let page = classify(200, "https://example.com/x", html);
        assert_eq!(page.classification, Classification::Soft404Content);
        assert_eq!(page.reason, Some(Reason::ElementClass));
    }

    #[test]
    fn test_healthy_page_is_ok() {
        let html = r#"<html><head><title>Products</title></head>
            <body class="path-products"><div class="content">hello</div></body></html>"#;
        let page = classify(200, "https://example.com/products", html);
        assert_eq!(page.classification, Classification::Ok);
        assert!(page.reason.is_none());
        assert!(!page.classification.is_failure());
    }

    #[test]
    fn test_year_in_title_does_not_trip_marker() {
        let html = "<html><head><title>Catalog 2024</title></head><body><p>x</p></body></html>";
        let page = classify(200, "https://example.com/x", html);
        assert_eq!(page.classification, Classification::Ok);
    }
}
