// src/fetch/disclaimer.rs
// =============================================================================
// This module handles one-step disclaimer interstitials.
//
// Some pages render a consent gate instead of their content: a disclaimer
// paragraph plus an "agree" link carrying a token query parameter. Following
// that link returns the real page. The crawler detects the gate, fetches the
// token URL, and substitutes the bypassed document for extraction.
//
// The bypass is best-effort: when the token fetch fails or comes back empty,
// the original (gated) document is kept and the disclaimer is reported as a
// component like any other.
// =============================================================================

use reqwest::Client;
use scraper::Html;
use url::Url;

use crate::dom::{normalize_url, sel};
use crate::fetch::http::{fetch_page, FetchResult};

const DISCLAIMER_MARKERS: &str =
    ".one-step-disclaimer-agree, .paragraph--type--one_step_disclaimer, .paragraph--type--one-step-disclaimer";

pub fn has_disclaimer(doc: &Html) -> bool {
    doc.select(&sel(DISCLAIMER_MARKERS)).next().is_some()
}

/// The token continuation URL of a disclaimer gate, if the page has one.
pub fn bypass_url(doc: &Html, base: &Url) -> Option<String> {
    if !has_disclaimer(doc) {
        return None;
    }
    doc.select(&sel("a[href*=\"token=\"]"))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| normalize_url(href, base))
}

/// Fetches the token URL. Returns the substitute document only when the
/// fetch produced a usable body; anything else keeps the gated page.
pub async fn fetch_bypass(client: &Client, token_url: &str) -> Option<FetchResult> {
    let result = fetch_page(client, token_url).await;
    let usable = (200..400).contains(&result.status) && !result.html.trim().is_empty();
    if usable {
        Some(result)
    } else {
        eprintln!(
            "Warning: Disclaimer bypass failed for {} (status {})",
            token_url, result.status
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    #[test]
    fn test_detects_agree_marker() {
        let doc = Html::parse_document(
            r#"<html><body><div class="one-step-disclaimer-agree"></div></body></html>"#,
        );
        assert!(has_disclaimer(&doc));
    }

    #[test]
    fn test_detects_paragraph_marker() {
        let doc = Html::parse_document(
            r#"<html><body><div class="paragraph--type--one_step_disclaimer"></div></body></html>"#,
        );
        assert!(has_disclaimer(&doc));
    }

    #[test]
    fn test_plain_page_has_no_disclaimer() {
        let doc = Html::parse_document("<html><body><p>content</p></body></html>");
        assert!(!has_disclaimer(&doc));
        assert!(bypass_url(&doc, &base()).is_none());
    }

    #[test]
    fn test_bypass_url_resolved_against_page() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="one-step-disclaimer-agree">
                    <a href="/page?token=a1b2">I agree</a>
                </div>
            </body></html>"#,
        );
        assert_eq!(
            bypass_url(&doc, &base()).as_deref(),
            Some("https://example.com/page?token=a1b2")
        );
    }

    #[test]
    fn test_disclaimer_without_token_link_yields_no_bypass() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="one-step-disclaimer-agree"><a href="/elsewhere">Go</a></div>
            </body></html>"#,
        );
        assert!(bypass_url(&doc, &base()).is_none());
    }
}
