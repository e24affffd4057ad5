// src/dom.rs
// =============================================================================
// This module holds the DOM helpers shared by the classifier and extractors.
//
// Key functionality:
// - Component type resolution from Drupal's class conventions
//   (paragraph--type--<slug>), checking the node itself before children
//   before arbitrary descendants
// - URL normalization: relative href/src values resolved against the page
// - Image metadata extraction with data-src/data-width/data-height fallbacks
//   (lazy-loaded images keep their real attributes in data-*)
// - Page metadata (title, meta key/values, canonical link)
//
// We only ever read from the parsed DOM; nothing here mutates it.
// =============================================================================

use crate::extract::record::{ImageMeta, Link, PageMetadata};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

const TYPE_PREFIX: &str = "paragraph--type--";

/// Parses a CSS selector that is known-valid at compile time.
/// All selectors in this crate are string constants, so a parse failure is a
/// programmer error and panicking is the right response.
pub fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// First descendant matching the selector, like jQuery's .find(..).first().
pub fn find_first<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    el.select(selector).next()
}

/// Full text content of the element's subtree, trimmed.
pub fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text content with internal whitespace runs collapsed to single spaces.
pub fn collapsed_text(el: ElementRef) -> String {
    let raw = el.text().collect::<String>();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Class attribute of the element, or "" when absent.
pub fn class_attr<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().attr("class").unwrap_or("")
}

fn type_token_in(class: &str) -> Option<String> {
    class
        .split_whitespace()
        .find(|token| token.starts_with(TYPE_PREFIX))
        .map(|token| token[TYPE_PREFIX.len()..].to_string())
        .filter(|slug| !slug.is_empty())
}

/// Resolves the logical paragraph type of a dispatch node.
///
/// Resolution order: (a) the node's own class list, (b) an immediate child
/// element, (c) the nearest typed descendant anywhere in the subtree.
/// Drupal sometimes wraps the real paragraph one level inside generic field
/// markup, so a plain descendant-first search would misclassify nodes that
/// are themselves already typed.
pub fn resolve_type(el: ElementRef) -> Option<String> {
    if let Some(slug) = type_token_in(class_attr(&el)) {
        return Some(slug);
    }

    for child in el.children().filter_map(ElementRef::wrap) {
        if let Some(slug) = type_token_in(class_attr(&child)) {
            return Some(slug);
        }
    }

    let descendant = sel(&format!("[class*=\"{}\"]", TYPE_PREFIX));
    el.select(&descendant)
        .find_map(|d| type_token_in(class_attr(&d)))
}

/// True when the node itself or any descendant carries the given paragraph
/// type. Extractors use this as their entry test, since the same paragraph
/// may appear as the dispatch node or nested under a generic wrapper.
pub fn is_component_type(el: ElementRef, slug: &str) -> bool {
    let token = format!("{}{}", TYPE_PREFIX, slug);
    if class_attr(&el).split_whitespace().any(|t| t == token) {
        return true;
    }
    find_first(el, &sel(&format!(".{}", token))).is_some()
}

/// For extractors matching on self-or-descendant: the node itself when it
/// carries the type, otherwise the first typed descendant.
pub fn type_root<'a>(el: ElementRef<'a>, slug: &str) -> Option<ElementRef<'a>> {
    let token = format!("{}{}", TYPE_PREFIX, slug);
    if class_attr(&el).split_whitespace().any(|t| t == token) {
        return Some(el);
    }
    find_first(el, &sel(&format!(".{}", token)))
}

/// Resolves a possibly-relative URL against the page base. Already-absolute
/// http(s) URLs pass through unchanged; on resolution failure the raw value
/// is kept (matching collaborator expectations: better a relative URL in the
/// output than a dropped link).
pub fn normalize_url(href: &str, base: &Url) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match base.join(href) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

fn attr_nonempty(el: &ElementRef, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extracts {src, alt, width, height} from an <img>, consulting the data-*
/// fallbacks used by the lazy-loading theme.
pub fn image_meta(img: ElementRef, base: &Url) -> ImageMeta {
    let src = attr_nonempty(&img, "src")
        .or_else(|| attr_nonempty(&img, "data-src"))
        .map(|s| normalize_url(&s, base));
    ImageMeta {
        src,
        alt: attr_nonempty(&img, "alt"),
        width: attr_nonempty(&img, "width").or_else(|| attr_nonempty(&img, "data-width")),
        height: attr_nonempty(&img, "height").or_else(|| attr_nonempty(&img, "data-height")),
    }
}

/// First <img> in the subtree as a bare normalized src, if any.
pub fn first_image_src(el: ElementRef, base: &Url) -> Option<String> {
    find_first(el, &sel("img"))
        .and_then(|img| attr_nonempty(&img, "src").or_else(|| attr_nonempty(&img, "data-src")))
        .map(|s| normalize_url(&s, base))
}

/// All anchors in the subtree as {text, url} pairs (href left unresolved,
/// matching the exported shape downstream tools expect).
pub fn collect_links(el: ElementRef) -> Vec<Link> {
    el.select(&sel("a"))
        .map(|a| Link {
            text: Some(text_of(a)).filter(|t| !t.is_empty()),
            url: a.value().attr("href").map(str::to_string),
        })
        .collect()
}

/// Strips markup and collapses entity spaces; used by content-validation
/// gates to decide whether an html field has any substance.
pub fn strip_tags(html: &str) -> String {
    let tags = Regex::new(r"<[^>]*>").unwrap();
    let nbsp = Regex::new(r"(?i)&nbsp;").unwrap();
    let without_tags = tags.replace_all(html, "");
    nbsp.replace_all(&without_tags, " ").trim().to_string()
}

/// Extracts page-level metadata: <title>, every keyed <meta>, and the
/// canonical link.
pub fn page_metadata(doc: &Html, page_url: &str) -> PageMetadata {
    let title = doc
        .select(&sel("title"))
        .next()
        .map(|t| text_of(t))
        .filter(|t| !t.is_empty());

    let mut meta = BTreeMap::new();
    for el in doc.select(&sel("meta")) {
        let key = el
            .value()
            .attr("name")
            .or_else(|| el.value().attr("property"))
            .or_else(|| el.value().attr("itemprop"));
        let content = el
            .value()
            .attr("content")
            .or_else(|| el.value().attr("value"));
        if let (Some(key), Some(content)) = (key, content) {
            meta.insert(key.to_string(), content.to_string());
        }
    }

    let canonical = doc
        .select(&sel("link[rel=\"canonical\"]"))
        .next()
        .and_then(|l| l.value().attr("href"))
        .map(str::to_string);

    PageMetadata {
        title,
        url: page_url.to_string(),
        meta,
        canonical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/page/sub").unwrap()
    }

    fn first_div(doc: &Html) -> ElementRef {
        doc.select(&sel("div")).next().unwrap()
    }

    #[test]
    fn test_resolve_type_prefers_own_class() {
        let html = r#"<div class="paragraph paragraph--type--quote">
            <div class="paragraph--type--title">x</div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        assert_eq!(resolve_type(first_div(&doc)), Some("quote".to_string()));
    }

    #[test]
    fn test_resolve_type_checks_immediate_child_before_descendant() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--jumbotron">
                <div class="paragraph--type--title">x</div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        assert_eq!(resolve_type(first_div(&doc)), Some("jumbotron".to_string()));
    }

    #[test]
    fn test_resolve_type_falls_back_to_descendant() {
        let html = r#"<div class="field__item">
            <div class="wrapper"><span class="paragraph--type--text">x</span></div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        assert_eq!(resolve_type(first_div(&doc)), Some("text".to_string()));
    }

    #[test]
    fn test_resolve_type_none_for_untyped_markup() {
        let doc = Html::parse_fragment(r#"<div class="field__item"><p>hi</p></div>"#);
        assert_eq!(resolve_type(first_div(&doc)), None);
    }

    #[test]
    fn test_normalize_url_resolves_relative() {
        assert_eq!(
            normalize_url("/media/photo.jpg", &base()),
            "https://example.com/media/photo.jpg"
        );
        assert_eq!(
            normalize_url("https://other.com/x", &base()),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_image_meta_uses_data_attributes_as_fallback() {
        let html = r#"<div><img data-src="/lazy.jpg" alt="Lazy" data-width="640" data-height="480"></div>"#;
        let doc = Html::parse_fragment(html);
        let img = doc.select(&sel("img")).next().unwrap();
        let meta = image_meta(img, &base());
        assert_eq!(meta.src.as_deref(), Some("https://example.com/lazy.jpg"));
        assert_eq!(meta.alt.as_deref(), Some("Lazy"));
        assert_eq!(meta.width.as_deref(), Some("640"));
        assert_eq!(meta.height.as_deref(), Some("480"));
    }

    #[test]
    fn test_strip_tags_collapses_entities() {
        assert_eq!(strip_tags("<p>&nbsp;&nbsp;</p>"), "");
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_page_metadata() {
        let html = r#"<html><head>
            <title> Seeds &amp; Crops </title>
            <meta name="description" content="All about seeds">
            <meta property="og:title" content="Seeds">
            <link rel="canonical" href="https://example.com/seeds">
        </head><body></body></html>"#;
        let doc = Html::parse_document(html);
        let meta = page_metadata(&doc, "https://example.com/seeds?x=1");
        assert_eq!(meta.title.as_deref(), Some("Seeds & Crops"));
        assert_eq!(meta.meta.get("description").map(String::as_str), Some("All about seeds"));
        assert_eq!(meta.meta.get("og:title").map(String::as_str), Some("Seeds"));
        assert_eq!(meta.canonical.as_deref(), Some("https://example.com/seeds"));
        assert_eq!(meta.url, "https://example.com/seeds?x=1");
    }
}
