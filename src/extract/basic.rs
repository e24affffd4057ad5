// src/extract/basic.rs
// =============================================================================
// Single-block extractors: banners, rich text, quotes, CTAs and the
// HTML-editor family.
//
// Every extractor follows the same contract:
// - first test whether the node (or a descendant) carries the target
//   paragraph type; return false untouched if not
// - read the conventional field classes, falling back to the secondary
//   convention names where the theme varies
// - push one normalized record and return true (claimed)
//
// Returning true without pushing is allowed where the content is absorbed
// elsewhere (see structure.rs for accordion items).
// =============================================================================

use regex::Regex;
use scraper::ElementRef;

use crate::dom::{
    class_attr, collect_links, find_first, first_image_src, image_meta, is_component_type,
    normalize_url, sel, strip_tags, text_of, type_root,
};
use crate::extract::record::{ComponentRecord, CtaStyle, HtmlEditorKind, MediaKind, ModelViewerKind};
use crate::extract::ExtractCtx;

fn nonempty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Primary rich-text field by convention name, falling back to the
/// introduction field used by older templates.
fn rich_text_field<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    find_first(el, &sel(".field--name-field-text-content"))
        .or_else(|| find_first(el, &sel(".field--name-field-introduction")))
}

fn title_paragraph(el: ElementRef) -> Option<String> {
    find_first(el, &sel(".paragraph--type--title")).map(text_of).and_then(nonempty)
}

pub fn extract_jumbotron(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "jumbotron") {
        return false;
    }

    let title = find_first(item, &sel("h1, h2, h3, h4, h5, .title"))
        .map(text_of)
        .and_then(nonempty);
    let image = first_image_src(item, &ctx.base);

    out.push(ComponentRecord::Jumbotron { title, image });
    true
}

pub fn extract_image_wrapper(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "image-wide") {
        return false;
    }

    if let Some(wrapper) = find_first(item, &sel(".image-wide-image-wrapper")) {
        let mut text = find_first(wrapper, &sel("h1, h2, h3, strong, b"))
            .map(text_of)
            .unwrap_or_default();
        if text.is_empty() {
            text = text_of(wrapper);
        }

        let mut description = wrapper
            .select(&sel("p"))
            .map(text_of)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if description.is_empty() {
            // own text nodes only, minus the heading we already captured
            description = wrapper
                .children()
                .filter_map(|n| n.value().as_text().map(|t| t.trim().to_string()))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !text.is_empty() {
                if let Some(rest) = description.strip_prefix(text.as_str()) {
                    description = rest.trim().to_string();
                }
            }
        }

        let image = first_image_src(wrapper, &ctx.base);
        out.push(ComponentRecord::ImageWrapper {
            text: nonempty(text),
            description: nonempty(description),
            image,
        });
    }
    true
}

pub fn extract_mini_banner(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "mini-banner") {
        return false;
    }

    let title = find_first(item, &sel(".field--name-field-title"))
        .map(text_of)
        .and_then(nonempty);
    let image = find_first(item, &sel(".field--name-field-image-media"))
        .and_then(|wrap| first_image_src(wrap, &ctx.base));

    out.push(ComponentRecord::MiniBanner { title, image });
    true
}

pub fn extract_quote(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "quote") {
        return false;
    }

    let text = find_first(item, &sel(".field--name-field-text"))
        .map(text_of)
        .unwrap_or_default();
    let author = find_first(item, &sel(".author-text-wrapper .field--name-field-title"))
        .map(text_of)
        .unwrap_or_default();
    let designation = find_first(
        item,
        &sel(".author-text-wrapper .field--name-field-author-designation"),
    )
    .map(text_of)
    .unwrap_or_default();

    out.push(ComponentRecord::Quote {
        text,
        author,
        designation,
    });
    true
}

pub fn extract_text(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "text") {
        return false;
    }

    let rich = rich_text_field(item);
    out.push(ComponentRecord::Text {
        title: title_paragraph(item),
        html: rich.map(|r| r.inner_html()).and_then(nonempty),
        text: rich.map(text_of).and_then(nonempty),
    });
    true
}

pub fn extract_text_with_image(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    // An accordion container takes precedence; flattening its items into a
    // generic text block would lose the accordion structure.
    if is_component_type(item, "accordion") || is_component_type(item, "accordion-item") {
        return false;
    }
    if !is_component_type(item, "text-with-image") {
        return false;
    }

    let image = first_image_src(item, &ctx.base);
    let rich = rich_text_field(item);
    let title = title_paragraph(item);
    let html = rich.map(|r| r.inner_html()).and_then(nonempty);
    let text = rich.map(text_of).and_then(nonempty);

    // Content-validation gate: decline silently when there is nothing
    // substantive to export.
    let has_html = html
        .as_deref()
        .map(|h| !strip_tags(h).is_empty())
        .unwrap_or(false);
    if image.is_none() && title.is_none() && !has_html && text.is_none() {
        return false;
    }

    out.push(ComponentRecord::TextWithImage {
        image,
        title,
        html,
        text,
    });
    true
}

pub fn extract_section_introduction(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "section-introduction") {
        return false;
    }

    let title = find_first(item, &sel(".field--name-field-title"))
        .map(text_of)
        .and_then(nonempty);
    let image = find_first(item, &sel(".field--name-field-media"))
        .and_then(|wrap| first_image_src(wrap, &ctx.base));

    out.push(ComponentRecord::SectionIntroduction { title, image });
    true
}

// Sub-kind priority: YouTube embed > generic iframe > table > file-download
// link > plain HTML.
fn classify_html_editor(el: ElementRef) -> HtmlEditorKind {
    let youtube = Regex::new(r"(?i)youtube\.com|youtu\.be|youtube-nocookie\.com").unwrap();
    let mut saw_iframe = false;
    for iframe in el.select(&sel("iframe")) {
        saw_iframe = true;
        let src = iframe.value().attr("src").unwrap_or("");
        if youtube.is_match(src) {
            return HtmlEditorKind::YoutubeVideo;
        }
    }
    if saw_iframe {
        return HtmlEditorKind::Iframe;
    }
    if find_first(el, &sel("table")).is_some() {
        return HtmlEditorKind::Table;
    }

    let download_ext = Regex::new(r"(?i)\.(pdf|docx?|xlsx?|pptx?|zip|csv|txt)($|[?#])").unwrap();
    let download_class = Regex::new(r"(?i)file_download_link|file-download|download-link").unwrap();
    for anchor in el.select(&sel("a")) {
        let href = anchor.value().attr("href").unwrap_or("");
        let class = anchor.value().attr("class").unwrap_or("");
        if download_ext.is_match(href) || download_class.is_match(class) {
            return HtmlEditorKind::FileDownload;
        }
    }

    HtmlEditorKind::Html
}

pub fn extract_html_editor(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "html-editor") {
        return false;
    }

    let field = find_first(item, &sel(".field--name-field-html-editor"));
    out.push(ComponentRecord::HtmlEditor {
        kind: classify_html_editor(item),
        title: title_paragraph(item),
        html: field.map(|f| f.inner_html()).and_then(nonempty),
        text: field.map(text_of).and_then(nonempty),
    });
    true
}

pub fn extract_cta_button(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "cta-button") {
        Some(root) => root,
        None => return false,
    };

    let anchor = match find_first(root, &sel(".field--name-field-cta a")) {
        Some(a) => a,
        None => return false,
    };

    let text = nonempty(text_of(anchor));
    let url = anchor
        .value()
        .attr("href")
        .map(|href| normalize_url(href, &ctx.base));

    // Modifier classes on the paragraph element: color, arrow, alignment.
    let mut style = CtaStyle::default();
    for token in class_attr(&root).split_whitespace() {
        match token {
            "blue" | "green" | "red" | "orange" | "yellow" | "grey" | "black" => {
                style.color = Some(token.to_string())
            }
            "arrow" => style.arrow = true,
            "left" => style.align = Some("left".to_string()),
            "right" => style.align = Some("right".to_string()),
            _ => {}
        }
    }

    out.push(ComponentRecord::CtaButton {
        text,
        url,
        style: if style.is_empty() { None } else { Some(style) },
    });
    true
}

pub fn extract_info_box(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "info-box") {
        Some(root) => root,
        None => return false,
    };

    let intro = find_first(root, &sel(".field--name-field-introduction"))
        .map(text_of)
        .and_then(nonempty);
    let desc = find_first(root, &sel(".field--name-field-description"));

    let links = desc
        .map(|d| {
            let mut links = collect_links(d);
            for link in &mut links {
                if let Some(url) = link.url.take() {
                    link.url = Some(normalize_url(&url, &ctx.base));
                }
            }
            links
        })
        .unwrap_or_default();

    out.push(ComponentRecord::InfoBox {
        intro,
        html: desc.map(|d| d.inner_html().trim().to_string()).and_then(nonempty),
        text: desc.map(text_of).and_then(nonempty),
        links,
    });
    true
}

pub fn extract_link_list(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "list-links") {
        return false;
    }

    out.push(ComponentRecord::ListLinks {
        title: find_first(item, &sel(".field--name-field-title"))
            .map(text_of)
            .and_then(nonempty),
        description: find_first(item, &sel(".field--name-field-description"))
            .map(|d| d.inner_html())
            .and_then(nonempty),
        links: collect_links(item),
    });
    true
}

pub fn extract_link_list_alt(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "link-list") {
        return false;
    }

    out.push(ComponentRecord::LinkListAlternative {
        title: find_first(item, &sel(".field--name-field-title"))
            .map(text_of)
            .and_then(nonempty),
        links: collect_links(item),
    });
    true
}

pub fn extract_disclaimer(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let matches = is_component_type(item, "one-step-disclaimer")
        || is_component_type(item, "one_step_disclaimer")
        || find_first(item, &sel(".one-step-disclaimer-agree")).is_some();
    if !matches {
        return false;
    }

    let continue_url = find_first(item, &sel("a[href*=\"token=\"]"))
        .and_then(|a| a.value().attr("href"))
        .map(|href| normalize_url(href, &ctx.base));

    out.push(ComponentRecord::Disclaimer { continue_url });
    true
}

pub fn extract_media(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    // Video detection first: a video embed may carry a poster image that
    // would otherwise classify it as an image.
    if let Some(video) = find_first(item, &sel(".media-video-embed")) {
        let source = find_first(video, &sel("iframe"))
            .and_then(|f| f.value().attr("src"))
            .map(|src| normalize_url(src, &ctx.base));
        out.push(ComponentRecord::Media {
            kind: MediaKind::Video,
            source,
            image: None,
        });
        return true;
    }

    if let Some(image_wrap) = find_first(item, &sel(".media-image")) {
        let image = find_first(image_wrap, &sel("img")).map(|img| image_meta(img, &ctx.base));
        out.push(ComponentRecord::Media {
            kind: MediaKind::Image,
            source: None,
            image,
        });
        return true;
    }

    let has_media_class = class_attr(&item)
        .split_whitespace()
        .any(|t| t.starts_with("media--"))
        || find_first(item, &sel("[class*=\"media--\"]")).is_some();
    if has_media_class {
        out.push(ComponentRecord::Media {
            kind: MediaKind::Generic,
            source: None,
            image: None,
        });
        return true;
    }

    false
}

pub fn extract_model_viewer(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "d-model-viewer") && !is_component_type(item, "_d-model-viewer") {
        return false;
    }

    let kind = classify_model_viewer(item);
    let image = find_first(item, &sel("img")).map(|img| image_meta(img, &ctx.base));

    out.push(ComponentRecord::ModelViewer { kind, image });
    true
}

// 3D anchors: a <model-viewer> element or the no-poster/viewer-content-wrap
// classes. 2D anchors: the two-d-* sidebar/image/hotspot markers. Anything
// else falls back to the generic viewer.
fn classify_model_viewer(el: ElementRef) -> ModelViewerKind {
    if find_first(el, &sel("model-viewer")).is_some() {
        return ModelViewerKind::ThreeD;
    }
    let three_d_classes = ["no-poster", "no-poster-button", "viewer-content-wrap"];
    let two_d_classes = [
        "two-d-model-viewer-sidebar",
        "model-viewer-image",
        "two-d-image",
        "2d-hotspot-button",
        "2d-hotspot-description",
        "two-d-hotspot-description",
    ];

    let tokens: Vec<&str> = class_attr(&el).split_whitespace().collect();
    if three_d_classes.iter().any(|c| tokens.contains(c)) {
        return ModelViewerKind::ThreeD;
    }
    if two_d_classes
        .iter()
        .any(|c| tokens.iter().any(|t| t == c || t.starts_with(c)))
    {
        return ModelViewerKind::TwoD;
    }

    let two_d_descendants = sel(
        "[class*=\"two-d-model-viewer-sidebar\"], [class*=\"2d-hotspot-button\"], [id^=\"2d-hotspot-\"]",
    );
    if el.select(&two_d_descendants).next().is_some() {
        return ModelViewerKind::TwoD;
    }
    let three_d_descendants =
        sel("[class*=\"no-poster\"], [class*=\"viewer-content-wrap\"]");
    if el.select(&three_d_descendants).next().is_some() {
        return ModelViewerKind::ThreeD;
    }

    ModelViewerKind::Fallback
}
