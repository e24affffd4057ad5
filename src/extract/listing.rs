// src/extract/listing.rs
// =============================================================================
// Listing extractors: components whose output is a collection of repeated
// sub-entries (cluster tiles, teaser cards, news views, profiles, career
// link groups).
//
// The news views all render through the same Drupal view markup
// (.view-content article), so their item walkers share helpers here.
// =============================================================================

use regex::Regex;
use scraper::ElementRef;

use crate::dom::{
    class_attr, collapsed_text, find_first, first_image_src, image_meta, is_component_type,
    normalize_url, sel, text_of, type_root,
};
use crate::extract::record::{
    CareerSection, ClusterItem, ComponentRecord, FeaturedCta, FormInput, Link, NewsTeaser,
    ParagraphEntry, Profile, SearchForm, Teaser,
};
use crate::extract::ExtractCtx;

fn nonempty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn first_text(el: ElementRef, selector: &str) -> Option<String> {
    find_first(el, &sel(selector)).map(text_of).and_then(nonempty)
}

fn first_anchor_href(el: ElementRef) -> Option<String> {
    el.select(&sel("a"))
        .find_map(|a| a.value().attr("href"))
        .map(str::to_string)
}

pub fn extract_cluster_block(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "cluster-composition") {
        return false;
    }

    let headline = first_text(
        item,
        ".cluster_headline .field--name-field-headline, .field--name-field-headline",
    );

    // Tile titles sometimes end in stray punctuation left over from inline
    // editing; strip it so report grouping stays stable.
    let trailing_punct = Regex::new(r"[\s.,!?:;\-\u{2013}\u{2014}]+$").unwrap();

    let mut blocks = Vec::new();
    for tile in item.select(&sel(".cluster-item")) {
        let title = first_text(tile, ".field--name-field-title")
            .map(|t| trailing_punct.replace(&t, "").into_owned())
            .and_then(nonempty);
        let kicker = first_text(
            tile,
            ".field--name-field-kicker.field__item, .field--name-field-kicker",
        );
        let read_more = first_text(tile, ".read-more, a.read-more, span.read-more")
            .unwrap_or_default();
        let link = first_anchor_href(tile).map(|href| normalize_url(&href, &ctx.base));
        let image = find_first(tile, &sel("img"))
            .map(|img| image_meta(img, &ctx.base))
            .unwrap_or_default();

        blocks.push(ClusterItem {
            title,
            kicker,
            read_more,
            link,
            image,
        });
    }

    if !blocks.is_empty() {
        out.push(ComponentRecord::ClusterBlock { headline, blocks });
    }
    true
}

pub fn extract_featured_contents(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "featured-contents") {
        return false;
    }

    let title = first_text(item, ".field--name-field-title");

    let mut ctas = Vec::new();
    for tile in item
        .select(&sel(".field--name-field-featured-contents > .field__item"))
        .take(3)
    {
        let link = first_anchor_href(tile).map(|href| normalize_url(&href, &ctx.base));
        let image = first_image_src(tile, &ctx.base);
        let listing_title = first_text(tile, ".listing-title, .field--name-field-listing-title");
        let link_text = first_text(tile, ".read-more")
            .or_else(|| find_first(tile, &sel("a")).map(text_of).and_then(nonempty));

        ctas.push(FeaturedCta {
            link,
            image,
            listing_title,
            link_text,
        });
    }

    out.push(ComponentRecord::FeaturedContents { title, ctas });
    true
}

/// Grid layouts carry two kinds of children: teaser cards and nested
/// link-list paragraphs. Either may be absent; the extractor claims the node
/// only when it produced at least one record.
pub fn extract_grid_layout(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "grid-layout") {
        return false;
    }

    let mut teasers = Vec::new();
    for card in item.select(&sel(".paragraph--type--teaser-card")) {
        teasers.push(Teaser {
            image: first_image_src(card, &ctx.base),
            title: first_text(card, ".teaser-content-wrapper .field--name-field-title"),
            content: first_text(card, ".teaser-content-wrapper .field--name-field-description"),
            link: first_anchor_href(card).map(|href| normalize_url(&href, &ctx.base)),
            kicker: first_text(card, ".field--name-field-kicker"),
        });
    }

    let mut entries = Vec::new();
    for list in item.select(&sel(".field__item > .paragraph--type--list-links")) {
        entries.push(ParagraphEntry {
            title: first_text(list, ".field--name-field-title"),
            description: find_first(list, &sel(".field--name-field-description"))
                .map(|d| d.inner_html())
                .and_then(nonempty),
            links: crate::dom::collect_links(list),
        });
    }

    let mut produced = false;
    if !teasers.is_empty() {
        out.push(ComponentRecord::TeaserList {
            teaser_entries: teasers,
        });
        produced = true;
    }
    if !entries.is_empty() {
        out.push(ComponentRecord::ParagraphList {
            paragraph_entries: entries,
        });
        produced = true;
    }
    produced
}

fn teaser_date(article: ElementRef) -> Option<String> {
    find_first(article, &sel("time")).and_then(|t| {
        t.value()
            .attr("datetime")
            .map(str::to_string)
            .or_else(|| nonempty(text_of(t)))
    })
}

fn article_link(article: ElementRef, ctx: &ExtractCtx) -> Option<String> {
    article
        .value()
        .attr("about")
        .map(str::to_string)
        .or_else(|| {
            find_first(article, &sel(".news-links a"))
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string)
        })
        .or_else(|| first_anchor_href(article))
        .map(|href| normalize_url(&href, &ctx.base))
}

pub fn extract_latest_news(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "latest-news") {
        return false;
    }

    let headline = first_text(item, ".field--name-field-title.field__item, .field--name-field-title");

    let mut items = Vec::new();
    for article in item.select(&sel(".view-content article")) {
        items.push(NewsTeaser {
            date: teaser_date(article),
            topline: None,
            title: first_text(article, ".news-item-title"),
            link: article_link(article, ctx),
            read_more: first_text(article, ".read-more"),
            image: None,
        });
    }

    out.push(ComponentRecord::LatestNews { headline, items });
    true
}

pub fn extract_news_overview(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "news-overview-block") {
        Some(root) => root,
        None => return false,
    };

    let mut items = Vec::new();
    for article in root.select(&sel(".view-content article")) {
        items.push(NewsTeaser {
            date: teaser_date(article),
            topline: first_text(article, ".news-topline"),
            title: find_first(article, &sel(".news-title"))
                .map(collapsed_text)
                .and_then(nonempty),
            link: article_link(article, ctx),
            read_more: first_text(article, ".read-more"),
            image: find_first(article, &sel(".news-img img")).and_then(|img| {
                img.value()
                    .attr("src")
                    .or_else(|| img.value().attr("data-src"))
                    .map(|src| normalize_url(src, &ctx.base))
            }),
        });
    }

    let page_range = first_text(root, ".pagination-count .page-count");
    let total = first_text(root, ".pagination-count .total-news-count").and_then(|t| {
        let digits = Regex::new(r"(\d[\d,]*)").unwrap();
        digits
            .captures(&t)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<u64>().ok())
    });

    out.push(ComponentRecord::NewsOverview {
        items,
        page_range,
        total,
    });
    true
}

pub fn extract_local_news(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "local-news-content") {
        return false;
    }

    let mut items = Vec::new();
    for article in item.select(&sel(".view-content article")) {
        items.push(crate::extract::record::LocalNewsItem {
            date: teaser_date(article),
            title: first_text(article, ".news-title")
                .or_else(|| first_text(article, "h4, h3, h2")),
            link: article_link(article, ctx),
            summary: first_text(
                article,
                ".field--name-field-sublines .field__item, .text-formatted.field__item",
            ),
        });
    }

    out.push(ComponentRecord::LocalNews { items });
    true
}

pub fn extract_profile_list(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "profile-card") {
        return false;
    }

    let mut profiles = Vec::new();
    for card in item.select(&sel(".paragraph--type--profile-card")) {
        // Tracking-wrapped cards keep the real target in a data attribute.
        let link = first_anchor_href(card)
            .or_else(|| {
                find_first(card, &sel("[data-no-tracking-url]"))
                    .and_then(|e| e.value().attr("data-no-tracking-url"))
                    .map(str::to_string)
            })
            .map(|href| normalize_url(&href, &ctx.base));

        profiles.push(Profile {
            name: first_text(card, ".field--name-field-title"),
            role: first_text(card, ".field--name-field-short-description"),
            image: find_first(card, &sel("img"))
                .map(|img| image_meta(img, &ctx.base))
                .unwrap_or_default(),
            link,
            link_text: first_text(card, ".read-more")
                .or_else(|| find_first(card, &sel("a")).map(text_of).and_then(nonempty)),
        });
    }

    if profiles.is_empty() {
        return false;
    }
    out.push(ComponentRecord::ProfileList { profiles });
    true
}

fn extract_form(el: ElementRef) -> Option<SearchForm> {
    let form = find_first(el, &sel("form.job-search-form, form"))?;
    let inputs = form
        .select(&sel("input"))
        .map(|input| FormInput {
            name: input.value().attr("name").map(str::to_string),
            id: input.value().attr("id").map(str::to_string),
            placeholder: input.value().attr("placeholder").map(str::to_string),
            value: input.value().attr("value").unwrap_or("").to_string(),
        })
        .collect();
    Some(SearchForm {
        action: form.value().attr("action").map(str::to_string),
        id: form.value().attr("id").map(str::to_string),
        inputs,
    })
}

fn career_links_of(section: ElementRef, ctx: &ExtractCtx) -> Vec<Link> {
    section
        .select(&sel(".field--name-field-links a, .field--name-field-link a"))
        .map(|a| Link {
            text: nonempty(text_of(a)),
            url: a
                .value()
                .attr("href")
                .map(|href| normalize_url(href, &ctx.base)),
        })
        .collect()
}

fn nearest_career_title(el: ElementRef) -> Option<String> {
    el.ancestors().filter_map(ElementRef::wrap).find_map(|anc| {
        if class_attr(&anc)
            .split_whitespace()
            .any(|t| t == "paragraph--type--career-link")
        {
            first_text(anc, ".field--name-field-title")
        } else {
            None
        }
    })
}

/// Job search aggregates career links by section title, in first-seen order,
/// with (url, text) pairs deduplicated across the two discovery passes.
pub fn extract_job_search(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "job-search") {
        return false;
    }

    let headline = first_text(item, ".field--name-field-headline");
    let form = extract_form(item);

    let mut sections: Vec<CareerSection> = Vec::new();
    let mut seen: Vec<(Option<String>, Option<String>)> = Vec::new();

    let mut add = |sections: &mut Vec<CareerSection>, title: Option<String>, links: Vec<Link>| {
        for link in links {
            let key = (link.url.clone(), link.text.clone());
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            match sections.iter_mut().find(|s| s.title == title) {
                Some(section) => section.links.push(link),
                None => sections.push(CareerSection {
                    title: title.clone(),
                    links: vec![link],
                }),
            }
        }
    };

    for group in item.select(&sel(".paragraph--type--career-link")) {
        let title = first_text(group, ".field--name-field-title");
        let links = career_links_of(group, ctx);
        add(&mut sections, title, links);
    }

    // Second pass over bare field items in the wrapper, for templates that
    // render the links outside their career-link paragraph.
    for field_item in item.select(&sel(
        ".job-content-wrapper .field--name-field-links > .field__item",
    )) {
        let title = nearest_career_title(field_item);
        let links = field_item
            .select(&sel("a"))
            .map(|a| Link {
                text: nonempty(text_of(a)),
                url: a
                    .value()
                    .attr("href")
                    .map(|href| normalize_url(href, &ctx.base)),
            })
            .collect();
        add(&mut sections, title, links);
    }

    out.push(ComponentRecord::JobSearch {
        headline,
        form,
        career_links: sections,
    });
    true
}

pub fn extract_job_search_banner(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "job-search-banner") {
        Some(root) => root,
        None => return false,
    };

    let image = find_first(root, &sel(".field--name-image img, .field--name-field-image img"))
        .map(|img| image_meta(img, &ctx.base));
    let kicker = first_text(root, ".field--name-field-kicker");
    let title = first_text(root, ".field--name-field-title");
    let form = extract_form(root);

    let mut career_links = Vec::new();
    for group in root.select(&sel(".paragraph--type--career-link")) {
        career_links.push(CareerSection {
            title: first_text(group, ".field--name-field-title"),
            links: career_links_of(group, ctx),
        });
    }

    out.push(ComponentRecord::JobSearchBanner {
        kicker,
        title,
        image,
        form,
        career_links,
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;
    use url::Url;

    fn ctx() -> ExtractCtx {
        ExtractCtx::new(Url::parse("https://example.com/careers").unwrap())
    }

    fn field_item(doc: &Html) -> ElementRef {
        doc.select(&sel(".field__item")).next().unwrap()
    }

    #[test]
    fn test_cluster_block_cleans_trailing_punctuation() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--cluster-composition">
                <div class="cluster_headline"><div class="field--name-field-headline">Our Fields</div></div>
                <div class="cluster-item">
                    <div class="field--name-field-title">Corn Seeds...</div>
                    <span class="read-more">More</span>
                    <a href="/corn"><img src="/corn.jpg"></a>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_cluster_block(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::ClusterBlock { headline, blocks } => {
                assert_eq!(headline.as_deref(), Some("Our Fields"));
                assert_eq!(blocks[0].title.as_deref(), Some("Corn Seeds"));
                assert_eq!(blocks[0].read_more, "More");
                assert_eq!(blocks[0].link.as_deref(), Some("https://example.com/corn"));
                assert_eq!(
                    blocks[0].image.src.as_deref(),
                    Some("https://example.com/corn.jpg")
                );
            }
            other => panic!("expected ClusterBlock, got {:?}", other),
        }
    }

    #[test]
    fn test_cluster_block_without_tiles_claims_without_record() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--cluster-composition"></div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_cluster_block(&mut ctx(), field_item(&doc), &mut out));
        assert!(out.is_empty());
    }

    #[test]
    fn test_featured_contents_caps_at_three_ctas() {
        let tile = r#"<div class="field__item"><a href="/x"><img src="/x.jpg"></a>
            <div class="listing-title">T</div><span class="read-more">Read</span></div>"#;
        let html = format!(
            r#"<div class="field__item"><div class="paragraph--type--featured-contents">
                <div class="field--name-field-title">Featured</div>
                <div class="field--name-field-featured-contents">{}{}{}{}</div>
            </div></div>"#,
            tile, tile, tile, tile
        );
        let doc = Html::parse_fragment(&html);
        let mut out = Vec::new();
        assert!(extract_featured_contents(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::FeaturedContents { title, ctas } => {
                assert_eq!(title.as_deref(), Some("Featured"));
                assert_eq!(ctas.len(), 3);
                assert_eq!(ctas[0].link_text.as_deref(), Some("Read"));
            }
            other => panic!("expected FeaturedContents, got {:?}", other),
        }
    }

    #[test]
    fn test_grid_layout_produces_both_record_kinds() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--grid-layout">
                <div class="paragraph--type--teaser-card">
                    <a href="/seed"><img src="/seed.jpg"></a>
                    <div class="teaser-content-wrapper">
                        <div class="field--name-field-title">Seed</div>
                        <div class="field--name-field-description">Good seed</div>
                    </div>
                </div>
                <div class="field__item">
                    <div class="paragraph--type--list-links">
                        <div class="field--name-field-title">Links</div>
                        <a href="/a">A</a>
                    </div>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_grid_layout(&mut ctx(), field_item(&doc), &mut out));
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].display_name(), "Teaser List");
        assert_eq!(out[1].display_name(), "Paragraph List");
    }

    #[test]
    fn test_grid_layout_declines_when_empty() {
        let html = r#"<div class="field__item"><div class="paragraph--type--grid-layout"></div></div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(!extract_grid_layout(&mut ctx(), field_item(&doc), &mut out));
    }

    #[test]
    fn test_news_overview_parses_pagination_total() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--news-overview-block">
                <div class="view-content">
                    <article about="/news/1">
                        <time datetime="2024-03-01">March 1</time>
                        <div class="news-topline">Press</div>
                        <div class="news-title">Harvest   Results</div>
                        <div class="news-img"><img data-src="/n1.jpg"></div>
                    </article>
                </div>
                <div class="pagination-count">
                    <span class="page-count">1-10</span>
                    <span class="total-news-count">of 1,234 items</span>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_news_overview(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::NewsOverview {
                items,
                page_range,
                total,
            } => {
                assert_eq!(items[0].title.as_deref(), Some("Harvest Results"));
                assert_eq!(items[0].link.as_deref(), Some("https://example.com/news/1"));
                assert_eq!(items[0].image.as_deref(), Some("https://example.com/n1.jpg"));
                assert_eq!(page_range.as_deref(), Some("1-10"));
                assert_eq!(*total, Some(1234));
            }
            other => panic!("expected NewsOverview, got {:?}", other),
        }
    }

    #[test]
    fn test_job_search_dedupes_across_passes() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--job-search">
                <div class="field--name-field-headline">Find a job</div>
                <form class="job-search-form" action="/search" id="jobs">
                    <input name="q" placeholder="Keyword">
                </form>
                <div class="job-content-wrapper">
                    <div class="paragraph--type--career-link">
                        <div class="field--name-field-title">Engineering</div>
                        <div class="field--name-field-links">
                            <div class="field__item"><a href="/jobs/1">Agronomist</a></div>
                            <div class="field__item"><a href="/jobs/2">Breeder</a></div>
                        </div>
                    </div>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_job_search(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::JobSearch {
                headline,
                form,
                career_links,
            } => {
                assert_eq!(headline.as_deref(), Some("Find a job"));
                let form = form.as_ref().unwrap();
                assert_eq!(form.action.as_deref(), Some("/search"));
                assert_eq!(form.inputs[0].name.as_deref(), Some("q"));
                // both links discovered by both passes, kept once each
                assert_eq!(career_links.len(), 1);
                assert_eq!(career_links[0].title.as_deref(), Some("Engineering"));
                assert_eq!(career_links[0].links.len(), 2);
            }
            other => panic!("expected JobSearch, got {:?}", other),
        }
    }

    #[test]
    fn test_profile_list_tracking_url_fallback() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--profile-card" data-nothing="x">
                <div class="paragraph--type--profile-card">
                    <img src="/jane.jpg" alt="Jane">
                    <div class="field--name-field-title">Jane Doe</div>
                    <div class="field--name-field-short-description">Director</div>
                    <div data-no-tracking-url="/people/jane"><span class="read-more">Profile</span></div>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_profile_list(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::ProfileList { profiles } => {
                assert_eq!(profiles[0].name.as_deref(), Some("Jane Doe"));
                assert_eq!(
                    profiles[0].link.as_deref(),
                    Some("https://example.com/people/jane")
                );
                assert_eq!(profiles[0].link_text.as_deref(), Some("Profile"));
            }
            other => panic!("expected ProfileList, got {:?}", other),
        }
    }

    #[test]
    fn test_latest_news_items() {
        let html = r#"<div class="field__item">
            <div class="paragraph--type--latest-news">
                <div class="field--name-field-title field__item">Latest</div>
                <div class="view-content">
                    <article>
                        <time datetime="2024-05-05">5 May</time>
                        <div class="news-item-title">New hybrid launched</div>
                        <a href="/news/hybrid">Read more</a>
                    </article>
                </div>
            </div>
        </div>"#;
        let doc = Html::parse_fragment(html);
        let mut out = Vec::new();
        assert!(extract_latest_news(&mut ctx(), field_item(&doc), &mut out));
        match &out[0] {
            ComponentRecord::LatestNews { headline, items } => {
                assert_eq!(headline.as_deref(), Some("Latest"));
                assert_eq!(items[0].date.as_deref(), Some("2024-05-05"));
                assert_eq!(
                    items[0].link.as_deref(),
                    Some("https://example.com/news/hybrid")
                );
            }
            other => panic!("expected LatestNews, got {:?}", other),
        }
    }
}
