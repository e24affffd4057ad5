// src/extract/mod.rs
// =============================================================================
// This module is the extraction engine: it walks the dispatch nodes of a
// rendered page and runs each one through an ordered extractor chain until
// one claims it.
//
// Key pieces:
// - ExtractCtx: page base URL plus the missing-implementation tally
// - Dispatch contexts: the main content region and the middle/right columns
//   of a three-column layout, each with its own chain
// - ThreeColumns handling: the container extractor recurses into the column
//   regions with their respective dispatchers
//
// A dispatch node with a recognized type that no extractor claims is counted
// in the tally and reported at the end of the run; it is never fatal.
// =============================================================================

pub mod basic;
pub mod listing;
pub mod record;
pub mod structure;

use scraper::ElementRef;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::dom::{find_first, is_component_type, resolve_type, sel};
use record::ComponentRecord;

/// Which region of the page a dispatch node was found in. The tally keys on
/// this so the same unhandled type in different regions reports separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DispatchContext {
    Main,
    MiddleColumn,
    RightColumn,
}

impl fmt::Display for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DispatchContext::Main => "main content",
            DispatchContext::MiddleColumn => "middle column",
            DispatchContext::RightColumn => "right column",
        };
        f.write_str(label)
    }
}

/// Counts of recognized-but-unhandled component types, keyed by region and
/// type slug. BTreeMap keeps the end-of-run summary deterministically ordered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MissingTally {
    counts: BTreeMap<(DispatchContext, String), u32>,
}

impl MissingTally {
    pub fn record(&mut self, context: DispatchContext, slug: &str) {
        *self.counts.entry((context, slug.to_string())).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &MissingTally) {
        for ((context, slug), count) in &other.counts {
            *self.counts.entry((*context, slug.clone())).or_insert(0) += count;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(DispatchContext, String), &u32)> {
        self.counts.iter()
    }

    /// Region-agnostic view, for summaries that only care about the type.
    pub fn by_slug(&self) -> BTreeMap<String, u32> {
        let mut merged = BTreeMap::new();
        for ((_, slug), count) in &self.counts {
            *merged.entry(slug.clone()).or_insert(0) += count;
        }
        merged
    }
}

/// Shared state threaded through every extractor call on a page.
pub struct ExtractCtx {
    pub base: Url,
    pub tally: MissingTally,
}

impl ExtractCtx {
    pub fn new(base: Url) -> Self {
        ExtractCtx {
            base,
            tally: MissingTally::default(),
        }
    }
}

pub type ExtractorFn = fn(&mut ExtractCtx, ElementRef, &mut Vec<ComponentRecord>) -> bool;

// Chain order is behavior: earlier extractors pre-empt later ones when a node
// nests multiple typed paragraphs (e.g. a jumbotron containing a title).
const MAIN_CHAIN: &[ExtractorFn] = &[
    basic::extract_jumbotron,
    listing::extract_job_search_banner,
    basic::extract_cta_button,
    basic::extract_info_box,
    structure::extract_sitemap,
    structure::extract_table,
    basic::extract_text,
    listing::extract_local_news,
    basic::extract_image_wrapper,
    listing::extract_cluster_block,
    listing::extract_featured_contents,
    listing::extract_news_overview,
    listing::extract_latest_news,
    listing::extract_grid_layout,
    listing::extract_job_search,
    basic::extract_mini_banner,
];

const MIDDLE_CHAIN: &[ExtractorFn] = &[
    basic::extract_jumbotron,
    basic::extract_html_editor,
    structure::extract_accordion,
    structure::extract_accordion_item,
    basic::extract_text_with_image,
    listing::extract_grid_layout,
    listing::extract_job_search_banner,
    basic::extract_cta_button,
    basic::extract_info_box,
    structure::extract_sitemap,
    structure::extract_table,
    basic::extract_text,
    listing::extract_local_news,
    listing::extract_news_overview,
    listing::extract_profile_list,
    basic::extract_section_introduction,
    basic::extract_link_list_alt,
    basic::extract_quote,
    basic::extract_media,
    basic::extract_model_viewer,
    basic::extract_disclaimer,
];

const RIGHT_CHAIN: &[ExtractorFn] = &[basic::extract_link_list];

fn run_chain(
    chain: &[ExtractorFn],
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    chain.iter().any(|extract| extract(ctx, item, out))
}

/// Dispatches one top-level page node: the main chain first, then the
/// column chain for the inline-only types (html editors, accordions,
/// quotes) that pages sometimes render without the three-column wrapper.
/// A recognized type neither chain claims is tallied against the main
/// region.
pub fn dispatch_page(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let slug = match resolve_type(item) {
        Some(slug) => slug,
        None => return false,
    };

    let processed = if slug == "content-with-sidebars" {
        extract_three_columns(ctx, item, out)
    } else {
        run_chain(MAIN_CHAIN, ctx, item, out) || run_chain(MIDDLE_CHAIN, ctx, item, out)
    };

    if !processed {
        if slug == "text-with-image" {
            return false;
        }
        eprintln!("Warning: Component implementation missing in main content. Type: {}", slug);
        ctx.tally.record(DispatchContext::Main, &slug);
    }
    processed
}

/// Dispatches one middle-column node. A text-with-image that declined (its
/// content-validation gate found nothing to export) is dropped silently;
/// every other recognized miss is tallied.
pub fn dispatch_middle_column(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let slug = match resolve_type(item) {
        Some(slug) => slug,
        None => return false,
    };

    let processed = run_chain(MIDDLE_CHAIN, ctx, item, out);
    if !processed {
        if slug == "text-with-image" {
            return false;
        }
        eprintln!("Warning: Component implementation missing in middle column. Type: {}", slug);
        ctx.tally.record(DispatchContext::MiddleColumn, &slug);
    }
    processed
}

pub fn dispatch_right_column(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let slug = match resolve_type(item) {
        Some(slug) => slug,
        None => return false,
    };

    let processed = run_chain(RIGHT_CHAIN, ctx, item, out);
    if !processed {
        eprintln!("Warning: Component implementation missing in right column. Type: {}", slug);
        ctx.tally.record(DispatchContext::RightColumn, &slug);
    }
    processed
}

/// The three-column container: recurses into the center and right regions
/// with their own dispatchers and emits one ThreeColumns record holding the
/// ordered child trees.
pub fn extract_three_columns(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "content-with-sidebars") {
        return false;
    }

    let column_markers = sel(
        ".three-columns, .content-area-left-sidebar, .content-area-inner, .content-area-right-sidebar",
    );
    if find_first(item, &column_markers).is_none() {
        // Claimed but empty: the container rendered without any columns.
        return true;
    }

    let mut center = Vec::new();
    if let Some(region) = find_first(item, &sel(".content-area-inner")) {
        for child in region.select(&sel(".field > .field__item")) {
            dispatch_middle_column(ctx, child, &mut center);
        }
    }

    let mut right = Vec::new();
    if let Some(region) = find_first(item, &sel(".content-area-right-sidebar")) {
        for child in region.select(&sel(".field > .field__item")) {
            dispatch_right_column(ctx, child, &mut right);
        }
    }

    // TODO: .content-area-left-sidebar holds the in-page navigation tree;
    // the migration team has not asked for it yet, so it is detected but
    // not exported.

    out.push(ComponentRecord::ThreeColumns { center, right });
    true
}
