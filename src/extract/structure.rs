// src/extract/structure.rs
// =============================================================================
// Structural extractors: components whose value is their nesting rather than
// flat fields (accordions, sitemap trees, tables with paragraph cells).
//
// Accordion items are claimed without emitting a record: the accordion
// container extractor reads them, and letting the item match on its own
// would double-report the content.
// =============================================================================

use scraper::ElementRef;

use crate::dom::{
    find_first, is_component_type, normalize_url, sel, text_of, type_root,
};
use crate::extract::record::{
    AccordionEntry, ComponentRecord, Link, SitemapNode, SitemapSection, TableCell,
};
use crate::extract::ExtractCtx;

fn nonempty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

pub fn extract_accordion(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    if !is_component_type(item, "accordion") {
        return false;
    }

    let mut entries = Vec::new();
    for entry in item.select(&sel(".field--name-field-accordion-item > .field__item")) {
        let title = find_first(entry, &sel(".card-header"))
            .map(text_of)
            .and_then(nonempty);
        let mut content = find_first(entry, &sel(".card-body .field--name-field-description"))
            .map(|d| d.inner_html().trim().to_string())
            .and_then(nonempty);

        if content.is_none() {
            // Older markup has no card body; fall back to the entry text
            // minus the title we already captured.
            let mut text = text_of(entry);
            if let Some(title) = &title {
                if let Some(rest) = text.strip_prefix(title.as_str()) {
                    text = rest.trim().to_string();
                }
            }
            content = nonempty(text);
        }

        entries.push(AccordionEntry { title, content });
    }

    out.push(ComponentRecord::Accordion { entries });
    true
}

/// Accordion items are consumed by their container; claim without a record.
pub fn extract_accordion_item(
    _ctx: &mut ExtractCtx,
    item: ElementRef,
    _out: &mut Vec<ComponentRecord>,
) -> bool {
    is_component_type(item, "accordion-item")
}

fn direct_child_anchor<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "a")
}

fn direct_child_list<'a>(el: ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == "ul")
}

fn sitemap_nodes(list: ElementRef, ctx: &ExtractCtx) -> Vec<SitemapNode> {
    let mut nodes = Vec::new();
    for li in list.children().filter_map(ElementRef::wrap) {
        if li.value().name() != "li" {
            continue;
        }
        let anchor = direct_child_anchor(li);
        let children = direct_child_list(li)
            .map(|ul| sitemap_nodes(ul, ctx))
            .unwrap_or_default();

        nodes.push(SitemapNode {
            text: anchor.map(text_of).and_then(nonempty),
            url: anchor
                .and_then(|a| a.value().attr("href"))
                .map(|href| normalize_url(href, &ctx.base)),
            children,
        });
    }
    nodes
}

pub fn extract_sitemap(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "sitemap") {
        Some(root) => root,
        None => return false,
    };

    let mut sections = Vec::new();
    for li in root.select(&sel("ul.site-map > li")) {
        let anchor = direct_child_anchor(li);
        let links = direct_child_list(li)
            .map(|ul| sitemap_nodes(ul, ctx))
            .unwrap_or_default();

        sections.push(SitemapSection {
            title: anchor.map(text_of).and_then(nonempty),
            url: anchor
                .and_then(|a| a.value().attr("href"))
                .map(|href| normalize_url(href, &ctx.base)),
            links,
        });
    }

    if sections.is_empty() {
        // No recognizable site-map list; degrade to a flat section over
        // every anchor so at least the link inventory survives.
        let links = root
            .select(&sel("a"))
            .map(|a| SitemapNode {
                text: nonempty(text_of(a)),
                url: a
                    .value()
                    .attr("href")
                    .map(|href| normalize_url(href, &ctx.base)),
                children: Vec::new(),
            })
            .collect::<Vec<_>>();
        if !links.is_empty() {
            sections.push(SitemapSection {
                title: None,
                url: None,
                links,
            });
        }
    }

    out.push(ComponentRecord::Sitemap { sections });
    true
}

fn direct_cells<'a>(tr: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect()
}

fn extract_cell(cell: ElementRef, ctx: &ExtractCtx) -> TableCell {
    // Cells may host full paragraph components; prefer their rich-text field
    // so the exported html matches what stand-alone text blocks export.
    if let Some(paragraph) = find_first(
        cell,
        &sel(".paragraph--type--text, .paragraph--type--text-with-image"),
    ) {
        let rich = find_first(
            paragraph,
            &sel(".field--name-field-text-content, .field--name-field-introduction"),
        );
        let html = rich
            .map(|r| r.inner_html())
            .unwrap_or_else(|| paragraph.inner_html());
        return TableCell {
            html: nonempty(html.trim().to_string()),
            text: nonempty(text_of(paragraph)),
            links: Vec::new(),
        };
    }

    let links = cell
        .select(&sel("a"))
        .map(|a| Link {
            text: nonempty(text_of(a)),
            url: a
                .value()
                .attr("href")
                .map(|href| normalize_url(href, &ctx.base)),
        })
        .collect();

    TableCell {
        html: nonempty(cell.inner_html().trim().to_string()),
        text: nonempty(text_of(cell)),
        links,
    }
}

pub fn extract_table(
    ctx: &mut ExtractCtx,
    item: ElementRef,
    out: &mut Vec<ComponentRecord>,
) -> bool {
    let root = match type_root(item, "table") {
        Some(root) => root,
        None => return false,
    };

    let title = find_first(root, &sel(".paragraph--type--title"))
        .map(text_of)
        .and_then(nonempty);

    let table = match find_first(root, &sel("table")) {
        Some(table) => table,
        None => return false,
    };

    let mut headers: Vec<Option<String>> = table
        .select(&sel("thead th"))
        .map(|th| nonempty(text_of(th)))
        .collect();
    if headers.is_empty() {
        if let Some(first_row) = find_first(table, &sel("tr")) {
            let cells = direct_cells(first_row);
            if !cells.is_empty() && cells.iter().all(|c| c.value().name() == "th") {
                headers = cells.iter().map(|th| nonempty(text_of(*th))).collect();
            }
        }
    }

    let mut rows = Vec::new();
    for tr in table.select(&sel("tr")) {
        // Skip rows belonging to a nested table; they are captured through
        // their own cell's html.
        let owner = tr
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "table");
        if owner.map(|o| o.id()) != Some(table.id()) {
            continue;
        }

        let cells = direct_cells(tr);
        if cells.is_empty() {
            continue;
        }
        rows.push(cells.into_iter().map(|c| extract_cell(c, ctx)).collect());
    }

    out.push(ComponentRecord::Table {
        title,
        headers,
        rows,
        html: nonempty(table.html()),
    });
    true
}
