// src/audit.rs
// =============================================================================
// This module audits catalog coverage against an exported content tree.
//
// For every paragraph bundle the catalog knows, the audit answers: does the
// extraction engine handle it, and how often did it actually occur in the
// exported pages? Bundles that only ever appear inside a parent component
// (accordion items, career links, titles...) are marked consumed rather
// than unhandled.
//
// The occurrence counts key on the exported display names, so renamed
// components (cluster_composition -> "Cluster Block") map through an alias
// step before counting.
// =============================================================================

use std::collections::BTreeMap;

use crate::catalog::{humanize, Catalog};
use crate::extract::record::ComponentRecord;
use crate::extract::record::PageExtractionResult;

/// Coverage status of one catalog bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// An extractor emits a record for this bundle.
    Handled,
    /// The bundle is read by a parent component's extractor.
    Consumed,
    /// No extractor knows this bundle.
    Unhandled,
}

impl Coverage {
    pub fn label(&self) -> &'static str {
        match self {
            Coverage::Handled => "handled",
            Coverage::Consumed => "consumed-by-parent",
            Coverage::Unhandled => "unhandled",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub bundle: String,
    pub component: String,
    pub coverage: Coverage,
    pub occurrences: u32,
}

// Display names an extracted bundle reports under. Sub-classified kinds
// (html editor, media, model viewer) fan out to several names.
fn display_names(bundle: &str) -> Vec<&'static str> {
    match bundle.trim_start_matches('_').replace('_', "-").as_str() {
        "jumbotron" => vec!["Jumbotron"],
        "image-wide" => vec!["Image Wrapper"],
        "mini-banner" => vec!["Mini Banner"],
        "quote" => vec!["Quote"],
        "cluster-composition" => vec!["Cluster Block"],
        "featured-contents" => vec!["Featured Contents"],
        "grid-layout" => vec!["Teaser List", "Paragraph List"],
        "html-editor" | "html-editor-fact-box" => vec![
            "HTML Block",
            "HTML Block With Youtube Video",
            "HTML Block With Iframe",
            "HTML Block With Table",
            "HTML Block With File Download Link",
        ],
        "text" => vec!["Text"],
        "text-with-image" => vec!["Text With Image"],
        "accordion" => vec!["Accordion"],
        "section-introduction" => vec!["Section Introduction"],
        "list-links" => vec!["List Links"],
        "link-list" => vec!["Link List Alternative"],
        "content-with-sidebars" => vec!["Three Columns"],
        "job-search" => vec!["Job Search"],
        "job-search-banner" => vec!["Job Search Banner"],
        "latest-news" => vec!["Latest News"],
        "news-overview-block" => vec!["News Overview"],
        "local-news-content" => vec!["Local News"],
        "profile-card" => vec!["Profile List"],
        "cta-button" => vec!["CTA Button"],
        "info-box" => vec!["Info Box"],
        "sitemap" => vec!["Sitemap"],
        "table" => vec!["Table"],
        "one-step-disclaimer" => vec!["One Step Disclaimer"],
        "d-model-viewer" => vec!["3D Model Viewer", "2D Model Viewer", "D Model Viewer"],
        _ => vec![],
    }
}

// Bundles that never emit their own record because a parent extractor
// absorbs them.
fn consumed_by_parent(bundle: &str) -> bool {
    matches!(
        bundle.trim_start_matches('_').replace('_', "-").as_str(),
        "accordion-item" | "career-link" | "teaser-card" | "table-items" | "title"
    )
}

/// Runs the audit over the catalog's paragraph bundles and the exported
/// pages. Entries come back in catalog order.
pub fn audit_pages(catalog: &Catalog, pages: &[PageExtractionResult]) -> Vec<AuditEntry> {
    let counts = occurrence_counts(pages);

    catalog
        .entity_sets
        .paragraphs
        .iter()
        .map(|bundle| {
            let names = display_names(bundle);
            let occurrences = names
                .iter()
                .filter_map(|name| counts.get(*name))
                .sum::<u32>();

            let coverage = if !names.is_empty() {
                Coverage::Handled
            } else if consumed_by_parent(bundle) {
                Coverage::Consumed
            } else {
                Coverage::Unhandled
            };

            AuditEntry {
                bundle: bundle.clone(),
                component: humanize(bundle),
                coverage,
                occurrences,
            }
        })
        .collect()
}

fn occurrence_counts(pages: &[PageExtractionResult]) -> BTreeMap<&'static str, u32> {
    let mut counts = BTreeMap::new();
    for page in pages {
        count_components(&page.components, &mut counts);
    }
    counts
}

fn count_components(
    components: &[ComponentRecord],
    counts: &mut BTreeMap<&'static str, u32>,
) {
    for component in components {
        match component {
            ComponentRecord::ThreeColumns { center, right } => {
                *counts.entry(component.display_name()).or_insert(0) += 1;
                count_components(center, counts);
                count_components(right, counts);
            }
            other => {
                *counts.entry(other.display_name()).or_insert(0) += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntitySets;
    use crate::extract::record::PageMetadata;

    fn catalog() -> Catalog {
        Catalog {
            version: "1.0".to_string(),
            entity_sets: EntitySets {
                paragraphs: vec![
                    "quote".to_string(),
                    "cluster_composition".to_string(),
                    "accordion_item".to_string(),
                    "mystery_widget".to_string(),
                ],
                nodes: vec![],
                media: vec![],
                files: vec![],
                taxonomy_terms: vec![],
            },
        }
    }

    fn page_with(components: Vec<ComponentRecord>) -> PageExtractionResult {
        PageExtractionResult {
            metadata: PageMetadata::default(),
            components,
        }
    }

    #[test]
    fn test_counts_through_renames_and_containers() {
        let pages = vec![page_with(vec![ComponentRecord::ThreeColumns {
            center: vec![ComponentRecord::Quote {
                text: String::new(),
                author: String::new(),
                designation: String::new(),
            }],
            right: vec![],
        }])];

        let entries = audit_pages(&catalog(), &pages);

        let quote = entries.iter().find(|e| e.bundle == "quote").unwrap();
        assert_eq!(quote.coverage, Coverage::Handled);
        assert_eq!(quote.occurrences, 1);

        let cluster = entries
            .iter()
            .find(|e| e.bundle == "cluster_composition")
            .unwrap();
        assert_eq!(cluster.coverage, Coverage::Handled);
        assert_eq!(cluster.occurrences, 0);
        assert_eq!(cluster.component, "Cluster Composition");
    }

    #[test]
    fn test_consumed_and_unhandled_flags() {
        let entries = audit_pages(&catalog(), &[]);

        let item = entries
            .iter()
            .find(|e| e.bundle == "accordion_item")
            .unwrap();
        assert_eq!(item.coverage, Coverage::Consumed);

        let mystery = entries
            .iter()
            .find(|e| e.bundle == "mystery_widget")
            .unwrap();
        assert_eq!(mystery.coverage, Coverage::Unhandled);
        assert_eq!(mystery.coverage.label(), "unhandled");
    }
}
