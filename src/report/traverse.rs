// src/report/traverse.rs
// =============================================================================
// This module flattens a page's component tree into report rows.
//
// The walk is depth-first in document order. Three Columns containers emit
// no row of their own; their center children come first, then the right
// column, so the tabular report reads the way the page renders.
// =============================================================================

use crate::extract::record::ComponentRecord;

/// One row of the component report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub url: String,
    pub component: &'static str,
}

/// Flattens one page's component tree into rows.
pub fn component_rows(url: &str, components: &[ComponentRecord]) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    walk(url, components, &mut rows);
    rows
}

fn walk(url: &str, components: &[ComponentRecord], rows: &mut Vec<ReportRow>) {
    for component in components {
        match component {
            ComponentRecord::ThreeColumns { center, right } => {
                walk(url, center, rows);
                walk(url, right, rows);
            }
            other => rows.push(ReportRow {
                url: url.to_string(),
                component: other.display_name(),
            }),
        }
    }
}

/// The single row emitted for a page that failed classification.
pub fn failure_row(url: &str) -> ReportRow {
    ReportRow {
        url: url.to_string(),
        component: "404",
    }
}
