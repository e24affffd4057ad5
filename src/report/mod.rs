// src/report/mod.rs
// =============================================================================
// This module produces the tabular migration reports.
//
// Artifacts written per run:
// - components.csv: one row per component occurrence, [URL, Component]
// - metrics.csv: per-page fetch and scan counters
// - unmatched_class_tokens.csv: entity tokens the catalog did not recognize
// - fetch_diagnostics.json: full per-page fetch detail (statuses, redirect
//   chains, attempts) for debugging flaky origins
//
// Two input modes:
// - exported: reads the data.json tree a previous extract run wrote
// - live: scans the pages directly (the caller drives scan_page and hands
//   the outcomes over)
//
// Row ordering follows the URL list when one drives the run; otherwise
// pages sort lexicographically by URL so reruns diff cleanly.
// =============================================================================

pub mod traverse;

pub use traverse::{component_rows, failure_row, ReportRow};

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::crawl::PageOutcome;
use crate::extract::record::PageExtractionResult;
use crate::fetch::http::RedirectHop;

/// Per-page line of metrics.csv. A bypassed disclaimer shows up as a
/// "|disclaimer-bypassed" suffix on the classification cell.
#[derive(Debug, Clone, Serialize)]
pub struct PageMetricsRow {
    pub url: String,
    pub status: u16,
    pub classification: String,
    pub attempts: u32,
    pub redirects: usize,
    pub elements_scanned: u32,
    pub tokens_collected: u32,
    pub matches_found: u32,
}

/// Per-page entry of fetch_diagnostics.json.
#[derive(Debug, Clone, Serialize)]
pub struct PageDiagnostics {
    pub url: String,
    #[serde(rename = "finalUrl")]
    pub final_url: String,
    pub status: u16,
    pub classification: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<crate::fetch::Reason>,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<RedirectHop>,
    #[serde(rename = "disclaimerBypassed")]
    pub disclaimer_bypassed: bool,
}

/// The accumulated report of one run, in page order.
#[derive(Debug, Default)]
pub struct ComponentReport {
    pub rows: Vec<ReportRow>,
    pub metrics: Vec<PageMetricsRow>,
    pub unmatched: BTreeMap<String, u32>,
    pub diagnostics: Vec<PageDiagnostics>,
}

impl ComponentReport {
    /// Folds one live scan outcome into the report. Not-found pages
    /// contribute a single "404" row; empty pages contribute no row at all;
    /// healthy pages contribute one row per component.
    pub fn add_outcome(&mut self, outcome: &PageOutcome) {
        if outcome.class.classification.is_failure() {
            if outcome.class.classification != crate::fetch::Classification::Empty {
                self.rows.push(failure_row(&outcome.url));
            }
        } else if let Some(result) = &outcome.result {
            self.rows
                .extend(component_rows(&outcome.url, &result.components));
        }

        let classification = if outcome.disclaimer_bypassed {
            format!("{}|disclaimer-bypassed", outcome.class.classification.label())
        } else {
            outcome.class.classification.label().to_string()
        };
        self.metrics.push(PageMetricsRow {
            url: outcome.url.clone(),
            status: outcome.status,
            classification,
            attempts: outcome.attempts,
            redirects: outcome.chain.len(),
            elements_scanned: outcome.metrics.elements_scanned,
            tokens_collected: outcome.metrics.tokens_collected,
            matches_found: outcome.metrics.matches_found,
        });

        self.diagnostics.push(PageDiagnostics {
            url: outcome.url.clone(),
            final_url: outcome.final_url.clone(),
            status: outcome.status,
            classification: outcome.class.classification.label(),
            reason: outcome.class.reason,
            attempts: outcome.attempts,
            redirects: outcome.chain.clone(),
            disclaimer_bypassed: outcome.disclaimer_bypassed,
        });

        for (token, count) in &outcome.unmatched {
            *self.unmatched.entry(token.clone()).or_insert(0) += count;
        }
    }

    /// Folds one exported page (a data.json artifact) into the report.
    /// Exported runs carry no fetch detail, so only component rows accrue.
    pub fn add_exported(&mut self, page: &PageExtractionResult) {
        self.rows
            .extend(component_rows(&page.metadata.url, &page.components));
    }

    /// Writes every artifact under the output directory.
    pub fn write_all(&self, out_dir: &Path) -> Result<()> {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create report dir: {}", out_dir.display()))?;

        let component_rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|r| vec![r.url.clone(), r.component.to_string()])
            .collect();
        write_table(
            &out_dir.join("components.csv"),
            &["URL", "Component"],
            &component_rows,
        )?;

        if !self.metrics.is_empty() {
            let metric_rows: Vec<Vec<String>> = self
                .metrics
                .iter()
                .map(|m| {
                    vec![
                        m.url.clone(),
                        m.status.to_string(),
                        m.classification.clone(),
                        m.attempts.to_string(),
                        m.redirects.to_string(),
                        m.elements_scanned.to_string(),
                        m.tokens_collected.to_string(),
                        m.matches_found.to_string(),
                    ]
                })
                .collect();
            write_table(
                &out_dir.join("metrics.csv"),
                &[
                    "URL",
                    "Status",
                    "Classification",
                    "Attempts",
                    "Redirects",
                    "Elements Scanned",
                    "Tokens Collected",
                    "Matches Found",
                ],
                &metric_rows,
            )?;
        }

        if !self.unmatched.is_empty() {
            let unmatched_rows: Vec<Vec<String>> = self
                .unmatched
                .iter()
                .map(|(token, count)| vec![token.clone(), count.to_string()])
                .collect();
            write_table(
                &out_dir.join("unmatched_class_tokens.csv"),
                &["Class Token", "Occurrences"],
                &unmatched_rows,
            )?;
        }

        if !self.diagnostics.is_empty() {
            let path = out_dir.join("fetch_diagnostics.json");
            let json = serde_json::to_string_pretty(&self.diagnostics)
                .context("Failed to serialize fetch diagnostics")?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        Ok(())
    }
}

/// Writes one CSV table. This is the narrow seam every tabular artifact
/// goes through, so swapping the output format touches exactly one place.
pub fn write_table(path: &Path, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writeln!(file, "{}", headers.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","))?;
    for row in rows {
        let line = row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

fn csv_field(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Recursively collects every data.json under the content root, parsed.
/// Pages come back sorted lexicographically by their recorded URL.
pub fn load_exported_pages(root: &Path) -> Result<Vec<PageExtractionResult>> {
    let mut pages = Vec::new();
    collect_exported(root, &mut pages)?;
    pages.sort_by(|a, b| a.metadata.url.cmp(&b.metadata.url));
    Ok(pages)
}

fn collect_exported(dir: &Path, pages: &mut Vec<PageExtractionResult>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read content dir: {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_exported(&path, pages)?;
        } else if path.file_name().map(|n| n == "data.json").unwrap_or(false) {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<PageExtractionResult>(&raw) {
                Ok(page) => pages.push(page),
                Err(e) => eprintln!("Warning: Skipping malformed {}: {}", path.display(), e),
            }
        }
    }
    Ok(())
}

/// Reorders exported pages to follow the URL list when one drives the run.
/// Pages absent from the list keep their lexicographic order at the end.
pub fn order_by_url_list(pages: &mut Vec<PageExtractionResult>, urls: &[String]) {
    let rank = |url: &str| urls.iter().position(|u| u == url).unwrap_or(usize::MAX);
    pages.sort_by(|a, b| {
        rank(&a.metadata.url)
            .cmp(&rank(&b.metadata.url))
            .then_with(|| a.metadata.url.cmp(&b.metadata.url))
    });
}
