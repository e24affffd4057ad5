// src/cli.rs
// =============================================================================
// This file defines the command-line interface using the `clap` crate.
//
// Three subcommands:
// - extract: scan pages and write per-page data.json artifacts
// - report:  produce the tabular component report (live or from an export)
// - audit:   check catalog coverage against an exported content tree
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "drupal-scan",
    version = "0.1.0",
    about = "Scans rendered Drupal pages and inventories their content components",
    long_about = "drupal-scan crawls rendered Drupal pages, classifies the paragraph components \
                  they are built from, and exports per-page JSON plus tabular reports that drive \
                  a content migration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan pages from a URL list and export per-page data.json artifacts
    ///
    /// Example: drupal-scan extract urls.txt --out output
    Extract {
        /// Plain-text file with one page URL per line ('#' starts a comment)
        urls_file: PathBuf,

        /// Directory the per-page JSON tree is written under
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// Component catalog (YAML) to classify class tokens against
        #[arg(long, default_value = "config/component_catalog.yaml")]
        catalog: PathBuf,

        /// Number of pages fetched concurrently
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },

    /// Produce the component report (CSV tables + fetch diagnostics)
    ///
    /// Live mode scans the URL list directly; --content-root switches to
    /// reading a previously exported data.json tree instead.
    Report {
        /// URL list driving a live scan (and the report's row order)
        #[arg(long)]
        urls: Option<PathBuf>,

        /// Root of an exported data.json tree (skips fetching)
        #[arg(long)]
        content_root: Option<PathBuf>,

        /// Directory the report artifacts are written under
        #[arg(long, default_value = "reports")]
        output: PathBuf,

        /// Component catalog (YAML) to classify class tokens against
        #[arg(long, default_value = "config/component_catalog.yaml")]
        catalog: PathBuf,

        /// Number of pages fetched concurrently (live mode)
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Use the test URL list (testurls.txt) when --urls is not given
        #[arg(long)]
        test: bool,
    },

    /// Audit catalog coverage against an exported content tree
    ///
    /// Example: drupal-scan audit --content-root output
    Audit {
        /// Root of an exported data.json tree
        #[arg(long)]
        content_root: PathBuf,

        /// Component catalog (YAML) listing the bundles to audit
        #[arg(long, default_value = "config/component_catalog.yaml")]
        catalog: PathBuf,

        /// Directory audit.csv is written under
        #[arg(long, default_value = "reports")]
        output: PathBuf,
    },
}
