// src/main.rs
// =============================================================================
// This is the entry point of the scanner CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Dispatch to the subcommand handler (extract, report, audit)
// 3. Print a run summary
// 4. Exit with proper code (0 = success, 1 = failed pages found, 2 = error)
// =============================================================================

mod audit;
mod catalog;
mod cli;
mod crawl;
mod dom;
mod extract;
mod fetch;
mod report;
mod urls;

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::path::Path;
use url::Url;

use cli::{Cli, Commands};
use crawl::{output_path_for, scan_page, PageOutcome};
use extract::MissingTally;
use report::ComponentReport;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            urls_file,
            out,
            catalog,
            concurrency,
        } => handle_extract(&urls_file, &out, &catalog, concurrency).await,
        Commands::Report {
            urls,
            content_root,
            output,
            catalog,
            concurrency,
            test,
        } => {
            handle_report(
                urls.as_deref(),
                content_root.as_deref(),
                &output,
                &catalog,
                concurrency,
                test,
            )
            .await
        }
        Commands::Audit {
            content_root,
            catalog,
            output,
        } => handle_audit(&content_root, &catalog, &output),
    }
}

// Loads and parses the URL list, dropping any line that survived the loader
// but still fails strict parsing.
fn load_page_urls(path: &Path) -> Result<Vec<Url>> {
    let urls = urls::load_urls(path)?;
    if urls.is_empty() {
        bail!("No usable URLs in {}", path.display());
    }
    Ok(urls
        .iter()
        .filter_map(|u| match Url::parse(u) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                eprintln!("Warning: Skipping URL {}: {}", u, e);
                None
            }
        })
        .collect())
}

fn load_compiled_catalog(path: &Path) -> Result<(catalog::Catalog, catalog::CompiledCatalog)> {
    let loaded = catalog::load_catalog(path)?;
    let compiled = catalog::compile(&loaded);
    Ok((loaded, compiled))
}

// Scans every URL with bounded concurrency, preserving list order in the
// returned outcomes.
async fn scan_all(
    client: &reqwest::Client,
    compiled: &catalog::CompiledCatalog,
    pages: &[Url],
    concurrency: usize,
) -> Vec<PageOutcome> {
    let futures = pages
        .iter()
        .enumerate()
        .map(|(index, url)| async move { (index, scan_page(client, compiled, url).await) });

    let mut outcomes: Vec<(usize, PageOutcome)> = stream::iter(futures)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn handle_extract(
    urls_file: &Path,
    out: &Path,
    catalog_path: &Path,
    concurrency: usize,
) -> Result<i32> {
    let pages = load_page_urls(urls_file)?;
    let (_, compiled) = load_compiled_catalog(catalog_path)?;
    let client = fetch::build_client()?;

    println!("🔍 Scanning {} page(s)...", pages.len());

    let outcomes = scan_all(&client, &compiled, &pages, concurrency).await;

    let mut extracted = 0usize;
    let mut failed = 0usize;
    let mut tally = MissingTally::default();

    for outcome in &outcomes {
        tally.merge(&outcome.tally);

        if outcome.class.classification.is_failure() {
            failed += 1;
            println!(
                "   ❌ {} ({})",
                outcome.url,
                outcome.class.classification.label()
            );
            continue;
        }

        if let Some(result) = &outcome.result {
            let path = output_path_for(out, &outcome.url);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let json = serde_json::to_string_pretty(result)
                .context("Failed to serialize page result")?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            extracted += 1;
            println!(
                "   ✅ {} ({} component(s))",
                outcome.url,
                result.components.len()
            );
        }
    }

    println!("\n📊 Summary:");
    println!("   ✅ Extracted: {}", extracted);
    println!("   ❌ Failed: {}", failed);
    if !tally.is_empty() {
        println!("   ⚠️  Missing component implementations:");
        for (slug, count) in tally.by_slug() {
            println!("      {} x{}", slug, count);
        }
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

async fn handle_report(
    urls_file: Option<&Path>,
    content_root: Option<&Path>,
    output: &Path,
    catalog_path: &Path,
    concurrency: usize,
    test: bool,
) -> Result<i32> {
    let mut report = ComponentReport::default();
    let mut failed = 0usize;

    if let Some(root) = content_root {
        // Exported mode: read a previous extract run's tree.
        let mut pages = report::load_exported_pages(root)?;
        if let Some(urls_file) = urls_file {
            let urls = urls::load_urls(urls_file)?;
            report::order_by_url_list(&mut pages, &urls);
        }
        println!("📄 Reporting over {} exported page(s)", pages.len());
        for page in &pages {
            report.add_exported(page);
        }
    } else {
        // Live mode: a URL list is mandatory; --test falls back to the
        // test list next to the binary.
        let urls_path = match urls_file {
            Some(path) => path.to_path_buf(),
            None if test => {
                println!("🧪 Test run: using testurls.txt");
                std::path::PathBuf::from("testurls.txt")
            }
            None => {
                bail!("Live report needs --urls (or pass --content-root for an exported tree)")
            }
        };
        let pages = load_page_urls(&urls_path)?;

        let (_, compiled) = load_compiled_catalog(catalog_path)?;
        let client = fetch::build_client()?;

        println!("🔍 Scanning {} page(s)...", pages.len());
        let outcomes = scan_all(&client, &compiled, &pages, concurrency).await;

        for outcome in &outcomes {
            if outcome.class.classification.is_failure() {
                failed += 1;
            }
            report.add_outcome(outcome);
        }
    }

    report.write_all(output)?;

    println!("\n📊 Summary:");
    println!("   📋 Component rows: {}", report.rows.len());
    if !report.unmatched.is_empty() {
        println!("   ⚠️  Unmatched class tokens: {}", report.unmatched.len());
    }
    if failed > 0 {
        println!("   ❌ Failed pages: {}", failed);
    }
    println!("   📁 Reports written to {}", output.display());

    Ok(if failed > 0 { 1 } else { 0 })
}

fn handle_audit(content_root: &Path, catalog_path: &Path, output: &Path) -> Result<i32> {
    let (loaded, _) = load_compiled_catalog(catalog_path)?;
    let pages = report::load_exported_pages(content_root)?;
    println!("📄 Auditing {} exported page(s)", pages.len());

    let entries = audit::audit_pages(&loaded, &pages);

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.bundle.clone(),
                e.component.clone(),
                e.coverage.label().to_string(),
                e.occurrences.to_string(),
            ]
        })
        .collect();
    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create report dir: {}", output.display()))?;
    report::write_table(
        &output.join("audit.csv"),
        &["Bundle", "Component", "Coverage", "Occurrences"],
        &rows,
    )?;

    let unhandled: Vec<_> = entries
        .iter()
        .filter(|e| e.coverage == audit::Coverage::Unhandled)
        .collect();

    println!("\n📊 Summary:");
    println!("   📋 Bundles audited: {}", entries.len());
    if unhandled.is_empty() {
        println!("   ✅ Every bundle handled or consumed");
    } else {
        println!("   ⚠️  Unhandled bundles:");
        for entry in &unhandled {
            println!("      {} ({} occurrence(s))", entry.bundle, entry.occurrences);
        }
    }
    println!("   📁 Audit written to {}", output.join("audit.csv").display());

    Ok(0)
}
