// src/crawl/mod.rs
// =============================================================================
// This module handles page scanning.
//
// Submodules:
// - page: the per-page pipeline (fetch, classify, bypass, scan, extract)
//
// Also here: mapping a page URL to its on-disk export path. Every scanned
// page writes <out>/<path segments>/data.json, so the exported tree mirrors
// the site's URL structure.
// =============================================================================

pub mod page;

pub use page::{scan_page, PageOutcome, ScanMetrics};

use std::path::{Path, PathBuf};
use url::Url;

/// Maps a page URL to its per-page artifact path under the output root.
/// The site root maps to <out>/index/data.json; path segments are sanitized
/// to stay filesystem-safe on every platform.
pub fn output_path_for(out_dir: &Path, url: &str) -> PathBuf {
    let mut dir = out_dir.to_path_buf();

    let segments: Vec<String> = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).map(sanitize_segment).collect())
        })
        .unwrap_or_default();

    if segments.is_empty() {
        dir.push("index");
    } else {
        for segment in segments {
            dir.push(segment);
        }
    }

    dir.push("data.json");
    dir
}

fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "-".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_mirrors_url_segments() {
        let path = output_path_for(Path::new("out"), "https://example.com/products/corn");
        assert_eq!(path, PathBuf::from("out/products/corn/data.json"));
    }

    #[test]
    fn test_root_maps_to_index() {
        let path = output_path_for(Path::new("out"), "https://example.com/");
        assert_eq!(path, PathBuf::from("out/index/data.json"));
    }

    #[test]
    fn test_segments_are_sanitized() {
        let path = output_path_for(Path::new("out"), "https://example.com/a%20b/..%2F");
        // percent-encoded characters are replaced and no component can walk
        // back out of the output directory
        assert!(path.components().all(|c| c.as_os_str() != ".."));
        assert!(path.to_string_lossy().contains("a-20b"));
    }
}
