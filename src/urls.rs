// src/urls.rs
// =============================================================================
// This module loads the page URL list from a plain-text file.
//
// URL lists come from spreadsheets, emails and copy-paste, so the loader has
// to survive real-world encoding damage:
// - UTF-16 LE/BE files (byte-order-mark detected), UTF-8 by default
// - BOM / zero-width / bidi-control / NBSP characters glued to lines
// - stray punctuation pasted in front of the http(s) scheme
// - duplicate entries and '#' comment lines
//
// A malformed line is warned about and skipped; it never aborts the load.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Reads and parses a URL list file into a deduplicated, order-preserving
/// list of normalized absolute http(s) URLs.
pub fn load_urls(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read URL list: {}", path.display()))?;
    Ok(parse_url_list(&bytes))
}

/// Parses raw URL-list bytes. Split out from file I/O so tests can feed
/// byte buffers directly.
pub fn parse_url_list(bytes: &[u8]) -> Vec<String> {
    let text = decode_buffer(bytes);

    // Repairs lines like '.,https://example.com' where junk got pasted in
    // front of the scheme. Anything before the first 'h' of http(s) goes.
    let repair = Regex::new(r"^[^hH]+(https?://)").unwrap();

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for original in text.lines() {
        let line = sanitize_line(original);
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            continue; // comment line
        }
        let line = repair.replace(&line, "$1").into_owned();

        let normalized = match normalize_url_line(&line) {
            Some(u) => u,
            None => {
                eprintln!("Warning: Skipping invalid URL line: {:?}", original);
                continue;
            }
        };

        if seen.insert(normalized.clone()) {
            urls.push(normalized);
        }
    }

    urls
}

// Decodes raw bytes honoring UTF-16 byte-order marks; defaults to UTF-8.
fn decode_buffer(bytes: &[u8]) -> String {
    if bytes.len() >= 2 {
        // UTF-16 LE BOM: FF FE
        if bytes[0] == 0xFF && bytes[1] == 0xFE {
            return decode_utf16(&bytes[2..], u16::from_le_bytes);
        }
        // UTF-16 BE BOM: FE FF
        if bytes[0] == 0xFE && bytes[1] == 0xFF {
            return decode_utf16(&bytes[2..], u16::from_be_bytes);
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| combine([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

// Strips leading BOM/zero-width/control/non-breaking-space characters and
// trailing control characters, then trims ordinary whitespace.
fn sanitize_line(line: &str) -> String {
    let is_leading_junk = |c: char| {
        matches!(c,
            '\u{FEFF}'                      // BOM
            | '\u{200B}'..='\u{200D}'       // zero-width
            | '\u{202A}'..='\u{202E}'       // bidi controls
            | '\u{2060}'                    // word joiner
            | '\u{0000}'..='\u{001F}'       // C0 controls
            | '\u{00A0}'                    // NBSP
            | '\u{FFFD}'                    // replacement char
        )
    };
    line.trim_start_matches(is_leading_junk)
        .trim_end_matches(|c: char| ('\u{0000}'..='\u{001F}').contains(&c))
        .trim()
        .to_string()
}

// Validates the line as an absolute http(s) URL and normalizes it:
// single trailing slash stripped from non-root paths, query preserved,
// fragment dropped. Returns None for anything that isn't http(s).
fn normalize_url_line(line: &str) -> Option<String> {
    let mut url = Url::parse(line).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}
