// src/catalog.rs
// =============================================================================
// This module loads the component catalog and compiles it into class-token
// matchers.
//
// The catalog is a YAML document enumerating recognized entity bundles per
// bucket (paragraphs, nodes, media, files, taxonomy terms). Drupal renders
// each bundle as CSS class tokens following a prefix convention
// (paragraph--type--<slug>, node--<slug>, media--<slug>, ...), with the slug
// sometimes hyphenized and sometimes underscored depending on the theme.
//
// We expand each bundle into its variant forms once at startup and compile
// one anchored regex per variant, so matching a token is a scan over
// prebuilt patterns rather than per-node string surgery.
// =============================================================================

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// The catalog document as it appears on disk.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub entity_sets: EntitySets,
}

#[derive(Debug, Deserialize)]
pub struct EntitySets {
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub taxonomy_terms: Vec<String>,
}

/// One compiled detection skeleton: a bundle with its display name,
/// bucket priority, and anchored class patterns.
#[derive(Debug)]
pub struct Skeleton {
    pub key: String,
    pub name: String,
    pub bucket: &'static str,
    pub priority: u32,
    patterns: Vec<Regex>,
}

impl Skeleton {
    pub fn matches(&self, token: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(token))
    }
}

/// The compiled catalog: skeletons in bucket-priority order, built once.
#[derive(Debug)]
pub struct CompiledCatalog {
    pub skeletons: Vec<Skeleton>,
}

impl CompiledCatalog {
    /// First skeleton whose patterns match the class token, if any.
    /// Precedence follows bucket order (paragraphs before nodes before
    /// media before taxonomy terms), then catalog order within a bucket.
    pub fn match_token(&self, token: &str) -> Option<&Skeleton> {
        self.skeletons.iter().find(|sk| sk.matches(token))
    }
}

/// Loads the catalog YAML. A missing or unparsable catalog is fatal: without
/// it the scanner has no vocabulary to classify against.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Component catalog not found: {}", path.display()))?;
    let catalog: Catalog = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse component catalog: {}", path.display()))?;
    Ok(catalog)
}

/// Compiles the catalog into detection skeletons.
pub fn compile(catalog: &Catalog) -> CompiledCatalog {
    let sets = &catalog.entity_sets;
    let mut skeletons = Vec::new();

    for bundle in &sets.paragraphs {
        // Paragraphs render under two prefixes depending on template depth.
        push_skeleton(&mut skeletons, "paragraph--", bundle, "paragraph", 50);
        push_skeleton(&mut skeletons, "paragraph--type--", bundle, "paragraph", 50);
    }
    for bundle in &sets.nodes {
        // Node templates render both node--<bundle> and node--type-<bundle>.
        push_skeleton(&mut skeletons, "node--", bundle, "node", 40);
        push_skeleton(&mut skeletons, "node--type-", bundle, "node", 40);
    }
    for bundle in &sets.media {
        push_skeleton(&mut skeletons, "media--", bundle, "media", 30);
    }
    for bundle in &sets.taxonomy_terms {
        push_skeleton(&mut skeletons, "taxonomy-term--", bundle, "taxonomy", 25);
    }

    CompiledCatalog { skeletons }
}

fn push_skeleton(
    out: &mut Vec<Skeleton>,
    prefix: &str,
    bundle: &str,
    bucket: &'static str,
    priority: u32,
) {
    let patterns = variant_forms(bundle)
        .into_iter()
        // Anchored to the prefix and either exact-end or a typed-modifier
        // continuation (e.g. paragraph--type--quote--wide).
        .map(|v| format!("^{}{}($|--)", regex::escape(prefix), regex::escape(&v)))
        .map(|p| Regex::new(&p).unwrap())
        .collect();

    out.push(Skeleton {
        key: format!("{}{}", prefix.trim_end_matches('-').replace('-', "_"), bundle),
        name: humanize(bundle),
        bucket,
        priority,
        patterns,
    });
}

// Expands a bundle slug into its rendered variant forms: the slug as-is,
// without a leading underscore, and with internal underscores hyphenized.
fn variant_forms(bundle: &str) -> Vec<String> {
    let mut forms = vec![bundle.to_string()];

    let no_leading = bundle.trim_start_matches('_');
    if no_leading != bundle && !no_leading.is_empty() {
        forms.push(no_leading.to_string());
    }
    if bundle.starts_with('_') {
        // keep the leading underscore, hyphenize the rest
        let internal = format!("_{}", bundle[1..].replace('_', "-"));
        forms.push(internal);
    }
    let hyphenized = no_leading.replace('_', "-");
    if !hyphenized.is_empty() && hyphenized != no_leading {
        forms.push(hyphenized);
    }
    if !bundle.starts_with('_') {
        let hyphen_original = bundle.replace('_', "-");
        if hyphen_original != bundle {
            forms.push(hyphen_original);
        }
    }

    forms.sort();
    forms.dedup();
    forms
}

/// Turns a bundle slug into a human-readable component name
/// (e.g. "cluster_composition" -> "Cluster Composition").
pub fn humanize(bundle: &str) -> String {
    let spaced = bundle
        .split(|c| c == '_' || c == '-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c == ' ';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompiledCatalog {
        let catalog = Catalog {
            version: "1.0".to_string(),
            entity_sets: EntitySets {
                paragraphs: vec![
                    "quote".to_string(),
                    "cluster_composition".to_string(),
                    "_d_model_viewer".to_string(),
                ],
                nodes: vec!["article".to_string()],
                media: vec!["video_embed".to_string()],
                files: vec![],
                taxonomy_terms: vec!["tags".to_string()],
            },
        };
        compile(&catalog)
    }

    #[test]
    fn test_matches_both_paragraph_prefixes() {
        let compiled = sample();
        assert!(compiled.match_token("paragraph--type--quote").is_some());
        assert!(compiled.match_token("paragraph--quote").is_some());
    }

    #[test]
    fn test_matches_hyphenized_variant() {
        let compiled = sample();
        let sk = compiled
            .match_token("paragraph--type--cluster-composition")
            .expect("hyphen variant should match");
        assert_eq!(sk.name, "Cluster Composition");
    }

    #[test]
    fn test_typed_modifier_continuation_matches() {
        let compiled = sample();
        assert!(compiled.match_token("paragraph--type--quote--wide").is_some());
        // but a longer slug must not match a shorter bundle
        assert!(compiled.match_token("paragraph--type--quoted").is_none());
    }

    #[test]
    fn test_leading_underscore_variants() {
        let compiled = sample();
        assert!(compiled.match_token("paragraph--type--_d-model-viewer").is_some());
        assert!(compiled.match_token("paragraph--type--d-model-viewer").is_some());
    }

    #[test]
    fn test_bucket_prefixes() {
        let compiled = sample();
        assert_eq!(compiled.match_token("node--article").unwrap().bucket, "node");
        assert_eq!(compiled.match_token("media--video-embed").unwrap().bucket, "media");
        assert_eq!(
            compiled.match_token("taxonomy-term--tags").unwrap().bucket,
            "taxonomy"
        );
    }

    #[test]
    fn test_unknown_token_does_not_match() {
        let compiled = sample();
        assert!(compiled.match_token("paragraph--type--mystery-block").is_none());
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("cluster_composition"), "Cluster Composition");
        assert_eq!(humanize("news-overview-block"), "News Overview Block");
        assert_eq!(humanize("_d_model_viewer"), "D Model Viewer");
    }
}
