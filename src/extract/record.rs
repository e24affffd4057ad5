// src/extract/record.rs
// =============================================================================
// This module defines the normalized component records the extraction engine
// produces.
//
// ComponentRecord is a tagged enum over every component kind the catalog
// recognizes. The serde tag is the human-readable component name used in the
// exported JSON ("type": "Cluster Block", ...), so the per-page data.json
// artifacts round-trip cleanly between the extract and report commands.
//
// Container kinds (Three Columns) own ordered child record lists; the other
// composite kinds (Cluster Block, Accordion, Sitemap, Table, ...) own ordered
// sub-structures. Together they form a tree rooted at the page.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A hyperlink as exported: visible text plus raw href.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Image metadata in the uniform {src, alt, width, height} shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
}

/// One tile inside a Cluster Block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kicker: Option<String>,
    #[serde(rename = "readMore", default)]
    pub read_more: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub image: ImageMeta,
}

/// One call-to-action tile inside Featured Contents (at most three).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedCta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "listingTitle", default, skip_serializing_if = "Option::is_none")]
    pub listing_title: Option<String>,
    #[serde(rename = "linkText", default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
}

/// One teaser card inside a grid layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teaser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kicker: Option<String>,
}

/// One link-list paragraph inside a grid layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// The job-search form markup, kept verbatim enough for the migration team
/// to rebuild it on the target side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<FormInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub value: String,
}

/// A titled group of career links, deduplicated by (url, text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// A news teaser as rendered by the news views (latest news and overview
/// share the shape; overview teasers add topline and image).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsTeaser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "readMore", default, skip_serializing_if = "Option::is_none")]
    pub read_more: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNewsItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub image: ImageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(rename = "linkText", default, skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
}

/// Modifier classes captured from a CTA button paragraph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CtaStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub arrow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
}

impl CtaStyle {
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && !self.arrow && self.align.is_none()
    }
}

/// A top-level sitemap section with its (arbitrarily nested) link tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<SitemapNode>,
}

/// One sitemap entry; children preserve the source list nesting depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitemapNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SitemapNode>,
}

/// One table cell: raw html, plain text, and any anchors it contained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccordionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Sub-kind of an HTML Editor block, decided by first match in priority
/// order: YouTube embed > generic iframe > table > file-download link >
/// plain HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HtmlEditorKind {
    YoutubeVideo,
    Iframe,
    Table,
    FileDownload,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Video,
    Image,
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelViewerKind {
    #[serde(rename = "3d")]
    ThreeD,
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "fallback")]
    Fallback,
}

/// One recognized content component, tagged by its exported name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ComponentRecord {
    #[serde(rename = "Jumbotron")]
    Jumbotron {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },

    #[serde(rename = "Image Wrapper")]
    ImageWrapper {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },

    #[serde(rename = "Mini Banner")]
    MiniBanner {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },

    #[serde(rename = "Quote")]
    Quote {
        #[serde(default)]
        text: String,
        #[serde(default)]
        author: String,
        #[serde(default)]
        designation: String,
    },

    #[serde(rename = "Cluster Block")]
    ClusterBlock {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headline: Option<String>,
        #[serde(default)]
        blocks: Vec<ClusterItem>,
    },

    #[serde(rename = "Featured Contents")]
    FeaturedContents {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        ctas: Vec<FeaturedCta>,
    },

    #[serde(rename = "Teaser List")]
    TeaserList {
        #[serde(rename = "teaserEntries", default)]
        teaser_entries: Vec<Teaser>,
    },

    #[serde(rename = "Paragraph List")]
    ParagraphList {
        #[serde(rename = "paragraphEntries", default)]
        paragraph_entries: Vec<ParagraphEntry>,
    },

    #[serde(rename = "HTML Editor")]
    HtmlEditor {
        kind: HtmlEditorKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    #[serde(rename = "Text")]
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    #[serde(rename = "Text With Image")]
    TextWithImage {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    #[serde(rename = "Section Introduction")]
    SectionIntroduction {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<String>,
    },

    #[serde(rename = "List Links")]
    ListLinks {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        links: Vec<Link>,
    },

    #[serde(rename = "Link List Alternative")]
    LinkListAlternative {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        links: Vec<Link>,
    },

    #[serde(rename = "Three Columns")]
    ThreeColumns {
        #[serde(default)]
        center: Vec<ComponentRecord>,
        #[serde(default)]
        right: Vec<ComponentRecord>,
    },

    #[serde(rename = "Job Search")]
    JobSearch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headline: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        form: Option<SearchForm>,
        #[serde(rename = "careerLinks", default)]
        career_links: Vec<CareerSection>,
    },

    #[serde(rename = "Job Search Banner")]
    JobSearchBanner {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kicker: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageMeta>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        form: Option<SearchForm>,
        #[serde(rename = "careerLinks", default, skip_serializing_if = "Vec::is_empty")]
        career_links: Vec<CareerSection>,
    },

    #[serde(rename = "Latest News")]
    LatestNews {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        headline: Option<String>,
        #[serde(default)]
        items: Vec<NewsTeaser>,
    },

    #[serde(rename = "News Overview")]
    NewsOverview {
        #[serde(default)]
        items: Vec<NewsTeaser>,
        #[serde(rename = "pageRange", default, skip_serializing_if = "Option::is_none")]
        page_range: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
    },

    #[serde(rename = "Local News")]
    LocalNews {
        #[serde(default)]
        items: Vec<LocalNewsItem>,
    },

    #[serde(rename = "Profile List")]
    ProfileList {
        #[serde(default)]
        profiles: Vec<Profile>,
    },

    #[serde(rename = "CTA Button")]
    CtaButton {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<CtaStyle>,
    },

    #[serde(rename = "Info Box")]
    InfoBox {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intro: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        links: Vec<Link>,
    },

    #[serde(rename = "Sitemap")]
    Sitemap {
        #[serde(default)]
        sections: Vec<SitemapSection>,
    },

    #[serde(rename = "Table")]
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        headers: Vec<Option<String>>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        rows: Vec<Vec<TableCell>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },

    #[serde(rename = "Accordion")]
    Accordion {
        #[serde(default)]
        entries: Vec<AccordionEntry>,
    },

    #[serde(rename = "Media")]
    Media {
        kind: MediaKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageMeta>,
    },

    #[serde(rename = "Model Viewer")]
    ModelViewer {
        kind: ModelViewerKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image: Option<ImageMeta>,
    },

    #[serde(rename = "Disclaimer")]
    Disclaimer {
        #[serde(rename = "continueUrl", default, skip_serializing_if = "Option::is_none")]
        continue_url: Option<String>,
    },
}

impl ComponentRecord {
    /// The component name used in tabular reports. Usually the serde tag;
    /// sub-classified kinds (HTML Editor, Media, Model Viewer) report their
    /// resolved sub-kind name instead.
    pub fn display_name(&self) -> &'static str {
        use ComponentRecord::*;
        match self {
            Jumbotron { .. } => "Jumbotron",
            ImageWrapper { .. } => "Image Wrapper",
            MiniBanner { .. } => "Mini Banner",
            Quote { .. } => "Quote",
            ClusterBlock { .. } => "Cluster Block",
            FeaturedContents { .. } => "Featured Contents",
            TeaserList { .. } => "Teaser List",
            ParagraphList { .. } => "Paragraph List",
            HtmlEditor { kind, .. } => match kind {
                HtmlEditorKind::YoutubeVideo => "HTML Block With Youtube Video",
                HtmlEditorKind::Iframe => "HTML Block With Iframe",
                HtmlEditorKind::Table => "HTML Block With Table",
                HtmlEditorKind::FileDownload => "HTML Block With File Download Link",
                HtmlEditorKind::Html => "HTML Block",
            },
            Text { .. } => "Text",
            TextWithImage { .. } => "Text With Image",
            SectionIntroduction { .. } => "Section Introduction",
            ListLinks { .. } => "List Links",
            LinkListAlternative { .. } => "Link List Alternative",
            ThreeColumns { .. } => "Three Columns",
            JobSearch { .. } => "Job Search",
            JobSearchBanner { .. } => "Job Search Banner",
            LatestNews { .. } => "Latest News",
            NewsOverview { .. } => "News Overview",
            LocalNews { .. } => "Local News",
            ProfileList { .. } => "Profile List",
            CtaButton { .. } => "CTA Button",
            InfoBox { .. } => "Info Box",
            Sitemap { .. } => "Sitemap",
            Table { .. } => "Table",
            Accordion { .. } => "Accordion",
            Media { kind, .. } => match kind {
                MediaKind::Video => "Media Video",
                MediaKind::Image => "Media Image",
                MediaKind::Generic => "Media",
            },
            ModelViewer { kind, .. } => match kind {
                ModelViewerKind::ThreeD => "3D Model Viewer",
                ModelViewerKind::TwoD => "2D Model Viewer",
                ModelViewerKind::Fallback => "D Model Viewer",
            },
            Disclaimer { .. } => "One Step Disclaimer",
        }
    }
}

/// Page-level metadata exported alongside the component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

/// The per-page JSON artifact: metadata plus the ordered component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageExtractionResult {
    #[serde(default)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_human_readable_tag() {
        let record = ComponentRecord::Quote {
            text: "Growth".to_string(),
            author: "A. Farmer".to_string(),
            designation: "CEO".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Quote");
        assert_eq!(json["author"], "A. Farmer");
    }

    #[test]
    fn test_round_trips_nested_containers() {
        let record = ComponentRecord::ThreeColumns {
            center: vec![ComponentRecord::Text {
                title: None,
                html: Some("<p>hi</p>".to_string()),
                text: Some("hi".to_string()),
            }],
            right: vec![],
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ComponentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let record = ComponentRecord::Jumbotron {
            title: Some("Hello".to_string()),
            image: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_display_name_resolves_sub_kinds() {
        let editor = ComponentRecord::HtmlEditor {
            kind: HtmlEditorKind::YoutubeVideo,
            title: None,
            html: None,
            text: None,
        };
        assert_eq!(editor.display_name(), "HTML Block With Youtube Video");

        let viewer = ComponentRecord::ModelViewer {
            kind: ModelViewerKind::TwoD,
            image: None,
        };
        assert_eq!(viewer.display_name(), "2D Model Viewer");
    }

    #[test]
    fn test_page_result_round_trip() {
        let page = PageExtractionResult {
            metadata: PageMetadata {
                title: Some("T".to_string()),
                url: "https://example.com/x".to_string(),
                meta: BTreeMap::new(),
                canonical: None,
            },
            components: vec![ComponentRecord::Accordion {
                entries: vec![AccordionEntry {
                    title: Some("Q1".to_string()),
                    content: Some("A1".to_string()),
                }],
            }],
        };
        let json = serde_json::to_string_pretty(&page).unwrap();
        let back: PageExtractionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(page, back);
    }
}
