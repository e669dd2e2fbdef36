//! HTML extraction for listing, overview and section pages
//!
//! This module turns fetched pages into structured data:
//! - Article descriptors from a listing page
//! - The ordered section map of an article
//! - Typed content blocks of a section, deduplicated by fingerprint
//! - Article metadata (title, authors, last update)
//!
//! Every "try selector A, else B, else C" cascade is an ordered list of
//! selectors or heuristic functions, first non-empty result wins.

mod content;
mod links;
mod metadata;
mod sections;
mod text;

pub use content::{extract_blocks, extract_section};
pub use links::{ArticleDescriptor, LinkDiscovery};
pub use metadata::{
    parse_metadata, ArticleMetadata, AUTHORS_UNAVAILABLE, DATE_UNAVAILABLE, TITLE_UNAVAILABLE,
};
pub use sections::{map_sections, order_sections, parse_section_map, SectionMap, OVERVIEW};
pub use text::{element_text, normalize_text, Fingerprint, FingerprintSet};

use scraper::{ElementRef, Html, Selector};

/// Clinical section names in emission order
pub const CANONICAL_SECTIONS: &[&str] = &[
    "Overview",
    "Background",
    "Pathophysiology",
    "Etiology",
    "Epidemiology",
    "Prognosis",
    "Presentation",
    "History",
    "Physical Examination",
    "DDx",
    "Differential Diagnoses",
    "Workup",
    "Approach Considerations",
    "Laboratory Studies",
    "Imaging Studies",
    "Treatment",
    "Medical Care",
    "Surgical Care",
    "Prevention",
    "Medication",
    "Medication Summary",
    "Guidelines",
    "Guidelines Summary",
];

/// Navigation labels that never name a content section
pub const SKIP_SECTION_LABELS: &[&str] = &[
    "Show All",
    "Media Gallery",
    "References",
    "Share",
    "Print",
    "Feedback",
];

/// Path shape of an article overview link
pub const ARTICLE_URL_PATTERN: &str = r"/article/\d+-overview";

pub const MIN_PARAGRAPH_CHARS: usize = 20;
pub const MIN_LIST_ITEM_CHARS: usize = 5;
pub const MIN_HEADING_CHARS: usize = 2;
pub const MIN_LINK_TEXT_CHARS: usize = 4;

/// Returns the first element matched by the first selector that matches anything
pub(crate) fn first_match<'a>(document: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        document.select(&selector).next()
    })
}
