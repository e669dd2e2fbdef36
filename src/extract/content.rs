//! Section content extraction
//!
//! Walks the main content region of a section page and groups headings,
//! paragraphs, lists and tables into [`ContentBlock`]s. Items whose
//! fingerprint was already seen in the same article are dropped.

use crate::article::{ContentBlock, ContentItem};
use crate::config::ExtractConfig;
use crate::extract::text::{element_text, FingerprintSet};
use crate::extract::first_match;
use crate::fetch::Fetcher;
use scraper::{ElementRef, Html, Selector};

/// Main content region, tried in order
const CONTENT_SELECTORS: &[&str] = &[
    "div.drugdbsectioncontent",
    "div.article-content",
    "div.refsection_content",
    "div.drugdbmain",
];

/// Structural elements walked in document order
const STRUCTURAL_ELEMENTS: &str = "h1, h2, h3, h4, h5, p, ul, ol, table";

/// Class fragments marking navigation, action and branding chrome
const CHROME_CLASS_MARKERS: &[&str] = &["action-items", "back_next_btn", "emed-logo"];

/// Paragraphs containing these are pager or navigation text
const NAV_PHRASES: &[&str] = &["Previous", "Next:", "Show All"];

/// Fetches a section page and extracts its content blocks
///
/// A failed fetch yields no blocks; the caller decides how to report it.
pub async fn extract_section(
    fetcher: &mut Fetcher,
    section_url: &str,
    section_name: &str,
    config: &ExtractConfig,
    seen: &mut FingerprintSet,
) -> Vec<ContentBlock> {
    match fetcher.fetch(section_url).await.into_body() {
        Some(html) => extract_blocks(&html, section_name, config, seen),
        None => Vec::new(),
    }
}

/// Extracts content blocks from a section page
///
/// # Arguments
///
/// * `html` - The section page
/// * `section_name` - Heading of the implicit first block
/// * `config` - Length thresholds
/// * `seen` - Fingerprints already emitted for this article; updated in place
pub fn extract_blocks(
    html: &str,
    section_name: &str,
    config: &ExtractConfig,
    seen: &mut FingerprintSet,
) -> Vec<ContentBlock> {
    let document = Html::parse_document(html);
    let Some(region) = first_match(&document, CONTENT_SELECTORS) else {
        tracing::debug!("No content region found for section {}", section_name);
        return Vec::new();
    };

    let Ok(selector) = Selector::parse(STRUCTURAL_ELEMENTS) else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    let mut current = ContentBlock::new(section_name, None);

    for element in region.select(&selector) {
        if is_chrome(&element, &region) || is_nested_in_structure(&element, &region) {
            continue;
        }

        let item = match element.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" => {
                let heading = element_text(&element);
                if heading.chars().count() > config.min_heading_chars {
                    let previous = std::mem::replace(
                        &mut current,
                        ContentBlock::new(heading, heading_level(&element)),
                    );
                    if !previous.is_empty() {
                        blocks.push(previous);
                    }
                }
                None
            }
            "p" => paragraph(&element, config),
            "ul" | "ol" => list(&element, config),
            "table" => table(&element),
            _ => None,
        };

        if let Some(item) = item {
            if seen.insert(item.fingerprint()) {
                current.items.push(item);
            }
        }
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

fn paragraph(element: &ElementRef, config: &ExtractConfig) -> Option<ContentItem> {
    let text = element_text(element);

    if text.chars().count() <= config.min_paragraph_chars {
        return None;
    }

    if NAV_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return None;
    }

    Some(ContentItem::Paragraph { text })
}

fn list(element: &ElementRef, config: &ExtractConfig) -> Option<ContentItem> {
    let items: Vec<String> = element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "li")
        .map(|li| element_text(&li))
        .filter(|text| text.chars().count() > config.min_list_item_chars)
        .collect();

    if items.is_empty() {
        return None;
    }

    Some(ContentItem::List {
        ordered: element.value().name() == "ol",
        items,
    })
}

fn table(element: &ElementRef) -> Option<ContentItem> {
    let row_selector = Selector::parse("tr").ok()?;
    let cell_selector = Selector::parse("th, td").ok()?;

    let rows: Vec<Vec<String>> = element
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| element_text(&cell))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    // Header plus at least one data row
    if rows.len() < 2 {
        return None;
    }

    Some(ContentItem::Table { rows })
}

fn heading_level(element: &ElementRef) -> Option<u8> {
    element.value().name().strip_prefix('h')?.parse().ok()
}

/// True if the element or an ancestor inside the region carries a chrome class
fn is_chrome(element: &ElementRef, region: &ElementRef) -> bool {
    let has_marker = |el: &ElementRef| {
        el.value().attr("class").is_some_and(|classes| {
            CHROME_CLASS_MARKERS
                .iter()
                .any(|marker| classes.contains(marker))
        })
    };

    has_marker(element) || ancestors_within(element, region).any(|el| has_marker(&el))
}

/// True if the element sits inside a list or table of the region
///
/// Those containers are captured whole, so their inner elements are skipped.
fn is_nested_in_structure(element: &ElementRef, region: &ElementRef) -> bool {
    ancestors_within(element, region)
        .any(|el| matches!(el.value().name(), "ul" | "ol" | "table"))
}

/// Element ancestors strictly below the region root
fn ancestors_within<'a>(
    element: &ElementRef<'a>,
    region: &ElementRef<'a>,
) -> impl Iterator<Item = ElementRef<'a>> {
    let region_id = region.id();
    element
        .ancestors()
        .take_while(move |node| node.id() != region_id)
        .filter_map(ElementRef::wrap)
}
