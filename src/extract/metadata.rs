//! Article metadata: title, authors and last update

use crate::extract::text::element_text;
use scraper::{Html, Selector};

pub const TITLE_UNAVAILABLE: &str = "Title not found";
pub const AUTHORS_UNAVAILABLE: &str = "Authors information not available";
pub const DATE_UNAVAILABLE: &str = "Date not available";

const AUTHOR_LABEL: &str = "Author:";
const AUTHOR_TRUNCATION: &str = "more...";
const UPDATED_LABEL: &str = "Updated:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMetadata {
    pub title: String,
    /// Never empty
    pub authors: Vec<String>,
    pub last_updated: String,
}

/// Reads metadata from an overview page, substituting placeholders for
/// anything missing
pub fn parse_metadata(html: &str) -> ArticleMetadata {
    let document = Html::parse_document(html);

    let title = first_text(&document, &["h1", "title"])
        .unwrap_or_else(|| TITLE_UNAVAILABLE.to_string());

    let authors = listed_authors(&document)
        .or_else(|| meta_authors(&document))
        .unwrap_or_else(|| vec![AUTHORS_UNAVAILABLE.to_string()]);

    let last_updated = first_text(&document, &["div.clinref_updated"])
        .map(|text| text.replace(UPDATED_LABEL, "").trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DATE_UNAVAILABLE.to_string());

    ArticleMetadata {
        title,
        authors,
        last_updated,
    }
}

/// First non-empty text, trying every match of each selector in order
fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        let text = document
            .select(&selector)
            .map(|element| element_text(&element))
            .find(|text| !text.is_empty());
        text
    })
}

/// Authors from the `Author:` entry of the title info list
fn listed_authors(document: &Html) -> Option<Vec<String>> {
    let selector = Selector::parse("div.condition-title-info li").ok()?;

    let entry = document
        .select(&selector)
        .map(|li| element_text(&li))
        .find(|text| text.contains(AUTHOR_LABEL))?;

    let (_, names) = entry.split_once(AUTHOR_LABEL)?;
    let names = names.split(AUTHOR_TRUNCATION).next().unwrap_or_default();

    non_empty(split_names(names, &[';']))
}

/// Authors from `<meta name="author">`
fn meta_authors(document: &Html) -> Option<Vec<String>> {
    let selector = Selector::parse(r#"meta[name="author"]"#).ok()?;
    let content = document.select(&selector).next()?.value().attr("content")?;

    non_empty(split_names(content, &[';', ',']))
}

fn split_names(names: &str, separators: &[char]) -> Vec<String> {
    names
        .split(separators)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(names: Vec<String>) -> Option<Vec<String>> {
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}
