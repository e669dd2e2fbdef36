//! Article link discovery on listing pages
//!
//! Listing pages group article links into containers, each under a category
//! heading. Containers are located by an ordered list of heuristics; the
//! first heuristic producing at least one article wins.

use crate::config::ExtractConfig;
use crate::extract::text::element_text;
use crate::ConfigError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Category used when no heading can be associated with a container
pub const UNKNOWN_CATEGORY: &str = "Unknown";

const HEADING_SELECTOR: &str = ".topic-head, h1, h2, h3, h4, h5, h6";

/// An article found on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDescriptor {
    /// Absolute URL without fragment; unique within one discovery
    pub url: String,
    pub title: String,
    pub category: String,
}

/// Locates link containers in a listing page
type ContainerHeuristic = for<'a> fn(&'a Html, &Regex) -> Vec<ElementRef<'a>>;

/// Container heuristics, most specific first
const HEURISTICS: &[(&str, ContainerHeuristic)] = &[
    ("topic sections", topic_sections),
    ("generic containers", generic_containers),
    ("article link parents", article_link_parents),
];

/// Extracts article descriptors from listing pages
#[derive(Debug, Clone)]
pub struct LinkDiscovery {
    pattern: Regex,
    min_text_chars: usize,
}

impl LinkDiscovery {
    /// Creates a discovery with the configured article pattern
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError::InvalidPattern)` - If the pattern does not compile
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&config.article_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("{}: {}", config.article_pattern, e))
        })?;

        Ok(Self {
            pattern,
            min_text_chars: config.min_link_text_chars,
        })
    }

    /// Whether a URL has the shape of an article link
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    /// Discovers articles in a listing page
    ///
    /// # Arguments
    ///
    /// * `html` - The listing page content
    /// * `base_url` - URL the page was fetched from, used to resolve relative links
    ///
    /// # Returns
    ///
    /// Descriptors deduplicated by URL in first-seen order; empty when no
    /// heuristic finds an article link.
    pub fn discover(&self, html: &str, base_url: &Url) -> Vec<ArticleDescriptor> {
        let document = Html::parse_document(html);

        for (name, heuristic) in HEURISTICS {
            let containers = heuristic(&document, &self.pattern);
            let articles = self.collect(&containers, base_url);
            if !articles.is_empty() {
                tracing::debug!(
                    "Discovered {} articles using {} heuristic",
                    articles.len(),
                    name
                );
                return articles;
            }
        }

        tracing::warn!("No article links found on {}", base_url);
        Vec::new()
    }

    fn collect(&self, containers: &[ElementRef], base_url: &Url) -> Vec<ArticleDescriptor> {
        let Ok(link_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut articles = Vec::new();

        for container in containers {
            let category = container_category(container);

            for link in container.select(&link_selector) {
                let Some(url) = self.qualify(&link, base_url) else {
                    continue;
                };
                if !seen.insert(url.clone()) {
                    continue;
                }

                articles.push(ArticleDescriptor {
                    url,
                    title: element_text(&link),
                    category: category.clone(),
                });
            }
        }

        articles
    }

    /// Absolute fragment-free URL of a link that points at an article
    fn qualify(&self, link: &ElementRef, base_url: &Url) -> Option<String> {
        let href = link.value().attr("href")?;
        let mut url = base_url.join(href).ok()?;
        url.set_fragment(None);

        if !self.pattern.is_match(url.as_str()) {
            return None;
        }

        if element_text(link).chars().count() <= self.min_text_chars {
            return None;
        }

        Some(url.to_string())
    }
}

fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(selector) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Structural hint: `div.topic-section` blocks headed by `div.topic-head`
fn topic_sections<'a>(document: &'a Html, _pattern: &Regex) -> Vec<ElementRef<'a>> {
    select_all(document, "div.topic-section")
}

fn generic_containers<'a>(document: &'a Html, _pattern: &Regex) -> Vec<ElementRef<'a>> {
    select_all(document, "section, ul, ol")
}

/// Parent of every link that looks like an article, each parent once
fn article_link_parents<'a>(document: &'a Html, pattern: &Regex) -> Vec<ElementRef<'a>> {
    let mut seen = HashSet::new();

    select_all(document, "a[href]")
        .into_iter()
        .filter(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| pattern.is_match(href))
        })
        .filter_map(|link| link.parent().and_then(ElementRef::wrap))
        .filter(|parent| seen.insert(parent.id()))
        .collect()
}

fn is_heading(element: &ElementRef) -> bool {
    let value = element.value();
    matches!(value.name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
        || value.classes().any(|class| class == "topic-head")
}

/// Category of a container: a heading inside it, else the nearest preceding one
fn container_category(container: &ElementRef) -> String {
    let Ok(selector) = Selector::parse(HEADING_SELECTOR) else {
        return UNKNOWN_CATEGORY.to_string();
    };

    container
        .select(&selector)
        .map(|heading| element_text(&heading))
        .find(|text| !text.is_empty())
        .or_else(|| nearest_preceding_heading(container, &selector))
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Walks previous siblings, then those of each ancestor, for a heading
fn nearest_preceding_heading(element: &ElementRef, selector: &Selector) -> Option<String> {
    let mut node = Some(**element);

    while let Some(current) = node {
        for sibling in current.prev_siblings().filter_map(ElementRef::wrap) {
            if is_heading(&sibling) {
                let text = element_text(&sibling);
                if !text.is_empty() {
                    return Some(text);
                }
            }

            let nested = sibling
                .select(selector)
                .map(|heading| element_text(&heading))
                .filter(|text| !text.is_empty())
                .last();
            if nested.is_some() {
                return nested;
            }
        }
        node = current.parent();
    }

    None
}
