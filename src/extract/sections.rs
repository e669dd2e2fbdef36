//! Section mapping for multi-page articles

use crate::config::ExtractConfig;
use crate::extract::first_match;
use crate::extract::text::element_text;
use crate::fetch::Fetcher;
use scraper::{Html, Selector};
use url::Url;

/// Name of the section served at the article root URL
pub const OVERVIEW: &str = "Overview";

/// Section navigation element, tried in order
const NAV_SELECTORS: &[&str] = &[
    "div.sections-nav",
    "div#dd_nav",
    "nav.sections-nav",
    "ul.sections-nav",
];

/// Ordered section name to URL mapping of one article
///
/// Names are unique. The `Overview` entry always points at the article URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    /// A map holding only the overview section
    pub fn overview_only(overview_url: &str) -> Self {
        Self {
            entries: vec![(OVERVIEW.to_string(), overview_url.to_string())],
        }
    }

    /// Registers a section; the first URL for a name wins
    fn insert_if_absent(&mut self, name: String, url: String) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, url));
        true
    }

    /// Sets a section URL, keeping its position if already present
    fn set(&mut self, name: &str, url: &str) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = url.to_string(),
            None => self.entries.push((name.to_string(), url.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sections in emission order as (name, url)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reorders entries: canonical names first in canonical order, then the rest
/// in their current order
pub fn order_sections(entries: Vec<(String, String)>, canonical: &[String]) -> SectionMap {
    let rank = |name: &str| canonical.iter().position(|c| c == name);

    let (mut known, rest): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|(name, _)| rank(name).is_some());

    // Stable sort keeps discovery order for any repeated canonical rank
    known.sort_by_key(|(name, _)| rank(name));
    known.extend(rest);

    SectionMap { entries: known }
}

/// Builds the section map from an overview page
///
/// # Arguments
///
/// * `html` - The overview page
/// * `overview_url` - Article root URL, used to resolve relative links
/// * `config` - Skip labels and canonical order
pub fn parse_section_map(html: &str, overview_url: &Url, config: &ExtractConfig) -> SectionMap {
    let document = Html::parse_document(html);
    let mut map = SectionMap::default();

    if let Some(nav) = first_match(&document, NAV_SELECTORS) {
        if let Ok(link_selector) = Selector::parse("a[href]") {
            for link in nav.select(&link_selector) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                let href = href.trim();
                if href.is_empty()
                    || href.starts_with('#')
                    || href.to_ascii_lowercase().starts_with("javascript:")
                {
                    continue;
                }

                let name = element_text(&link);
                let skipped = config
                    .skip_labels
                    .iter()
                    .any(|s| !s.is_empty() && name.contains(s.as_str()));
                if name.is_empty() || skipped {
                    continue;
                }

                let Ok(url) = overview_url.join(href) else {
                    tracing::debug!("Skipping unresolvable section link {}", href);
                    continue;
                };

                map.insert_if_absent(name, url.to_string());
            }
        }
    } else {
        tracing::debug!("No section navigation found on {}", overview_url);
    }

    map.set(OVERVIEW, overview_url.as_str());
    order_sections(map.entries, &config.canonical_sections)
}

/// Fetches the overview page and maps its sections
///
/// Falls back to a map holding only the overview when the page cannot be
/// fetched.
pub async fn map_sections(
    fetcher: &mut Fetcher,
    overview_url: &str,
    config: &ExtractConfig,
) -> SectionMap {
    let Ok(base) = Url::parse(overview_url) else {
        tracing::warn!("Invalid overview URL {}", overview_url);
        return SectionMap::overview_only(overview_url);
    };

    match fetcher.fetch(overview_url).await.into_body() {
        Some(html) => {
            let mut map = parse_section_map(&html, &base, config);
            // Keep the caller's URL verbatim even if Url normalized it
            map.set(OVERVIEW, overview_url);
            tracing::info!("Found {} sections: {}", map.len(), map.names().join(", "));
            map
        }
        None => {
            tracing::warn!(
                "Could not fetch overview page {}, scraping Overview only",
                overview_url
            );
            SectionMap::overview_only(overview_url)
        }
    }
}
