//! Article assembler - drives section mapping and extraction for one article

use crate::article::{ArticleRecord, Section};
use crate::config::Config;
use crate::extract::{
    extract_section, map_sections, parse_metadata, ArticleDescriptor, FingerprintSet,
    LinkDiscovery,
};
use crate::fetch::Fetcher;
use crate::{Result, ScrapeError};
use url::Url;

/// Builds article records through a single fetcher
///
/// All requests of all articles go through the same fetcher, so identity
/// rotation and the success-rate window span the whole session.
pub struct ArticleAssembler {
    fetcher: Fetcher,
    discovery: LinkDiscovery,
    config: Config,
}

impl ArticleAssembler {
    /// Creates an assembler with a fresh fetcher
    ///
    /// # Returns
    ///
    /// * `Err(ScrapeError::Config)` - If the identity pool is empty or the
    ///   article pattern does not compile
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Self::with_fetcher(fetcher, config)
    }

    /// Creates an assembler around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, config: Config) -> Result<Self> {
        let discovery = LinkDiscovery::new(&config.extract)?;

        Ok(Self {
            fetcher,
            discovery,
            config,
        })
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a URL looks like an article overview
    pub fn is_article_url(&self, url: &str) -> bool {
        Url::parse(url).is_ok() && self.discovery.matches(url)
    }

    /// Fetches a listing page and discovers the articles it links to
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ArticleDescriptor>)` - Possibly empty list of articles
    /// * `Err(ScrapeError::Fetch)` - If the listing page could not be fetched
    pub async fn discover(&mut self, listing_url: &str) -> Result<Vec<ArticleDescriptor>> {
        let base = Url::parse(listing_url)?;

        tracing::info!("Discovering articles on {}", listing_url);
        let html = self
            .fetcher
            .fetch(listing_url)
            .await
            .into_result()
            .map_err(|source| ScrapeError::Fetch {
                url: listing_url.to_string(),
                source,
            })?;

        let articles = self.discovery.discover(&html, &base);
        tracing::info!("Found {} articles on {}", articles.len(), listing_url);
        Ok(articles)
    }

    /// Assembles a complete article
    ///
    /// # Process
    ///
    /// 1. Map the article's sections from its overview page
    /// 2. Extract every section in map order, sharing one fingerprint set
    /// 3. Re-fetch the overview page for title, authors and update date
    ///
    /// Sections that yield nothing are listed in `failed_sections` and do
    /// not abort the article.
    ///
    /// # Returns
    ///
    /// * `Ok(ArticleRecord)` - The assembled article
    /// * `Err(ScrapeError::MetadataUnavailable)` - If the overview page could
    ///   not be fetched for metadata
    pub async fn assemble(&mut self, article_url: &str) -> Result<ArticleRecord> {
        tracing::info!("Assembling article {}", article_url);

        let section_map = map_sections(&mut self.fetcher, article_url, &self.config.extract).await;
        let section_delay = self.config.fetch.section_delay();

        let mut seen = FingerprintSet::new();
        let mut sections = Vec::new();
        let mut failed_sections = Vec::new();

        for (index, (name, section_url)) in section_map.iter().enumerate() {
            if index > 0 {
                self.fetcher.pause(section_delay).await;
            }

            tracing::info!(
                "Scraping section {}/{}: {}",
                index + 1,
                section_map.len(),
                name
            );
            let blocks = extract_section(
                &mut self.fetcher,
                section_url,
                name,
                &self.config.extract,
                &mut seen,
            )
            .await;

            if blocks.is_empty() {
                tracing::warn!("No content extracted from section {} ({})", name, section_url);
                failed_sections.push(name.to_string());
            } else {
                tracing::debug!("Section {} yielded {} blocks", name, blocks.len());
                sections.push(Section {
                    name: name.to_string(),
                    url: section_url.to_string(),
                    blocks,
                });
            }
        }

        self.fetcher.pause(section_delay).await;
        let overview = self
            .fetcher
            .fetch(article_url)
            .await
            .into_body()
            .ok_or_else(|| ScrapeError::MetadataUnavailable {
                url: article_url.to_string(),
            })?;
        let metadata = parse_metadata(&overview);

        let total_content_blocks = sections.iter().map(|s| s.blocks.len()).sum();
        tracing::info!(
            "Assembled {}: {}/{} sections, {} content blocks",
            metadata.title,
            sections.len(),
            section_map.len(),
            total_content_blocks
        );

        Ok(ArticleRecord {
            url: article_url.to_string(),
            title: metadata.title,
            authors: metadata.authors,
            last_updated: metadata.last_updated,
            sections_found: section_map.len(),
            sections_scraped: sections.len(),
            total_content_blocks,
            sections,
            failed_sections,
        })
    }
}
