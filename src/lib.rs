//! Medref-Scraper: a resilient medical-reference article harvester
//!
//! This crate fetches multi-section reference articles, extracts their structured
//! content (headings, paragraphs, lists, tables), removes fragments repeated across
//! sections and hands back one plain [`ArticleRecord`] per article.

pub mod article;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;

use thiserror::Error;

/// Main error type for Medref-Scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: fetch::FetchError,
    },

    #[error("Article metadata unavailable for {url}")]
    MetadataUnavailable { url: String },

    #[error("Not an article URL: {0}")]
    NotAnArticle(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Medref-Scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use article::{ArticleAssembler, ArticleRecord, ContentBlock, ContentItem};
pub use config::Config;
pub use extract::{ArticleDescriptor, SectionMap};
pub use fetch::{FetchResult, Fetcher};
