use serde::Deserialize;
use std::time::Duration;

use crate::extract::{
    ARTICLE_URL_PATTERN, CANONICAL_SECTIONS, MIN_HEADING_CHARS, MIN_LINK_TEXT_CHARS,
    MIN_LIST_ITEM_CHARS, MIN_PARAGRAPH_CHARS, SKIP_SECTION_LABELS,
};
use crate::fetch::{BLOCKING_PATTERNS, DEFAULT_USER_AGENTS, MIN_VALIDITY_KEYWORDS, VALIDITY_KEYWORDS};

/// Main configuration structure for Medref-Scraper
///
/// Every section is optional in the TOML file; missing values fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub content: ContentConfig,
    pub extract: ExtractConfig,
    pub identity: IdentityConfig,
    pub output: OutputConfig,
}

/// Request pacing, retry and cooldown configuration
///
/// All durations are expressed in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base delay slept before every attempt, before jitter
    #[serde(rename = "base-delay")]
    pub base_delay: f64,

    /// Attempts made for one URL before giving up
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// A new identity is applied every this many requests
    #[serde(rename = "rotation-frequency")]
    pub rotation_frequency: u32,

    /// Per-request timeout
    pub timeout: f64,

    /// Lower bound of the pre-attempt jitter
    #[serde(rename = "jitter-min")]
    pub jitter_min: f64,

    /// Upper bound of the pre-attempt jitter
    #[serde(rename = "jitter-max")]
    pub jitter_max: f64,

    /// Cooldown after HTTP 403
    #[serde(rename = "forbidden-cooldown")]
    pub forbidden_cooldown: f64,

    /// Cooldown unit after HTTP 429, multiplied by the attempt number
    #[serde(rename = "rate-limit-cooldown")]
    pub rate_limit_cooldown: f64,

    /// Cooldown after HTTP 5xx
    #[serde(rename = "server-error-cooldown")]
    pub server_error_cooldown: f64,

    /// Cooldown after any other non-200 status
    #[serde(rename = "default-cooldown")]
    pub default_cooldown: f64,

    /// Cooldown after a challenge page was detected
    #[serde(rename = "blocked-cooldown")]
    pub blocked_cooldown: f64,

    /// Cooldown after a page without enough domain keywords
    #[serde(rename = "invalid-content-cooldown")]
    pub invalid_content_cooldown: f64,

    /// Ceiling for the exponential transport backoff
    #[serde(rename = "max-backoff")]
    pub max_backoff: f64,

    /// Number of outcomes retained in the rolling history
    #[serde(rename = "history-size")]
    pub history_size: usize,

    /// Number of most recent outcomes used for the success rate
    #[serde(rename = "success-window")]
    pub success_window: usize,

    /// Delay between two sections of the same article, before jitter
    #[serde(rename = "section-delay")]
    pub section_delay: f64,

    /// Delay between two articles of a batch, before jitter
    #[serde(rename = "article-delay")]
    pub article_delay: f64,
}

impl FetchConfig {
    pub fn base_delay(&self) -> Duration {
        secs(self.base_delay)
    }

    pub fn timeout(&self) -> Duration {
        secs(self.timeout)
    }

    pub fn section_delay(&self) -> Duration {
        secs(self.section_delay)
    }

    pub fn article_delay(&self) -> Duration {
        secs(self.article_delay)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_delay: 3.0,
            max_retries: 10,
            rotation_frequency: 3,
            timeout: 15.0,
            jitter_min: 0.5,
            jitter_max: 2.0,
            forbidden_cooldown: 8.0,
            rate_limit_cooldown: 15.0,
            server_error_cooldown: 10.0,
            default_cooldown: 2.0,
            blocked_cooldown: 10.0,
            invalid_content_cooldown: 1.0,
            max_backoff: 60.0,
            history_size: 100,
            success_window: 20,
            section_delay: 1.0,
            article_delay: 3.0,
        }
    }
}

/// Response content checks applied to every HTTP 200 body
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Case-insensitive markers of a challenge or block page
    #[serde(rename = "blocking-patterns")]
    pub blocking_patterns: Vec<String>,

    /// Case-insensitive keywords expected on a genuine article page
    #[serde(rename = "validity-keywords")]
    pub validity_keywords: Vec<String>,

    /// Minimum total keyword occurrences for a page to count as valid
    #[serde(rename = "min-validity-keywords")]
    pub min_validity_keywords: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            blocking_patterns: to_strings(BLOCKING_PATTERNS),
            validity_keywords: to_strings(VALIDITY_KEYWORDS),
            min_validity_keywords: MIN_VALIDITY_KEYWORDS,
        }
    }
}

/// Section mapping and content extraction rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Clinical section names in the order they are emitted
    #[serde(rename = "canonical-sections")]
    pub canonical_sections: Vec<String>,

    /// Navigation labels that never name a content section
    #[serde(rename = "skip-labels")]
    pub skip_labels: Vec<String>,

    /// Regular expression an article link must match
    #[serde(rename = "article-pattern")]
    pub article_pattern: String,

    /// Paragraphs must be longer than this many characters
    #[serde(rename = "min-paragraph-chars")]
    pub min_paragraph_chars: usize,

    /// List items must be longer than this many characters
    #[serde(rename = "min-list-item-chars")]
    pub min_list_item_chars: usize,

    /// Headings must be longer than this many characters
    #[serde(rename = "min-heading-chars")]
    pub min_heading_chars: usize,

    /// Article link text must be longer than this many characters
    #[serde(rename = "min-link-text-chars")]
    pub min_link_text_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            canonical_sections: to_strings(CANONICAL_SECTIONS),
            skip_labels: to_strings(SKIP_SECTION_LABELS),
            article_pattern: ARTICLE_URL_PATTERN.to_string(),
            min_paragraph_chars: MIN_PARAGRAPH_CHARS,
            min_list_item_chars: MIN_LIST_ITEM_CHARS,
            min_heading_chars: MIN_HEADING_CHARS,
            min_link_text_chars: MIN_LINK_TEXT_CHARS,
        }
    }
}

/// Client identities used for rotation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: to_strings(DEFAULT_USER_AGENTS),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one JSON record per article
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "articles".to_string(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Converts a non-negative number of seconds into a Duration
pub(crate) fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
