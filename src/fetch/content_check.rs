//! Response body validation
//!
//! A 200 response is only accepted if it is neither a challenge page nor a
//! page devoid of medical-reference vocabulary.

use crate::config::ContentConfig;
use crate::fetch::FetchError;

/// Case-insensitive markers of bot-challenge and block pages
pub const BLOCKING_PATTERNS: &[&str] = &[
    "access denied",
    "cloudflare",
    "captcha",
    "bot protection",
    "security check",
    "distil",
    "incapsula",
    "blocked",
];

/// Case-insensitive keywords expected on a genuine reference page
pub const VALIDITY_KEYWORDS: &[&str] = &[
    "medscape",
    "clinical",
    "patient",
    "diagnosis",
    "treatment",
    "disease",
    "symptoms",
    "therapy",
];

/// Minimum total keyword occurrences for a page to count as valid
pub const MIN_VALIDITY_KEYWORDS: usize = 2;

/// Blocking and validity rules applied to response bodies
#[derive(Debug, Clone)]
pub struct ContentRules {
    blocking_patterns: Vec<String>,
    validity_keywords: Vec<String>,
    min_validity_keywords: usize,
}

impl ContentRules {
    pub fn from_config(config: &ContentConfig) -> Self {
        Self {
            blocking_patterns: lowercase_all(&config.blocking_patterns),
            validity_keywords: lowercase_all(&config.validity_keywords),
            min_validity_keywords: config.min_validity_keywords,
        }
    }

    /// Returns the first blocking marker found in the body
    pub fn find_blocking_marker(&self, body: &str) -> Option<&str> {
        let lower = body.to_lowercase();
        self.blocking_patterns
            .iter()
            .find(|pattern| lower.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Total occurrences of all validity keywords in the body
    pub fn keyword_occurrences(&self, body: &str) -> usize {
        let lower = body.to_lowercase();
        self.validity_keywords
            .iter()
            .map(|keyword| lower.matches(keyword.as_str()).count())
            .sum()
    }

    /// Applies the blocking scan, then the validity scan
    pub fn check(&self, body: &str) -> Result<(), FetchError> {
        if let Some(marker) = self.find_blocking_marker(body) {
            return Err(FetchError::ContentBlocked {
                marker: marker.to_string(),
            });
        }

        let found = self.keyword_occurrences(body);
        if found < self.min_validity_keywords {
            return Err(FetchError::ContentInvalid {
                found,
                required: self.min_validity_keywords,
            });
        }

        Ok(())
    }
}

impl Default for ContentRules {
    fn default() -> Self {
        Self::from_config(&ContentConfig::default())
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
