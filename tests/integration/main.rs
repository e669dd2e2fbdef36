//! Integration tests for the scraper
//!
//! These tests use wiremock to create mock HTTP servers and drive the
//! fetcher and the article assembler end-to-end.

mod article_tests;
mod fetch_tests;

use medref_scraper::config::Config;

/// Creates a test configuration with every delay and cooldown set to zero
pub fn create_test_config(max_retries: u32) -> Config {
    let mut config = Config::default();

    let fetch = &mut config.fetch;
    fetch.base_delay = 0.0;
    fetch.max_retries = max_retries;
    fetch.timeout = 5.0;
    fetch.jitter_min = 0.0;
    fetch.jitter_max = 0.0;
    fetch.forbidden_cooldown = 0.0;
    fetch.rate_limit_cooldown = 0.0;
    fetch.server_error_cooldown = 0.0;
    fetch.default_cooldown = 0.0;
    fetch.blocked_cooldown = 0.0;
    fetch.invalid_content_cooldown = 0.0;
    fetch.section_delay = 0.0;
    fetch.article_delay = 0.0;

    config
}

/// Wraps content in a page that passes the validity check
pub fn clinical_page(body: &str) -> String {
    format!(
        r#"<html><head><title>Clinical Reference</title></head><body>
        <p class="tagline">Clinical reference for patient care</p>
        {}
        </body></html>"#,
        body
    )
}
