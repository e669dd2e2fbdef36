use crate::config::types::{Config, ContentConfig, ExtractConfig, FetchConfig, IdentityConfig};
use crate::ConfigError;
use regex::Regex;

/// Tuning knobs exposed to users are bounded to this range
const TUNING_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_content_config(&config.content)?;
    validate_extract_config(&config.extract)?;
    validate_identity_config(&config.identity)?;

    if config.output.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates request pacing and retry configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if !(1.0..=10.0).contains(&config.base_delay) {
        return Err(ConfigError::Validation(format!(
            "base-delay must be between 1 and 10 seconds, got {}",
            config.base_delay
        )));
    }

    validate_tuning("max-retries", config.max_retries)?;
    validate_tuning("rotation-frequency", config.rotation_frequency)?;

    if config.timeout <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeout must be positive, got {}",
            config.timeout
        )));
    }

    if config.jitter_min < 0.0 || config.jitter_max < config.jitter_min {
        return Err(ConfigError::Validation(format!(
            "jitter bounds must satisfy 0 <= jitter-min <= jitter-max, got {}..{}",
            config.jitter_min, config.jitter_max
        )));
    }

    let cooldowns = [
        ("forbidden-cooldown", config.forbidden_cooldown),
        ("rate-limit-cooldown", config.rate_limit_cooldown),
        ("server-error-cooldown", config.server_error_cooldown),
        ("default-cooldown", config.default_cooldown),
        ("blocked-cooldown", config.blocked_cooldown),
        ("invalid-content-cooldown", config.invalid_content_cooldown),
        ("max-backoff", config.max_backoff),
        ("section-delay", config.section_delay),
        ("article-delay", config.article_delay),
    ];
    for (name, value) in cooldowns {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a non-negative number of seconds, got {}",
                name, value
            )));
        }
    }

    if config.success_window == 0 || config.history_size < config.success_window {
        return Err(ConfigError::Validation(format!(
            "history-size ({}) must be at least success-window ({}), which must be >= 1",
            config.history_size, config.success_window
        )));
    }

    Ok(())
}

/// Validates a user-facing tuning value
pub(crate) fn validate_tuning(name: &str, value: u32) -> Result<(), ConfigError> {
    if !TUNING_RANGE.contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name,
            TUNING_RANGE.start(),
            TUNING_RANGE.end(),
            value
        )));
    }
    Ok(())
}

fn validate_content_config(config: &ContentConfig) -> Result<(), ConfigError> {
    if config.blocking_patterns.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "blocking patterns cannot be empty strings".to_string(),
        ));
    }

    if config.min_validity_keywords > 0 && config.validity_keywords.is_empty() {
        return Err(ConfigError::Validation(format!(
            "min-validity-keywords is {} but no validity keywords are configured",
            config.min_validity_keywords
        )));
    }

    Ok(())
}

fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    Regex::new(&config.article_pattern).map_err(|e| {
        ConfigError::InvalidPattern(format!(
            "article-pattern '{}' is not a valid regex: {}",
            config.article_pattern, e
        ))
    })?;

    if config.canonical_sections.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "canonical section names cannot be empty".to_string(),
        ));
    }

    // A blank label would match every navigation link
    if config.skip_labels.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "skip labels cannot be empty strings".to_string(),
        ));
    }

    Ok(())
}

fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "at least one user agent is required".to_string(),
        ));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user agents cannot be empty strings".to_string(),
        ));
    }

    Ok(())
}
