use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - The validated configuration; missing keys take defaults
/// * `Err(ConfigError)` - Failed to read, parse or validate the file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// SHA-256 hex digest of the configuration file, logged at startup
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[fetch]
base-delay = 2
max-retries = 4
rotation-frequency = 5

[content]
min-validity-keywords = 3
blocking-patterns = ["captcha", "access denied"]

[extract]
canonical-sections = ["Overview", "Treatment"]

[output]
directory = "./out"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetch.base_delay, 2.0);
        assert_eq!(config.fetch.max_retries, 4);
        assert_eq!(config.fetch.rotation_frequency, 5);
        assert_eq!(config.content.min_validity_keywords, 3);
        assert_eq!(config.content.blocking_patterns.len(), 2);
        assert_eq!(config.extract.canonical_sections, vec!["Overview", "Treatment"]);
        assert_eq!(config.output.directory, "./out");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let file = create_temp_config("[fetch]\nmax-retries = 2\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetch.max_retries, 2);
        assert_eq!(config.fetch.base_delay, 3.0);
        assert_eq!(config.fetch.rotation_frequency, 3);
        assert!(!config.identity.user_agents.is_empty());
        assert_eq!(config.content.min_validity_keywords, 2);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/medref.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[fetch]\nmax-retries = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_hash_tracks_settings() {
        let slow = create_temp_config("[fetch]\nbase-delay = 5\n");
        let fast = create_temp_config("[fetch]\nbase-delay = 1\n");

        let hash = compute_config_hash(slow.path()).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(hash, compute_config_hash(slow.path()).unwrap());
        assert_ne!(hash, compute_config_hash(fast.path()).unwrap());
    }
}
