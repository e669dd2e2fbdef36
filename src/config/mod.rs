//! Configuration module for Medref-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing file is not an error at this level: callers start from
//! [`Config::default`] and only load a file when one is given.
//!
//! # Example
//!
//! ```no_run
//! use medref_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("medref.toml")).unwrap();
//! println!("Base delay: {}s", config.fetch.base_delay);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ContentConfig, ExtractConfig, FetchConfig, IdentityConfig, OutputConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config};
pub use validation::validate;

pub(crate) use types::secs;
