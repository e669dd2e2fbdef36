//! Output module for article records and run reports
//!
//! This module handles:
//! - Writing one JSON file per assembled article
//! - Printing article summaries and batch reports
//! - Printing fetch statistics

mod json;
pub mod report;

pub use json::{output_file_name, write_article_json};
pub use report::{print_article_summary, print_batch_report, print_statistics, FetchStatistics};
