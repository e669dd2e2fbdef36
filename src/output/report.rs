//! Console reports for articles, batches and fetch statistics

use crate::article::{ArticleRecord, BatchReport};
use crate::fetch::{FetchStatus, Fetcher};
use std::collections::HashMap;

/// Snapshot of a fetcher's counters
#[derive(Debug, Clone)]
pub struct FetchStatistics {
    /// Requests issued, retries included
    pub requests_made: u64,

    /// Number of times a new identity was applied
    pub identity_rotations: u64,

    pub identity_pool_size: usize,

    pub current_identity: String,

    /// Success rate over the recent window, None before the first request
    pub success_rate: Option<f64>,

    /// Retained outcomes grouped by classification
    pub outcomes_by_status: HashMap<FetchStatus, usize>,
}

impl FetchStatistics {
    pub fn from_fetcher(fetcher: &Fetcher) -> Self {
        Self {
            requests_made: fetcher.request_count(),
            identity_rotations: fetcher.identity_rotations(),
            identity_pool_size: fetcher.identity_pool_size(),
            current_identity: fetcher.current_identity().to_string(),
            success_rate: fetcher.success_rate(),
            outcomes_by_status: fetcher.history().counts_by_status(),
        }
    }
}

/// Prints fetch statistics to stdout
pub fn print_statistics(stats: &FetchStatistics) {
    println!("=== Fetch Statistics ===\n");
    println!("  Requests made: {}", stats.requests_made);
    println!(
        "  Identities applied: {} (pool of {})",
        stats.identity_rotations, stats.identity_pool_size
    );
    println!("  Current identity: {}", stats.current_identity);

    match stats.success_rate {
        Some(rate) => println!("  Recent success rate: {:.1}%", rate * 100.0),
        None => println!("  Recent success rate: n/a"),
    }

    if !stats.outcomes_by_status.is_empty() {
        println!("\nOutcomes by Status:");
        let mut counts: Vec<_> = stats.outcomes_by_status.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        for (status, count) in counts {
            println!("  {}: {}", status, count);
        }
    }
    println!();
}

/// Prints the summary of one assembled article
pub fn print_article_summary(record: &ArticleRecord) {
    println!("=== {} ===\n", record.title);
    println!("  URL: {}", record.url);
    println!("  Authors: {}", record.authors.join("; "));
    println!("  Last updated: {}", record.last_updated);
    println!(
        "  Sections scraped: {}/{}",
        record.sections_scraped, record.sections_found
    );
    println!("  Content blocks: {}", record.total_content_blocks);

    for section in &record.sections {
        println!("    - {} ({} blocks)", section.name, section.blocks.len());
    }

    if !record.failed_sections.is_empty() {
        println!("  Sections without content: {}", record.failed_sections.join(", "));
    }
    println!();
}

/// Prints the outcome of a batch run
pub fn print_batch_report(report: &BatchReport) {
    println!("=== Batch Report ===\n");
    println!(
        "  Succeeded: {}/{}",
        report.succeeded.len(),
        report.attempted()
    );

    for record in &report.succeeded {
        println!(
            "    ✓ {} ({} sections, {} blocks)",
            record.title, record.sections_scraped, record.total_content_blocks
        );
    }

    if !report.failed.is_empty() {
        println!("\n  Failed: {}", report.failed.len());
        for failure in &report.failed {
            println!("    ✗ {}: {}", failure.article.title, failure.reason);
        }
    }

    if report.was_interrupted() {
        println!(
            "\n  Interrupted: {} of {} articles not started",
            report.skipped.len(),
            report.total()
        );
    }
    println!();
}
