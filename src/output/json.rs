//! JSON export of article records

use crate::article::ArticleRecord;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

const MAX_FILE_STEM_CHARS: usize = 50;

/// Derives a file name from an article title
///
/// Keeps alphanumerics, spaces, `-` and `_`, truncates to 50 characters and
/// replaces spaces with underscores. Falls back to `article` when nothing
/// survives.
pub fn output_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(MAX_FILE_STEM_CHARS)
        .collect();

    let stem = cleaned.trim().replace(' ', "_");
    if stem.is_empty() {
        "article.json".to_string()
    } else {
        format!("{}.json", stem)
    }
}

/// Writes a record as pretty-printed JSON into `directory`
///
/// The directory is created if needed.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(ScrapeError)` - Failed to serialize or write
pub fn write_article_json(record: &ArticleRecord, directory: &Path) -> Result<PathBuf> {
    fs::create_dir_all(directory)?;

    let path = directory.join(output_file_name(&record.title));
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json)?;

    tracing::info!("Wrote {}", path.display());
    Ok(path)
}
