//! Sequential batch assembly of discovered articles

use crate::article::{ArticleAssembler, ArticleRecord};
use crate::extract::ArticleDescriptor;
use crate::Result;

/// Failure reason for an article whose sections all came back empty
pub const NO_CONTENT_REASON: &str = "no section yielded content";

/// An article of a batch that produced no usable record
#[derive(Debug)]
pub struct BatchFailure {
    pub article: ArticleDescriptor,
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<ArticleRecord>,
    pub failed: Vec<BatchFailure>,
    /// Articles never started because the run was stopped
    pub skipped: Vec<ArticleDescriptor>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.attempted() + self.skipped.len()
    }

    pub fn was_interrupted(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Narrows discovered articles by category and count
///
/// The category matches case-insensitively as a substring, so `cardio`
/// selects `Cardiology`.
pub fn select_articles(
    articles: Vec<ArticleDescriptor>,
    category: Option<&str>,
    limit: Option<usize>,
) -> Vec<ArticleDescriptor> {
    let category = category.map(str::to_lowercase);

    articles
        .into_iter()
        .filter(|article| match &category {
            Some(wanted) => article.category.to_lowercase().contains(wanted.as_str()),
            None => true,
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

impl ArticleAssembler {
    /// Assembles articles one after another
    ///
    /// `proceed` is asked before every article; returning false stops the run
    /// and the remaining articles are reported as skipped. Each assembled
    /// record is handed to `save` before the next article starts, so an
    /// interrupted run keeps everything finished so far. A failed article
    /// never stops the run. An article without any content, or whose record
    /// could not be saved, is counted as failed.
    pub async fn assemble_batch<F, S>(
        &mut self,
        articles: Vec<ArticleDescriptor>,
        mut proceed: F,
        mut save: S,
    ) -> BatchReport
    where
        F: FnMut(usize, &ArticleDescriptor) -> bool,
        S: FnMut(&ArticleRecord) -> Result<()>,
    {
        let total = articles.len();
        let article_delay = self.config().fetch.article_delay();
        let mut report = BatchReport::default();
        let mut pending = articles.into_iter().enumerate();

        while let Some((index, article)) = pending.next() {
            if !proceed(index, &article) {
                tracing::warn!("Batch stopped before article {}/{}", index + 1, total);
                report.skipped.push(article);
                report.skipped.extend(pending.by_ref().map(|(_, rest)| rest));
                break;
            }

            if index > 0 {
                self.fetcher().pause(article_delay).await;
            }

            tracing::info!("Processing {}/{}: {}", index + 1, total, article.title);
            match self.assemble(&article.url).await {
                Ok(record) if record.sections.is_empty() => {
                    tracing::warn!("No content extracted for {}", article.title);
                    report.failed.push(BatchFailure {
                        article,
                        reason: NO_CONTENT_REASON.to_string(),
                    });
                }
                Ok(record) => match save(&record) {
                    Ok(()) => report.succeeded.push(record),
                    Err(e) => {
                        tracing::error!("Failed to save {}: {}", article.title, e);
                        report.failed.push(BatchFailure {
                            article,
                            reason: format!("failed to save record: {}", e),
                        });
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to assemble {}: {}", article.title, e);
                    report.failed.push(BatchFailure {
                        article,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Batch finished: {} succeeded, {} failed, {} skipped",
            report.succeeded.len(),
            report.failed.len(),
            report.skipped.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, category: &str) -> ArticleDescriptor {
        ArticleDescriptor {
            url: format!("https://reference.example.com/article/{}-overview", title.len()),
            title: title.to_string(),
            category: category.to_string(),
        }
    }

    #[test]
    fn test_select_by_category_and_limit() {
        let articles = vec![
            article("Atrial Fibrillation", "Cardiology"),
            article("Asthma", "Pulmonology"),
            article("Heart Failure", "Cardiology"),
            article("Hypertension", "Cardiology"),
        ];

        let selected = select_articles(articles.clone(), Some("cardio"), Some(2));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title, "Atrial Fibrillation");
        assert_eq!(selected[1].title, "Heart Failure");

        assert_eq!(select_articles(articles.clone(), None, None).len(), 4);
        assert!(select_articles(articles, Some("Dermatology"), None).is_empty());
    }

    #[tokio::test]
    async fn test_stopped_batch_skips_everything_left() {
        let mut assembler = ArticleAssembler::new(crate::Config::default()).unwrap();
        let articles = vec![article("Asthma", "Pulmonology"), article("Croup", "Pediatrics")];

        let report = assembler
            .assemble_batch(articles, |_, _| false, |_| Ok(()))
            .await;

        assert_eq!(report.attempted(), 0);
        assert_eq!(report.skipped.len(), 2);
        assert!(report.was_interrupted());
        assert_eq!(assembler.fetcher().request_count(), 0);
    }
}
