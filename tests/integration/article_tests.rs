use crate::{clinical_page, create_test_config};
use medref_scraper::article::{ArticleAssembler, ContentItem, NO_CONTENT_REASON};
use medref_scraper::extract::{map_sections, ArticleDescriptor, SectionMap, AUTHORS_UNAVAILABLE};
use medref_scraper::fetch::Fetcher;
use medref_scraper::output::write_article_json;
use medref_scraper::ScrapeError;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SHARED_PARAGRAPH: &str =
    "This information is not a substitute for professional medical advice.";

fn overview_page(id: u32, title: &str) -> String {
    clinical_page(&format!(
        r#"<h1>{title}</h1>
        <div class="condition-title-info"><ul>
          <li>Author: Jane Roe, MD; John Doe, MD more... Chief Editor: Ann Poe</li>
        </ul></div>
        <div class="clinref_updated">Updated: Jan 05, 2024</div>
        <div class="sections-nav">
          <a href="/article/{id}-overview">Overview</a>
          <a href="/article/{id}-treatment">Treatment</a>
          <a href="/article/{id}-references">References</a>
        </div>
        <div class="article-content">
          <p>{title} is a chronic inflammatory disorder of the airways.</p>
          <p>{shared}</p>
        </div>"#,
        id = id,
        title = title,
        shared = SHARED_PARAGRAPH,
    ))
}

fn treatment_page() -> String {
    clinical_page(&format!(
        r#"<div class="article-content">
          <h2>Pharmacologic Therapy</h2>
          <p>Inhaled corticosteroids are the mainstay of long-term control.</p>
          <ul><li>Short-acting bronchodilators</li><li>Leukotriene modifiers</li></ul>
          <p>{}</p>
          <div class="back_next_btn"><p>Next: Medication and dosing tables</p></div>
        </div>"#,
        SHARED_PARAGRAPH
    ))
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Reachable overview with a title but no content region and no navigation
fn empty_overview_page(title: &str) -> String {
    clinical_page(&format!(
        "<h1>{}</h1><p>Diagnosis and treatment details are not published yet.</p>",
        title
    ))
}

fn descriptor(server: &MockServer, id: u32, title: &str) -> ArticleDescriptor {
    ArticleDescriptor {
        url: format!("{}/article/{}-overview", server.uri(), id),
        title: title.to_string(),
        category: "Pulmonology".to_string(),
    }
}

async fn mount_status(server: &MockServer, page_path: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_assemble_deduplicates_across_sections() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/article/100-overview", overview_page(100, "Asthma")).await;
    mount_page(&mock_server, "/article/100-treatment", treatment_page()).await;

    let mut assembler = ArticleAssembler::new(create_test_config(2)).unwrap();
    let url = format!("{}/article/100-overview", mock_server.uri());

    let record = assembler.assemble(&url).await.unwrap();

    assert_eq!(record.url, url);
    assert_eq!(record.title, "Asthma");
    assert_eq!(record.authors, vec!["Jane Roe, MD", "John Doe, MD"]);
    assert_eq!(record.last_updated, "Jan 05, 2024");
    assert_eq!(record.sections_found, 2);
    assert_eq!(record.sections_scraped, 2);
    assert!(record.failed_sections.is_empty());

    let names: Vec<_> = record.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Overview", "Treatment"]);

    let shared_count = record
        .items()
        .filter(|item| {
            matches!(item, ContentItem::Paragraph { text } if text == SHARED_PARAGRAPH)
        })
        .count();
    assert_eq!(shared_count, 1);

    let treatment = record.section("Treatment").unwrap();
    assert_eq!(treatment.blocks.len(), 1);
    assert_eq!(treatment.blocks[0].heading, "Pharmacologic Therapy");
    assert_eq!(treatment.blocks[0].items.len(), 2);

    assert_eq!(
        record.total_content_blocks,
        record.sections.iter().map(|s| s.blocks.len()).sum::<usize>()
    );
}

#[tokio::test]
async fn test_failed_section_is_reported_not_fatal() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/article/200-overview", overview_page(200, "Croup")).await;
    mount_status(&mock_server, "/article/200-treatment", 500).await;

    let mut assembler = ArticleAssembler::new(create_test_config(2)).unwrap();
    let url = format!("{}/article/200-overview", mock_server.uri());

    let record = assembler.assemble(&url).await.unwrap();

    assert_eq!(record.sections_found, 2);
    assert_eq!(record.sections_scraped, 1);
    assert_eq!(record.failed_sections, vec!["Treatment"]);
    assert!(record.section("Treatment").is_none());
}

#[tokio::test]
async fn test_unreachable_overview_fails_article() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/article/300-overview", 503).await;

    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let url = format!("{}/article/300-overview", mock_server.uri());

    let result = assembler.assemble(&url).await;
    assert!(matches!(result, Err(ScrapeError::MetadataUnavailable { .. })));
}

#[tokio::test]
async fn test_section_map_falls_back_to_overview() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/article/400-overview", 404).await;

    let config = create_test_config(1);
    let mut fetcher = Fetcher::new(&config).unwrap();
    let url = format!("{}/article/400-overview", mock_server.uri());

    let map = map_sections(&mut fetcher, &url, &config.extract).await;
    assert_eq!(map, SectionMap::overview_only(&url));
}

#[tokio::test]
async fn test_section_map_always_points_overview_at_input() {
    let mock_server = MockServer::start().await;
    let page = clinical_page(
        r#"<div id="dd_nav">
          <a href="/somewhere-else">Overview</a>
          <a href="/article/500-workup">Workup</a>
          <a href="/article/500-media">Media Gallery</a>
        </div>"#,
    );
    mount_page(&mock_server, "/article/500-overview", page).await;

    let config = create_test_config(1);
    let mut fetcher = Fetcher::new(&config).unwrap();
    let url = format!("{}/article/500-overview", mock_server.uri());

    let map = map_sections(&mut fetcher, &url, &config.extract).await;
    assert_eq!(map.get("Overview"), Some(url.as_str()));
    assert_eq!(map.names(), vec!["Overview", "Workup"]);
}

#[tokio::test]
async fn test_discover_and_batch_continue_past_failures() {
    let mock_server = MockServer::start().await;
    let listing = clinical_page(
        r#"<div class="topic-section">
          <div class="topic-head">Pulmonology</div>
          <a href="/article/600-overview">Bronchiolitis</a>
          <a href="/article/700-overview">Asthma</a>
          <a href="/article/700-overview">Asthma duplicate</a>
        </div>"#,
    );
    mount_page(&mock_server, "/listing", listing).await;
    mount_status(&mock_server, "/article/600-overview", 404).await;
    mount_page(&mock_server, "/article/700-overview", overview_page(700, "Asthma")).await;
    mount_page(&mock_server, "/article/700-treatment", treatment_page()).await;

    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let articles = assembler
        .discover(&format!("{}/listing", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Bronchiolitis");
    assert_eq!(articles[0].category, "Pulmonology");
    assert_eq!(
        articles[1].url,
        format!("{}/article/700-overview", mock_server.uri())
    );

    let mut asked = Vec::new();
    let report = assembler
        .assemble_batch(
            articles,
            |index, _| {
                asked.push(index);
                true
            },
            |_| Ok(()),
        )
        .await;

    assert_eq!(asked, vec![0, 1]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].article.title, "Bronchiolitis");
    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.succeeded[0].title, "Asthma");
    assert_ne!(report.succeeded[0].authors, vec![AUTHORS_UNAVAILABLE]);
    assert!(!report.was_interrupted());
}

#[tokio::test]
async fn test_discover_unreachable_listing_is_error() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/listing", 500).await;

    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let result = assembler
        .discover(&format!("{}/listing", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(ScrapeError::Fetch { .. })));
}

#[tokio::test]
async fn test_batch_saves_each_record_before_next_article() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/article/800-overview", overview_page(800, "Asthma")).await;
    mount_page(&mock_server, "/article/800-treatment", treatment_page()).await;
    mount_page(&mock_server, "/article/900-overview", empty_overview_page("Croup")).await;

    let output = TempDir::new().unwrap();
    let written = output.path().join("Asthma.json");
    let articles = vec![
        descriptor(&mock_server, 800, "Asthma"),
        descriptor(&mock_server, 900, "Croup"),
    ];

    let mut written_before_second = false;
    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let report = assembler
        .assemble_batch(
            articles,
            |index, _| {
                if index == 1 {
                    written_before_second = written.exists();
                }
                true
            },
            |record| write_article_json(record, output.path()).map(|_| ()),
        )
        .await;

    assert!(written_before_second);
    assert!(written.exists());
    assert!(!output.path().join("Croup.json").exists());

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(saved["title"], "Asthma");

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.attempted(), 2);
}

#[tokio::test]
async fn test_batch_article_without_content_is_failure() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/article/910-overview", empty_overview_page("Croup")).await;

    let mut saved = Vec::new();
    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let report = assembler
        .assemble_batch(
            vec![descriptor(&mock_server, 910, "Croup")],
            |_, _| true,
            |record| {
                saved.push(record.title.clone());
                Ok(())
            },
        )
        .await;

    assert!(saved.is_empty());
    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].article.title, "Croup");
    assert_eq!(report.failed[0].reason, NO_CONTENT_REASON);
}

#[tokio::test]
async fn test_batch_save_error_is_failure() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/article/920-overview", overview_page(920, "Asthma")).await;
    mount_page(&mock_server, "/article/920-treatment", treatment_page()).await;

    let mut assembler = ArticleAssembler::new(create_test_config(1)).unwrap();
    let report = assembler
        .assemble_batch(
            vec![descriptor(&mock_server, 920, "Asthma")],
            |_, _| true,
            |_| {
                Err(ScrapeError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )))
            },
        )
        .await;

    assert!(report.succeeded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].reason.starts_with("failed to save record"));
    assert!(report.failed[0].reason.contains("disk full"));
}
