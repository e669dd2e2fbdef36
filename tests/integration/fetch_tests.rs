use crate::{clinical_page, create_test_config};
use medref_scraper::fetch::{FetchError, FetchResult, FetchStatus, Fetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_rate_limited_url_exhausts_exactly_max_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/1-overview"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let url = format!("{}/article/1-overview", mock_server.uri());

    match fetcher.fetch(&url).await {
        FetchResult::Exhausted {
            attempts,
            last_error,
            ..
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error, FetchError::ServerRejected { status: 429 });
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }

    assert_eq!(fetcher.history().len(), 3);
    assert_eq!(
        fetcher.history().counts_by_status().get(&FetchStatus::RateLimited),
        Some(&3)
    );
    assert_eq!(fetcher.success_rate(), Some(0.0));
}

#[tokio::test]
async fn test_forbidden_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/2-overview"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/article/2-overview"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(clinical_page("<h1>Croup</h1>")),
        )
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let url = format!("{}/article/2-overview", mock_server.uri());

    match fetcher.fetch(&url).await {
        FetchResult::Success { body, attempts, .. } => {
            assert_eq!(attempts, 2);
            assert!(body.contains("<h1>Croup</h1>"));
        }
        other => panic!("expected success, got {:?}", other),
    }

    let statuses: Vec<_> = fetcher.history().iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![FetchStatus::Blocked, FetchStatus::Success]);
    assert_eq!(fetcher.request_count(), 2);
}

#[tokio::test]
async fn test_challenge_page_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/3-overview"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body>Access Denied. Please complete the security check.</body></html>",
        ))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/article/3-overview"))
        .respond_with(ResponseTemplate::new(200).set_body_string(clinical_page("")))
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(3)).unwrap();
    let url = format!("{}/article/3-overview", mock_server.uri());

    assert!(fetcher.fetch(&url).await.is_success());
    assert_eq!(
        fetcher.history().iter().next().map(|o| o.status),
        Some(FetchStatus::Blocked)
    );
}

#[tokio::test]
async fn test_page_without_keywords_is_invalid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/4-overview"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>Nothing to see here.</p></body></html>"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut fetcher = Fetcher::new(&create_test_config(2)).unwrap();
    let url = format!("{}/article/4-overview", mock_server.uri());

    let result = fetcher.fetch(&url).await.into_result();
    match result {
        Err(FetchError::ExhaustedRetries { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert_eq!(
                *last,
                FetchError::ContentInvalid {
                    found: 0,
                    required: 2
                }
            );
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/5-overview"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(clinical_page(""))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(2);
    config.fetch.timeout = 0.5;
    let mut fetcher = Fetcher::new(&config).unwrap();
    let url = format!("{}/article/5-overview", mock_server.uri());

    match fetcher.fetch(&url).await {
        FetchResult::Exhausted { last_error, .. } => {
            assert!(matches!(
                last_error,
                FetchError::NetworkTransient {
                    timed_out: true,
                    ..
                }
            ));
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }

    assert_eq!(
        fetcher.history().counts_by_status().get(&FetchStatus::Timeout),
        Some(&2)
    );
}

#[tokio::test]
async fn test_identity_applied_to_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/article/6-overview"))
        .and(header("user-agent", "ReferenceBrowser/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(clinical_page("")))
        .expect(4)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(1);
    config.identity.user_agents = vec!["ReferenceBrowser/1.0".to_string()];
    config.fetch.rotation_frequency = 2;
    let mut fetcher = Fetcher::new(&config).unwrap();
    let url = format!("{}/article/6-overview", mock_server.uri());

    for _ in 0..4 {
        assert!(fetcher.fetch(&url).await.is_success());
    }

    assert_eq!(fetcher.request_count(), 4);
    assert_eq!(fetcher.identity_rotations(), 2);
    assert_eq!(fetcher.current_identity(), "ReferenceBrowser/1.0");
    assert_eq!(fetcher.success_rate(), Some(1.0));
}
