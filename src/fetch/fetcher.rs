//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the shared HTTP client with browser-like default headers
//! - Applying the current rotated identity to every request
//! - The retry state machine with adaptive delays and cooldowns
//! - Recording one outcome per attempt

use crate::config::{Config, FetchConfig};
use crate::fetch::{
    ContentRules, FetchError, FetchHistory, FetchOutcome, FetchStatus, IdentityPool,
    IdentityRotator, RetryPolicy, RetryState,
};
use crate::ScrapeError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// A valid page was obtained
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
        /// Number of attempts it took
        attempts: u32,
    },

    /// Every allowed attempt failed
    Exhausted {
        /// The URL that could not be fetched
        url: String,
        /// Number of attempts made
        attempts: u32,
        /// Error of the final attempt
        last_error: FetchError,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The page body, or None when the fetch was exhausted
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Exhausted { .. } => None,
        }
    }

    /// Converts into a Result carrying `ExhaustedRetries` on failure
    pub fn into_result(self) -> Result<String, FetchError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Exhausted {
                attempts,
                last_error,
                ..
            } => Err(FetchError::ExhaustedRetries {
                attempts,
                last: Box::new(last_error),
            }),
        }
    }
}

/// Builds the shared HTTP client
///
/// The User-Agent is not set here: it is applied per request from the
/// identity rotator.
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    Client::builder()
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.timeout().min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues requests with identity rotation, adaptive delay and retries
///
/// The fetcher owns all mutable request state: the identity rotation
/// counter, the current identity and the outcome history. Its methods take
/// `&mut self`, so requests through one fetcher are always sequential.
pub struct Fetcher {
    client: Client,
    identities: IdentityRotator,
    history: FetchHistory,
    policy: RetryPolicy,
    rules: ContentRules,
    max_retries: u32,
    success_window: usize,
}

impl Fetcher {
    /// Creates a fetcher from the full configuration
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.fetch)?;
        let pool = IdentityPool::new(config.identity.user_agents.clone())?;

        Ok(Self {
            client,
            identities: IdentityRotator::new(pool, config.fetch.rotation_frequency),
            history: FetchHistory::new(config.fetch.history_size),
            policy: RetryPolicy::from_config(&config.fetch),
            rules: ContentRules::from_config(&config.content),
            max_retries: config.fetch.max_retries,
            success_window: config.fetch.success_window,
        })
    }

    /// Fetches a URL with the configured retry count and base delay
    pub async fn fetch(&mut self, url: &str) -> FetchResult {
        let base_delay = self.policy.base_delay();
        self.fetch_with(url, self.max_retries, base_delay).await
    }

    /// Fetches a URL, making at most `max_retries` attempts
    ///
    /// # Request Flow
    ///
    /// 1. Count the request and rotate identity every Kth request
    /// 2. Sleep `base_delay` plus adaptive jitter
    /// 3. Send GET with the current identity
    /// 4. Non-200 → status-specific cooldown, retry
    /// 5. 200 → blocking scan, then validity scan
    ///
    /// Never returns an error: running out of attempts yields
    /// [`FetchResult::Exhausted`].
    pub async fn fetch_with(
        &mut self,
        url: &str,
        max_retries: u32,
        base_delay: Duration,
    ) -> FetchResult {
        let policy = self.policy.clone().with_base_delay(base_delay);
        let max_retries = max_retries.max(1);
        let mut state = RetryState::Attempting { attempt: 0 };
        let mut page: Option<(String, String)> = None;
        let mut last_error: Option<FetchError> = None;

        loop {
            match state {
                RetryState::Attempting { attempt } => {
                    self.identities.next_request();

                    let delay =
                        policy.pre_attempt_delay(self.success_rate(), &mut rand::thread_rng());
                    tracing::debug!(
                        "Waiting {:?} before attempt {} for {}",
                        delay,
                        attempt + 1,
                        url
                    );
                    sleep(delay).await;

                    let result = self.attempt(url).await;
                    let status = match &result {
                        Ok(_) => FetchStatus::Success,
                        Err(error) => error.status(),
                    };
                    self.history.record(FetchOutcome::new(url, attempt + 1, status));

                    state = policy.transition(attempt, max_retries, result.as_ref().err());
                    match result {
                        Ok(fetched) => page = Some(fetched),
                        Err(error) => {
                            tracing::warn!(
                                "Attempt {}/{} for {} failed: {}",
                                attempt + 1,
                                max_retries,
                                url,
                                error
                            );
                            last_error = Some(error);
                        }
                    }
                }
                RetryState::Cooldown { attempt, wait } => {
                    if !wait.is_zero() {
                        tracing::info!("Cooling down for {:?} before retrying {}", wait, url);
                    }
                    sleep(wait).await;
                    state = RetryState::Attempting {
                        attempt: attempt + 1,
                    };
                }
                RetryState::Succeeded { attempts } => {
                    let (final_url, body) = page.take().unwrap_or_default();
                    return FetchResult::Success {
                        final_url,
                        body,
                        attempts,
                    };
                }
                RetryState::Exhausted { attempts } => {
                    tracing::error!("Failed to fetch {} after {} attempts", url, attempts);
                    return FetchResult::Exhausted {
                        url: url.to_string(),
                        attempts,
                        last_error: last_error.take().unwrap_or_else(|| {
                            FetchError::NetworkTransient {
                                message: "no attempt completed".to_string(),
                                timed_out: false,
                            }
                        }),
                    };
                }
            }
        }
    }

    /// Waits `base` plus adaptive jitter; used between sections and articles
    pub async fn pause(&self, base: Duration) {
        let delay = self
            .policy
            .delay_with_jitter(base, self.success_rate(), &mut rand::thread_rng());
        sleep(delay).await;
    }

    /// Issues a single request and validates the response
    async fn attempt(&self, url: &str) -> Result<(String, String), FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, self.identities.current())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::ServerRejected {
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;

        self.rules.check(&body)?;
        Ok((final_url, body))
    }

    /// Success rate over the recent outcome window
    pub fn success_rate(&self) -> Option<f64> {
        self.history.success_rate(self.success_window)
    }

    pub fn history(&self) -> &FetchHistory {
        &self.history
    }

    /// Requests issued since this fetcher was created
    pub fn request_count(&self) -> u64 {
        self.identities.request_count()
    }

    pub fn identity_rotations(&self) -> u64 {
        self.identities.rotations()
    }

    pub fn current_identity(&self) -> &str {
        self.identities.current()
    }

    pub fn identity_pool_size(&self) -> usize {
        self.identities.pool().len()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
