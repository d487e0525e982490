//! HTTP fetching for Launchpad status pages
//!
//! Only allow-listed hosts are contacted. Timeouts, connection failures and
//! non-200 responses are retried with exponential backoff; a malformed or
//! foreign URL fails immediately.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

use crate::catalog::LAUNCHPAD_HOST;

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Errors that can occur during fetching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("HTTP status {code}")]
    HttpStatus { code: u16 },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::InvalidUrl(_))
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects
    pub url: Url,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: String,
    /// Time taken including retries
    pub fetch_duration: Duration,
}

/// Anything that can produce the HTML of a status page
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError>;
}

/// Configuration for the fetch engine
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Extra attempts after the first failure
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each following one
    pub retry_base_delay: Duration,
    /// Upper bound for a single backoff delay
    pub max_retry_delay: Duration,
    /// Hosts the engine may contact
    pub allowed_hosts: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_base_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(16),
            allowed_hosts: vec![LAUNCHPAD_HOST.to_string()],
        }
    }
}

impl FetchConfig {
    /// Build from the `[scraping]` section of the TOML config
    pub fn from_config(config: &crate::config::ScrapingConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
            max_retry_delay: Duration::from_millis(config.max_retry_delay_ms),
            allowed_hosts: config.allowed_hosts.clone(),
        }
    }
}

/// Fetch statistics
#[derive(Debug, Clone, Default)]
pub struct FetchStats {
    /// Logical fetches requested
    pub total_fetches: u64,
    /// HTTP requests sent, retries included
    pub attempts: u64,
    /// Fetches that returned a page
    pub successes: u64,
    /// Fetches that gave up
    pub failures: u64,
}

#[derive(Debug, Default)]
struct AtomicFetchStats {
    total_fetches: AtomicU64,
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// HTTP fetch engine
pub struct FetchEngine {
    http_client: reqwest::Client,
    config: FetchConfig,
    stats: AtomicFetchStats,
}

/// Failure of a single attempt, with the server's requested delay if any
struct AttemptError {
    error: FetchError,
    retry_after: Option<Duration>,
}

impl From<FetchError> for AttemptError {
    fn from(error: FetchError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

impl FetchEngine {
    /// Create a new fetch engine
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .redirect(redirect_policy(config.allowed_hosts.clone()))
            .build()?;

        Ok(Self {
            http_client,
            config,
            stats: AtomicFetchStats::default(),
        })
    }

    /// Fetch a URL, retrying transient failures
    pub async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        self.stats.total_fetches.fetch_add(1, Ordering::Relaxed);
        self.check_url(url)?;

        let start = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            self.stats.attempts.fetch_add(1, Ordering::Relaxed);
            match self.fetch_once(url).await {
                Ok((final_url, body)) => {
                    self.stats.successes.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(RawPage {
                        url: final_url,
                        status: 200,
                        body,
                        fetch_duration: start.elapsed(),
                    });
                }
                Err(AttemptError { error, retry_after }) => {
                    if !error.is_retryable() || attempt >= self.config.max_retries {
                        self.stats.failures.fetch_add(1, Ordering::Relaxed);
                        return Err(error);
                    }
                    let delay = self.backoff(attempt, retry_after);
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{} in {:?}",
                        url,
                        error,
                        attempt + 1,
                        self.config.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Reject URLs that are not absolute http(s) on an allowed host
    fn check_url(&self, url: &Url) -> Result<(), FetchError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!("unsupported scheme in {}", url)));
        }
        let host = url
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("no host in {}", url)))?;
        if !host_allowed(&self.config.allowed_hosts, host) {
            return Err(FetchError::InvalidUrl(format!("host {} is not allowed", host)));
        }
        Ok(())
    }

    async fn fetch_once(&self, url: &Url) -> Result<(Url, String), AttemptError> {
        let response = self
            .http_client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_redirection() {
            // Left unfollowed by the redirect policy
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<none>");
            return Err(FetchError::InvalidUrl(format!(
                "redirect from {} to {} not followed",
                url, location
            ))
            .into());
        }
        if status != reqwest::StatusCode::OK {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(AttemptError {
                error: FetchError::HttpStatus {
                    code: status.as_u16(),
                },
                retry_after,
            });
        }

        let final_url = response.url().clone();
        self.check_url(&final_url)?;
        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok((final_url, body))
    }

    fn classify(&self, error: reqwest::Error) -> AttemptError {
        if error.is_timeout() {
            FetchError::Timeout(self.config.timeout).into()
        } else if error.is_redirect() {
            FetchError::InvalidUrl(error.to_string()).into()
        } else {
            FetchError::Connection(error.to_string()).into()
        }
    }

    /// `retry_base_delay * 2^attempt`, or the server's Retry-After, capped
    fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponential = self
            .config
            .retry_base_delay
            .saturating_mul(1u32 << attempt.min(16));
        retry_after
            .unwrap_or(exponential)
            .min(self.config.max_retry_delay)
    }

    /// Get fetch statistics
    pub fn stats(&self) -> FetchStats {
        FetchStats {
            total_fetches: self.stats.total_fetches.load(Ordering::Relaxed),
            attempts: self.stats.attempts.load(Ordering::Relaxed),
            successes: self.stats.successes.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
        }
    }
}

fn host_allowed(allowed_hosts: &[String], host: &str) -> bool {
    allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
}

/// Follow redirects only while they stay on allowed hosts
fn redirect_policy(allowed_hosts: Vec<String>) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        let allowed = attempt
            .url()
            .host_str()
            .is_some_and(|host| host_allowed(&allowed_hosts, host));
        if !allowed {
            tracing::warn!("Not following redirect to {}", attempt.url());
            attempt.stop()
        } else if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

#[async_trait]
impl PageSource for FetchEngine {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        FetchEngine::fetch(self, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(max_retries: u32) -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_millis(500),
            max_retries,
            retry_base_delay: Duration::from_millis(5),
            max_retry_delay: Duration::from_millis(20),
            allowed_hosts: vec!["127.0.0.1".to_string(), "localhost".to_string()],
            ..Default::default()
        }
    }

    fn page_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/ubuntu/noble/+lang/sv/+index?batch=300", server.uri())).unwrap()
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let engine = FetchEngine::new(FetchConfig::default()).unwrap();
        assert_eq!(engine.backoff(0, None), Duration::from_secs(2));
        assert_eq!(engine.backoff(1, None), Duration::from_secs(4));
        assert_eq!(engine.backoff(2, None), Duration::from_secs(8));
        assert_eq!(engine.backoff(10, None), Duration::from_secs(16));
        assert_eq!(engine.backoff(0, Some(Duration::from_secs(5))), Duration::from_secs(5));
        assert_eq!(engine.backoff(0, Some(Duration::from_secs(600))), Duration::from_secs(16));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(FetchError::Connection("reset".into()).is_retryable());
        assert!(FetchError::HttpStatus { code: 503 }.is_retryable());
        assert!(!FetchError::InvalidUrl("x".into()).is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ubuntu/noble/+lang/sv/+index"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let engine = FetchEngine::new(test_config(3)).unwrap();
        let page = engine.fetch(&page_url(&server)).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html>ok</html>");
        assert_eq!(engine.stats().attempts, 1);
    }

    #[tokio::test]
    async fn test_non_200_is_retried_then_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        let engine = FetchEngine::new(test_config(2)).unwrap();
        let err = engine.fetch(&page_url(&server)).await.unwrap_err();
        assert_eq!(err, FetchError::HttpStatus { code: 404 });

        let stats = engine.stats();
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.failures, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("second"))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(test_config(3)).unwrap();
        let page = engine.fetch(&page_url(&server)).await.unwrap();
        assert_eq!(page.body, "second");
        assert_eq!(engine.stats().attempts, 2);
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let config = FetchConfig {
            timeout: Duration::from_millis(100),
            ..test_config(0)
        };
        let engine = FetchEngine::new(config).unwrap();
        let err = engine.fetch(&page_url(&server)).await.unwrap_err();
        assert_eq!(err, FetchError::Timeout(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_redirect_to_foreign_host_is_not_followed() {
        let server = MockServer::start().await;
        let elsewhere = format!("http://localhost:{}/elsewhere", server.address().port());
        Mock::given(method("GET"))
            .and(path("/ubuntu/noble/+lang/sv/+index"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", elsewhere.as_str()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/elsewhere"))
            .respond_with(ResponseTemplate::new(200).set_body_string("leaked"))
            .expect(0)
            .mount(&server)
            .await;

        let config = FetchConfig {
            allowed_hosts: vec!["127.0.0.1".to_string()],
            ..test_config(3)
        };
        let engine = FetchEngine::new(config).unwrap();
        let err = engine.fetch(&page_url(&server)).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)), "{:?}", err);
        assert_eq!(engine.stats().attempts, 1);
    }

    #[tokio::test]
    async fn test_redirect_on_allowed_host_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ubuntu/noble/+lang/sv/+index"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/ubuntu/noble/+lang/sv/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ubuntu/noble/+lang/sv/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let engine = FetchEngine::new(test_config(0)).unwrap();
        let page = engine.fetch(&page_url(&server)).await.unwrap();
        assert_eq!(page.body, "moved");
        assert_eq!(page.url.path(), "/ubuntu/noble/+lang/sv/");
    }

    #[tokio::test]
    async fn test_foreign_host_is_rejected_without_request() {
        let engine = FetchEngine::new(test_config(3)).unwrap();
        let err = engine
            .fetch(&Url::parse("https://example.com/ubuntu/noble").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        assert_eq!(engine.stats().attempts, 0);

        let err = engine
            .fetch(&Url::parse("ftp://127.0.0.1/file").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
