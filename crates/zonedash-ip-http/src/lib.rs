// # HTTP IP Fetcher
//
// This crate provides the HTTP implementation of `IpFetcher` used by the
// dashboard's public IP monitor.
//
// ## Purpose
//
// Discovery services such as ipify or icanhazip answer a plain GET with the
// caller's public address as the response body. This fetcher performs that
// GET and hands the body back untouched; trimming and validation happen in
// the monitor.
//
// ## Behaviour
//
// - One request per call, no retries
// - 10 second client timeout
// - Non-success status codes are errors

use std::time::Duration;

use async_trait::async_trait;
use zonedash_core::traits::IpFetcher;
use zonedash_core::{Error, Result};

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent to discovery services
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Zonedash-DNS-Manager/1.0)";

/// reqwest-backed IP fetcher
#[derive(Debug, Clone)]
pub struct HttpIpFetcher {
    client: reqwest::Client,
}

impl HttpIpFetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl IpFetcher for HttpIpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::external(url, format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::external(url, format!("HTTP error: {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::external(url, format!("Failed to read response: {}", e)))
    }

    fn fetcher_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_returns_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpIpFetcher::new().unwrap();
        let body = fetcher
            .fetch(&format!("{}/ip", server.uri()))
            .await
            .unwrap();

        assert_eq!(body, "203.0.113.7\n");
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("1.2.3.4"))
            .mount(&server)
            .await;

        let fetcher = HttpIpFetcher::new().unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, Error::ExternalService { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("1.2.3.4")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpIpFetcher::with_timeout(Duration::from_millis(50)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, Error::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_failure() {
        let fetcher = HttpIpFetcher::new().unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/ip").await.unwrap_err();

        assert!(matches!(err, Error::ExternalService { .. }));
    }
}
