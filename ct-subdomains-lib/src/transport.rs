//! HTTP transport for the certificate transparency search page.
//!
//! The extractor only needs "give me the results page for this domain", so
//! that is all [`SearchTransport`] asks for. [`CrtShClient`] is the real
//! implementation; tests can swap in anything that returns HTML.

use crate::error::ExtractError;
use crate::types::{ExtractConfig, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Something that can fetch the raw results page for a parent domain.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Fetch the results page body for `parent_domain`.
    ///
    /// Implementations must return `FetchError` for transport failures and
    /// non-success statuses rather than handing back an error page.
    async fn fetch_results_page(&self, parent_domain: &str) -> Result<String, ExtractError>;
}

/// reqwest-backed client for crt.sh.
///
/// Built once with the browser-like default headers, the optional proxy and
/// the timeout; every request is then a single GET with `q=<domain>`.
#[derive(Clone)]
pub struct CrtShClient {
    /// HTTP client carrying headers, proxy and timeout
    http_client: reqwest::Client,
    /// Search endpoint
    search_url: String,
    /// Request timeout, kept for error reporting
    timeout: Duration,
}

impl CrtShClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_config(&ExtractConfig::default())
    }

    /// Create a client from an extraction config.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the proxy URL or user agent is unusable, or if the
    /// underlying HTTP client cannot be built.
    pub fn with_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers(&config.user_agent)?)
            .timeout(config.timeout);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| {
                ExtractError::config(format!("Invalid proxy '{}': {}", proxy_url, e))
            })?;
            builder = builder.proxy(proxy);
        }

        let http_client = builder.build().map_err(|e| {
            ExtractError::config(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            http_client,
            search_url: config.search_url.clone(),
            timeout: config.timeout,
        })
    }

    /// The endpoint this client queries.
    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl SearchTransport for CrtShClient {
    async fn fetch_results_page(&self, parent_domain: &str) -> Result<String, ExtractError> {
        debug!(url = %self.search_url, query = parent_domain, "sending search request");

        let response = self
            .http_client
            .get(&self.search_url)
            .query(&[("q", parent_domain)])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        debug!(status = %status, "search response received");

        if !status.is_success() {
            return Err(ExtractError::fetch_with_status(
                format!("search endpoint returned {}", status),
                status.as_u16(),
            ));
        }

        response.text().await.map_err(|e| self.map_request_error(e))
    }
}

impl CrtShClient {
    fn map_request_error(&self, err: reqwest::Error) -> ExtractError {
        if err.is_timeout() {
            ExtractError::timeout(self.timeout)
        } else {
            err.into()
        }
    }
}

/// Headers sent with every request.
fn default_headers(user_agent: &str) -> Result<HeaderMap, ExtractError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|e| ExtractError::config(format!("Invalid user agent: {}", e)))?,
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static(ACCEPT_ENCODING),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_USER_AGENT;

    #[test]
    fn test_client_creation() {
        let client = CrtShClient::new();
        assert!(client.is_ok());
        assert_eq!(client.unwrap().search_url(), "https://crt.sh/");
    }

    #[test]
    fn test_client_with_proxy() {
        let config = ExtractConfig::default().with_proxy("http://127.0.0.1:8080");
        assert!(CrtShClient::with_config(&config).is_ok());
    }

    #[test]
    fn test_default_headers() {
        let headers = default_headers(DEFAULT_USER_AGENT).unwrap();
        assert_eq!(headers[header::USER_AGENT], DEFAULT_USER_AGENT);
        assert_eq!(headers[header::ACCEPT_ENCODING], "gzip, deflate, br");
        assert_eq!(
            headers[header::ACCEPT_LANGUAGE],
            "en-IN,en;q=0.9,en-GB;q=0.8,en-US;q=0.7,hi;q=0.6"
        );
    }

    #[test]
    fn test_invalid_user_agent_is_config_error() {
        let result = default_headers("bad\nagent");
        assert!(matches!(result, Err(ExtractError::ConfigError { .. })));
    }
}
