//! Main subdomain extractor.
//!
//! This module provides the `SubdomainExtractor` that ties the transport and
//! the results-page scraper together, plus the one-shot
//! [`extract_subdomains`] entry point.

use crate::error::ExtractError;
use crate::parser::parse_results_page;
use crate::transport::{CrtShClient, SearchTransport};
use crate::types::{ExtractConfig, ExtractionResult, TableLayout};
use crate::utils::validate_parent_domain;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Discovers subdomains of a parent domain from certificate transparency
/// search results.
///
/// The extractor owns a transport rather than being one, so any
/// [`SearchTransport`] can be plugged in.
///
/// # Example
///
/// ```rust,no_run
/// use ct_subdomains_lib::SubdomainExtractor;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let extractor = SubdomainExtractor::new()?;
///     let result = extractor.extract("example.com").await?;
///     for domain in result.sorted() {
///         println!("{}", domain);
///     }
///     Ok(())
/// }
/// ```
pub struct SubdomainExtractor<T: SearchTransport = CrtShClient> {
    /// Fetches the raw results page
    transport: T,
    /// Where to look on the page
    layout: TableLayout,
}

impl SubdomainExtractor<CrtShClient> {
    /// Create an extractor that talks to crt.sh with default settings.
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_config(&ExtractConfig::default())
    }

    /// Create an extractor from a custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ct_subdomains_lib::{ExtractConfig, SubdomainExtractor};
    /// use std::time::Duration;
    ///
    /// let config = ExtractConfig::default()
    ///     .with_proxy("http://127.0.0.1:8080")
    ///     .with_timeout(Duration::from_secs(10));
    ///
    /// let extractor = SubdomainExtractor::with_config(&config).unwrap();
    /// ```
    pub fn with_config(config: &ExtractConfig) -> Result<Self, ExtractError> {
        Ok(Self {
            transport: CrtShClient::with_config(config)?,
            layout: config.layout,
        })
    }
}

impl<T: SearchTransport> SubdomainExtractor<T> {
    /// Create an extractor around an arbitrary transport.
    pub fn with_transport(transport: T, layout: TableLayout) -> Self {
        Self { transport, layout }
    }

    /// Fetch and scrape the results for one parent domain.
    ///
    /// The process:
    /// 1. Validates the parent domain
    /// 2. Fetches the results page (one request)
    /// 3. Scrapes the identity column of the results table
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or whitespace-containing domain; no
    ///   request is made
    /// - `FetchError` for network failures, timeouts and non-2xx responses
    /// - `ParseError` for undecodable bodies or a changed table layout
    pub async fn extract(&self, parent_domain: &str) -> Result<ExtractionResult, ExtractError> {
        let parent_domain = validate_parent_domain(parent_domain)?;
        let start_time = Instant::now();

        info!(domain = parent_domain, "searching certificate transparency logs");
        let body = self.transport.fetch_results_page(parent_domain).await?;
        let page = parse_results_page(&body, parent_domain, &self.layout)?;

        if !page.report.results_table_present {
            debug!(
                domain = parent_domain,
                tables = page.report.tables_found,
                "no results table on page; treating as empty"
            );
        }
        info!(
            domain = parent_domain,
            found = page.domains.len(),
            rows = page.report.rows_inspected(),
            "extraction finished"
        );

        Ok(ExtractionResult {
            parent_domain: parent_domain.to_string(),
            subdomains: page.domains,
            report: page.report,
            duration: Some(start_time.elapsed()),
        })
    }

    /// Same as [`extract`](Self::extract) but returns only the domain set.
    pub async fn extract_subdomains(
        &self,
        parent_domain: &str,
    ) -> Result<HashSet<String>, ExtractError> {
        Ok(self.extract(parent_domain).await?.subdomains)
    }

    /// The layout this extractor scrapes with.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }
}

/// One-shot extraction: build a client from `config`, fetch, scrape.
///
/// # Example
///
/// ```rust,no_run
/// use ct_subdomains_lib::{extract_subdomains, ExtractConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let domains = extract_subdomains("example.com", &ExtractConfig::default()).await?;
///     println!("{} names found", domains.len());
///     Ok(())
/// }
/// ```
pub async fn extract_subdomains(
    parent_domain: &str,
    config: &ExtractConfig,
) -> Result<HashSet<String>, ExtractError> {
    // Reject bad input before building a client
    validate_parent_domain(parent_domain)?;
    SubdomainExtractor::with_config(config)?
        .extract_subdomains(parent_domain)
        .await
}
