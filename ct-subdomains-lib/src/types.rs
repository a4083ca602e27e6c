//! Core data types for subdomain extraction.
//!
//! This module defines the configuration handed to the extractor, the
//! positional layout of the crt.sh results page, and the result returned
//! to callers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Default search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://crt.sh/";

/// Browser-like user agent sent with every search request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:68.0) Gecko/20100101 Firefox/68.0";

/// Value of the `Accept-Encoding` request header.
pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";

/// Value of the `Accept-Language` request header.
pub const ACCEPT_LANGUAGE: &str = "en-IN,en;q=0.9,en-GB;q=0.8,en-US;q=0.7,hi;q=0.6";

/// Position of the results table among all `<table>` elements on the page.
pub const RESULTS_TABLE_INDEX: usize = 2;

/// Position of the "Matching Identities" cell within a results row.
pub const IDENTITY_COLUMN_INDEX: usize = 4;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the interesting data lives on the crt.sh results page.
///
/// Both indices are assumptions about a page we do not control. When crt.sh
/// changes its markup, this is the one place to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    /// Zero-based index of the results table in document order
    pub results_table_index: usize,

    /// Zero-based index of the identity cell within a row
    pub identity_column_index: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            results_table_index: RESULTS_TABLE_INDEX,
            identity_column_index: IDENTITY_COLUMN_INDEX,
        }
    }
}

/// Configuration options for an extraction.
///
/// Carries the transport options (proxy, timeout, endpoint, user agent) and
/// the page layout used by the scraper.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Search endpoint, queried as `<search_url>?q=<parent_domain>`
    /// Default: https://crt.sh/
    pub search_url: String,

    /// Optional outbound proxy, applied to both http and https
    pub proxy: Option<String>,

    /// Upper bound for the whole request
    /// Default: 30 seconds
    pub timeout: Duration,

    /// User-Agent header value
    pub user_agent: String,

    /// Positional layout of the results page
    pub layout: TableLayout,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            layout: TableLayout::default(),
        }
    }
}

impl ExtractConfig {
    /// Route requests through a proxy (e.g. "http://127.0.0.1:8080").
    pub fn with_proxy<P: Into<String>>(mut self, proxy: P) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the extractor at a different search endpoint.
    pub fn with_search_url<U: Into<String>>(mut self, search_url: U) -> Self {
        self.search_url = search_url.into();
        self
    }

    /// Override the User-Agent header.
    pub fn with_user_agent<A: Into<String>>(mut self, user_agent: A) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the results page layout.
    pub fn with_layout(mut self, layout: TableLayout) -> Self {
        self.layout = layout;
        self
    }
}

/// Diagnostic counters collected while scraping one results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeReport {
    /// Number of `<table>` elements on the page, nested ones included
    pub tables_found: usize,

    /// Whether a table existed at the configured results index
    pub results_table_present: bool,

    /// Rows visited inside the results table
    pub rows_scanned: usize,

    /// Rows with no `<td>` cells (header rows)
    pub rows_without_cells: usize,

    /// Rows with cells but too few to reach the identity column
    pub rows_too_short: usize,

    /// Tokens that passed the parent-domain filter, before de-duplication
    pub tokens_matched: usize,
}

impl ScrapeReport {
    /// Rows that had enough cells to be inspected.
    pub fn rows_inspected(&self) -> usize {
        self.rows_scanned
            .saturating_sub(self.rows_without_cells)
            .saturating_sub(self.rows_too_short)
    }
}

/// Outcome of one extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The parent domain that was searched
    pub parent_domain: String,

    /// Unique discovered domains, in no particular order
    pub subdomains: HashSet<String>,

    /// What the scraper saw on the page
    pub report: ScrapeReport,

    /// How long the fetch and scrape took
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl ExtractionResult {
    /// True when the search legitimately found nothing.
    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty()
    }

    /// Discovered domains in lexicographic order.
    pub fn sorted(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.subdomains.iter().cloned().collect();
        domains.sort();
        domains
    }
}
