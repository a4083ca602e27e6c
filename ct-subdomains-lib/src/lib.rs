//! # ct-subdomains Library
//!
//! Subdomain discovery from certificate transparency logs, by scraping the
//! crt.sh search results page.
//!
//! One call sends one search request, reads the "Matching Identities" column
//! of the results table, and returns the unique names containing the parent
//! domain, with any leading `*.` removed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ct_subdomains_lib::{extract_subdomains, ExtractConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let domains = extract_subdomains("example.com", &ExtractConfig::default()).await?;
//!     for domain in &domains {
//!         println!("{}", domain);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Known limitations
//!
//! Names are kept when they contain the parent domain anywhere, so
//! `example.com.attacker.net` is reported for `example.com`. Matching is
//! case-sensitive.

// Re-export main public API types and functions
pub use config::{
    load_env_config, load_env_config_from, merge_configs, parse_timeout_string, ConfigManager,
    DefaultsConfig, EnvConfig, FileConfig, LayoutConfig,
};
pub use error::ExtractError;
pub use extractor::{extract_subdomains, SubdomainExtractor};
pub use parser::{parse_results_page, ParsedPage};
pub use transport::{CrtShClient, SearchTransport};
pub use types::{
    ExtractConfig, ExtractionResult, ScrapeReport, TableLayout, ACCEPT_ENCODING, ACCEPT_LANGUAGE,
    DEFAULT_SEARCH_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, IDENTITY_COLUMN_INDEX,
    RESULTS_TABLE_INDEX,
};
pub use utils::{strip_wildcard, validate_parent_domain};

mod config;
mod error;
mod extractor;
mod parser;
mod transport;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ExtractError>;
