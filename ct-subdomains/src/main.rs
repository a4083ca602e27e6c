//! ct-subdomains CLI Application
//!
//! Lists the subdomains of a domain that appear in crt.sh certificate
//! transparency results. A thin wrapper around ct-subdomains-lib: it parses
//! flags, resolves configuration, runs one extraction and prints the names.

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::style;
use ct_subdomains_lib::{
    load_env_config, parse_timeout_string, ConfigManager, ExtractConfig, ExtractionResult,
    SubdomainExtractor,
};
use std::io::{self, Write};
use std::process;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for ct-subdomains
#[derive(Parser, Debug)]
#[command(name = "ct-subdomains")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find subdomains of a domain in crt.sh certificate transparency results")]
#[command(
    long_about = "Find subdomains of a domain in crt.sh certificate transparency results.\n\nSends one search request, reads the matching identities of every certificate\nin the results table and prints each unique name containing the domain."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// A valid domain name (example.com)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: String,

    /// Proxy for http and https requests (e.g. http://127.0.0.1:8080)
    #[arg(short = 'x', long = "proxy", value_name = "URL", help_heading = "Network")]
    pub proxy: Option<String>,

    /// Request timeout, e.g. "30s" or "2m"
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Network")]
    pub timeout: Option<String>,

    /// Search endpoint to query instead of https://crt.sh/
    #[arg(long = "search-url", value_name = "URL", help_heading = "Network")]
    pub search_url: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Print names in sorted order
    #[arg(short = 's', long = "sort", help_heading = "Output Format")]
    pub sort: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Verbose logging on stderr
    #[arg(
        short = 'v',
        long = "verbose",
        conflicts_with = "quiet",
        help_heading = "Configuration"
    )]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", help_heading = "Configuration")]
    pub quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = run(args).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber.
///
/// `-v`/`-q` pick the level; otherwise `RUST_LOG` is honoured, defaulting
/// to warnings only.
fn init_logging(args: &Args) {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    debug!(?config, "resolved configuration");

    let extractor = SubdomainExtractor::with_config(&config)?;
    let result = extractor.extract(&args.domain).await?;

    if result.is_empty() {
        info!(domain = %result.parent_domain, "no subdomains found");
    }

    display_results(&result, &args)
}

/// Build the extraction config from all sources.
///
/// Precedence, highest first:
/// 1. CLI arguments
/// 2. Environment variables (CTS_*)
/// 3. Explicit config file (--config or CTS_CONFIG), otherwise discovered
///    files (./ct-subdomains.toml, ~/.ct-subdomains.toml,
///    ~/.config/ct-subdomains/config.toml)
/// 4. Built-in defaults
fn build_config(args: &Args) -> Result<ExtractConfig, Box<dyn std::error::Error>> {
    let mut config = ExtractConfig::default();
    let config_manager = ConfigManager::new();
    let env_config = load_env_config();

    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            debug!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load(),
    };

    config = file_config.apply_to(config);
    config = env_config.apply_to(config);
    apply_cli_args_to_config(config, args)
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(
    mut config: ExtractConfig,
    args: &Args,
) -> Result<ExtractConfig, Box<dyn std::error::Error>> {
    if let Some(proxy) = &args.proxy {
        config.proxy = Some(proxy.clone());
    }

    if let Some(timeout) = &args.timeout {
        match parse_timeout_string(timeout) {
            Some(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
            _ => {
                return Err(format!(
                    "Invalid timeout '{}', use format like '5s', '30s', '2m'",
                    timeout
                )
                .into())
            }
        }
    }

    if let Some(search_url) = &args.search_url {
        config.search_url = search_url.clone();
    }

    Ok(config)
}

fn display_results(
    result: &ExtractionResult,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.json {
        let mut value = serde_json::to_value(result)?;
        if args.sort {
            value["subdomains"] = serde_json::to_value(result.sorted())?;
        }
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else if args.sort {
        for domain in result.sorted() {
            writeln!(out, "{}", domain)?;
        }
    } else {
        for domain in &result.subdomains {
            writeln!(out, "{}", domain)?;
        }
    }

    out.flush()?;
    Ok(())
}
