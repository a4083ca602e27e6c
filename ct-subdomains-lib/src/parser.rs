//! Scraping of the crt.sh results page.
//!
//! The page carries no stable ids or classes for the data we want, so the
//! results table and the identity column are found by position (see
//! [`TableLayout`]). Tables and rows are matched in document order with
//! nested elements included.

use crate::error::ExtractError;
use crate::types::{ScrapeReport, TableLayout};
use crate::utils::{matches_parent, strip_wildcard, validate_parent_domain};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

lazy_static::lazy_static! {
    static ref TABLE_SELECTOR: Selector =
        Selector::parse("table").expect("static selector 'table' is valid");
    static ref ROW_SELECTOR: Selector =
        Selector::parse("tr").expect("static selector 'tr' is valid");
    static ref CELL_SELECTOR: Selector =
        Selector::parse("td").expect("static selector 'td' is valid");
}

/// Domains and diagnostics scraped from one results page.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Unique discovered domains
    pub domains: HashSet<String>,
    /// Counters describing what the page looked like
    pub report: ScrapeReport,
}

/// Extract discovered domains from a crt.sh results page.
///
/// A page without a table at `layout.results_table_index` yields an empty
/// set. Rows without `<td>` cells and rows too short to reach the identity
/// column are skipped.
///
/// # Errors
///
/// - `InvalidInput` if `parent_domain` is empty or contains whitespace
/// - `ParseError` if the results table has data rows but none of them reach
///   the identity column, which means the page layout has moved
pub fn parse_results_page(
    html: &str,
    parent_domain: &str,
    layout: &TableLayout,
) -> Result<ParsedPage, ExtractError> {
    let parent_domain = validate_parent_domain(parent_domain)?;
    let document = Html::parse_document(html);
    let mut page = ParsedPage::default();

    let tables: Vec<ElementRef> = document.select(&TABLE_SELECTOR).collect();
    page.report.tables_found = tables.len();

    let Some(results_table) = tables.get(layout.results_table_index) else {
        if !tables.is_empty() {
            warn!(
                tables = tables.len(),
                expected_index = layout.results_table_index,
                "results table not found on page"
            );
        }
        return Ok(page);
    };
    page.report.results_table_present = true;

    for (row_index, row) in results_table.select(&ROW_SELECTOR).enumerate() {
        page.report.rows_scanned += 1;

        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.is_empty() {
            page.report.rows_without_cells += 1;
            continue;
        }

        let Some(identity_cell) = cells.get(layout.identity_column_index) else {
            debug!(
                row = row_index,
                cells = cells.len(),
                "row too short for identity column, skipping"
            );
            page.report.rows_too_short += 1;
            continue;
        };

        for token in identity_tokens(identity_cell) {
            if matches_parent(&token, parent_domain) {
                page.report.tokens_matched += 1;
                page.domains.insert(strip_wildcard(&token).to_string());
            }
        }
    }

    if page.report.rows_too_short > 0 && page.report.rows_inspected() == 0 {
        return Err(ExtractError::parse(format!(
            "results table layout changed: {} row(s) with cells, none reaching column {}",
            page.report.rows_too_short, layout.identity_column_index
        )));
    }

    Ok(page)
}

/// Split a cell's visible text into whitespace-delimited tokens.
///
/// Text nodes are joined with a space first so that names separated only by
/// `<br>` do not run together.
fn identity_tokens(cell: &ElementRef) -> Vec<String> {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
