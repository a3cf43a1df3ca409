// Contracts page scraper.
//
// The contracts page renders one big sortable table with eight cells per
// player: name, position, full team name, total value, APY, total
// guaranteed, average guarantee per year, percent guaranteed. The cells are
// read in order and regrouped into rows of eight; the configured team table
// maps "Chiefs"-style names to the abbreviations the composite key uses.

use std::collections::HashMap;

use scraper::{Html, Selector};
use tracing::warn;

use super::{composite_key, SourceError};
use crate::config::TeamTable;

const CONTRACTS_URL: &str = "https://overthecap.com/contracts";
const CELLS_PER_ROW: usize = 8;

/// One scraped contract row, with the figures kept as display strings.
#[derive(Debug, Clone)]
pub struct ContractRow {
    pub name: String,
    pub position: String,
    /// Team abbreviation (already mapped through the team table).
    pub team: String,
    pub total_value: String,
    pub annual_value: String,
    pub total_guaranteed: String,
    pub avg_guarantee_per_year: String,
    pub percent_guaranteed: String,
}

/// Fetch and parse the contracts page, keyed by composite identifier.
pub async fn fetch(
    http: &reqwest::Client,
    teams: &TeamTable,
) -> Result<HashMap<String, ContractRow>, SourceError> {
    let html = http
        .get(CONTRACTS_URL)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SourceError::Http {
            url: CONTRACTS_URL.to_string(),
            source: e,
        })?
        .text()
        .await
        .map_err(|e| SourceError::Http {
            url: CONTRACTS_URL.to_string(),
            source: e,
        })?;

    parse_contracts(&html, teams)
}

/// Parse the contracts table out of a fetched page. Split from `fetch` so
/// the parser is testable against static HTML.
pub fn parse_contracts(
    html: &str,
    teams: &TeamTable,
) -> Result<HashMap<String, ContractRow>, SourceError> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table.sortable.controls-table")
        .map_err(|e| SourceError::PageStructure(format!("bad table selector: {e}")))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| SourceError::PageStructure(format!("bad cell selector: {e}")))?;

    let table = document.select(&table_selector).next().ok_or_else(|| {
        SourceError::PageStructure("contracts table not found in page".into())
    })?;

    let cells: Vec<String> = table
        .select(&cell_selector)
        .map(|td| td.text().collect::<String>().trim().to_string())
        .collect();

    let mut rows = HashMap::new();
    for chunk in cells.chunks(CELLS_PER_ROW) {
        let [name, position, team_name, total_value, annual_value, total_guaranteed, avg_guarantee_per_year, percent_guaranteed] =
            chunk
        else {
            warn!("ignoring trailing partial contracts row ({} cells)", chunk.len());
            continue;
        };

        let Some(team) = teams.abbr(team_name) else {
            warn!("skipping contract for '{name}': unknown team '{team_name}'");
            continue;
        };
        let Some(last) = name.split_whitespace().nth(1) else {
            warn!("skipping contract row '{name}': no last name");
            continue;
        };

        let key = composite_key(last, position, team);
        rows.insert(
            key,
            ContractRow {
                name: name.clone(),
                position: position.clone(),
                team: team.to_string(),
                total_value: total_value.clone(),
                annual_value: annual_value.clone(),
                total_guaranteed: total_guaranteed.clone(),
                avg_guarantee_per_year: avg_guarantee_per_year.clone(),
                percent_guaranteed: percent_guaranteed.clone(),
            },
        );
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
