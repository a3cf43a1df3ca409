// Projections API client (sportsdata.io PlayerSeasonProjectionStats).
//
// Supplies the per-site projected point totals that are averaged together
// with the spreadsheet's own total for the upcoming season.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::{composite_key, SourceError};

const PROJECTIONS_BASE_URL: &str =
    "https://api.sportsdata.io/v3/nfl/projections/json/PlayerSeasonProjectionStats";

/// One player's projected point totals, one per scoring site.
#[derive(Debug, Clone)]
pub struct SiteProjections {
    pub site_points: Vec<f64>,
}

/// Raw API row. Unlike the stats endpoint, names arrive in full
/// "Josh Allen" form.
#[derive(Debug, Deserialize)]
struct RawProjection {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "FantasyPointsFanDuel", default)]
    fan_duel: f64,
    #[serde(rename = "FantasyPointsDraftKings", default)]
    draft_kings: f64,
    #[serde(rename = "FantasyPointsYahoo", default)]
    yahoo: f64,
    #[serde(rename = "FantasyPointsFantasyDraft", default)]
    fantasy_draft: f64,
    #[serde(rename = "FantasyPointsPPR", default)]
    ppr: f64,
}

fn index_rows(rows: Vec<RawProjection>) -> HashMap<String, SiteProjections> {
    let mut projections = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(last) = row.name.split_whitespace().nth(1) else {
            warn!(
                "skipping projection row '{}': unexpected name format",
                row.name
            );
            continue;
        };
        let key = composite_key(last, &row.position, &row.team);
        projections.insert(
            key,
            SiteProjections {
                site_points: vec![
                    row.fan_duel,
                    row.draft_kings,
                    row.yahoo,
                    row.fantasy_draft,
                    row.ppr,
                ],
            },
        );
    }
    projections
}

/// Fetch the upcoming season's projections for every player, keyed by
/// composite identifier.
pub async fn fetch(
    http: &reqwest::Client,
    api_key: &str,
    season: u16,
) -> Result<HashMap<String, SiteProjections>, SourceError> {
    let url = format!("{PROJECTIONS_BASE_URL}/{season}?key={api_key}");
    let rows: Vec<RawProjection> = http
        .get(&url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| SourceError::Http {
            url: redact(&url),
            source: e,
        })?
        .json()
        .await
        .map_err(|e| SourceError::Http {
            url: redact(&url),
            source: e,
        })?;
    Ok(index_rows(rows))
}

fn redact(url: &str) -> String {
    match url.split_once("key=") {
        Some((prefix, _)) => format!("{prefix}key=***"),
        None => url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
