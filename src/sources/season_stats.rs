// Season stats API client (sportsdata.io PlayerSeasonStats).
//
// Carries last season's games played and the per-site fantasy point totals
// used for the "last year's points" average.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::{composite_key, SourceError};

const STATS_BASE_URL: &str = "https://api.sportsdata.io/v3/nfl/stats/json/PlayerSeasonStats";

/// One player's completed-season numbers.
#[derive(Debug, Clone)]
pub struct SeasonStats {
    pub games_played: u32,
    /// Fantasy point totals as scored by each site (FanDuel, DraftKings,
    /// Yahoo, FantasyDraft, PPR).
    pub site_points: Vec<f64>,
}

/// Raw API row. The endpoint returns many more fields; serde drops the rest.
/// Names arrive abbreviated, "J.Allen" style.
#[derive(Debug, Deserialize)]
struct RawSeasonStats {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Played", default)]
    played: u32,
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

fn index_rows(rows: Vec<RawSeasonStats>) -> HashMap<String, SeasonStats> {
    let mut stats = HashMap::with_capacity(rows.len());
    for row in rows {
        // "J.Allen" → last name after the dot.
        let Some(last) = row.name.split('.').nth(1) else {
            warn!("skipping stats row '{}': unexpected name format", row.name);
            continue;
        };
        let key = composite_key(last, &row.position, &row.team);
        stats.insert(
            key,
            SeasonStats {
                games_played: row.played,
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
    stats
}

/// Fetch the completed season's stats for every player, keyed by composite
/// identifier.
pub async fn fetch(
    http: &reqwest::Client,
    api_key: &str,
    season: u16,
) -> Result<HashMap<String, SeasonStats>, SourceError> {
    let url = format!("{STATS_BASE_URL}/{season}REG?key={api_key}");
    let rows: Vec<RawSeasonStats> = http
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

/// Keep the API key out of logs and error messages.
fn redact(url: &str) -> String {
    match url.split_once("key=") {
        Some((prefix, _)) => format!("{prefix}key=***"),
        None => url.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
