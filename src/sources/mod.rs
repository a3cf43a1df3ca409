// Record assembly: fetch the four player-data sources, join them by the
// composite key, and hand the serving layer one mapping of key → merged
// entry.
//
// The spreadsheet export defines the player universe; the season stats API,
// the projections API, and the scraped contracts page each overlay their
// fields onto it. A blended result is cached to disk so restarts do not
// re-fetch every source.

pub mod cache;
pub mod contracts;
pub mod projections;
pub mod season_stats;
pub mod spreadsheet;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, TeamTable};
use cache::SourceCache;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("unexpected page structure: {0}")]
    PageStructure(String),

    #[error("cache error at {path}: {message}")]
    Cache { path: String, message: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

// ---------------------------------------------------------------------------
// Merged entry — the shape the core consumes
// ---------------------------------------------------------------------------

/// Contract figures exactly as displayed on the contracts page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub total_value: String,
    pub annual_value: String,
    pub percent_guaranteed: String,
}

/// One player's merged source data, keyed externally by the composite
/// identifier. Absent sources stay `None` here; the defaults are applied
/// when the entry becomes a `PlayerRecord`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    pub name: String,
    pub position: String,
    pub team: String,
    /// The spreadsheet's single season-total projection.
    pub spreadsheet_total: f64,
    /// Per-site projection estimates (spreadsheet total plus the API's five
    /// site totals) when the projections API knows the player.
    #[serde(default)]
    pub projections: Option<Vec<f64>>,
    /// Last season's per-site fantasy point totals.
    #[serde(default)]
    pub historic_points: Option<Vec<f64>>,
    #[serde(default)]
    pub games_played: Option<u32>,
    #[serde(default)]
    pub contract: Option<ContractTerms>,
}

/// Composite player identifier: case-folded last name + position + team
/// abbreviation. Every source derives the same key so the blend can join
/// on it.
pub fn composite_key(last_name: &str, position: &str, team: &str) -> String {
    format!(
        "{}{}{}",
        last_name.to_lowercase(),
        position.to_lowercase(),
        team.to_lowercase()
    )
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Fetches and blends all four sources. Built once from config; `load()`
/// serves from the cache when a previous blend was persisted.
pub struct Assembler {
    http: reqwest::Client,
    api_key: Option<String>,
    stats_season: u16,
    projection_season: u16,
    spreadsheet_path: PathBuf,
    teams: TeamTable,
    cache: SourceCache,
}

impl Assembler {
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rosterview/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Validation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: config.credentials.sportsdata_api_key.clone(),
            stats_season: config.sources.stats_season,
            projection_season: config.sources.projection_season,
            spreadsheet_path: PathBuf::from(&config.data_paths.spreadsheet),
            teams: config.teams.clone(),
            cache: SourceCache::resolve(config.data_paths.cache.as_deref()),
        })
    }

    /// Produce the merged mapping: from the cache when present, otherwise by
    /// fetching all sources, blending, and persisting the result.
    pub async fn load(&self) -> Result<HashMap<String, MergedEntry>, SourceError> {
        if let Some(cached) = self.cache.load() {
            info!("serving {} players from cache", cached.len());
            return Ok(cached);
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SourceError::MissingCredential("sportsdata_api_key".into()))?;

        let universe = spreadsheet::load_spreadsheet(&self.spreadsheet_path)?;
        info!("spreadsheet universe: {} players", universe.len());

        let stats = season_stats::fetch(&self.http, api_key, self.stats_season).await?;
        info!("season stats: {} players", stats.len());

        let projected = projections::fetch(&self.http, api_key, self.projection_season).await?;
        info!("site projections: {} players", projected.len());

        let contract_rows = contracts::fetch(&self.http, &self.teams).await?;
        info!("contracts: {} players", contract_rows.len());

        let merged = blend(universe, &stats, &projected, &contract_rows);

        if let Err(e) = self.cache.save(&merged) {
            warn!("failed to persist source cache: {e}");
        }

        Ok(merged)
    }
}

// ---------------------------------------------------------------------------
// Blend
// ---------------------------------------------------------------------------

/// Join the three overlay sources onto the spreadsheet universe. Players
/// missing from an overlay keep `None` for that overlay's fields.
pub fn blend(
    universe: HashMap<String, spreadsheet::SheetPlayer>,
    stats: &HashMap<String, season_stats::SeasonStats>,
    projected: &HashMap<String, projections::SiteProjections>,
    contract_rows: &HashMap<String, contracts::ContractRow>,
) -> HashMap<String, MergedEntry> {
    let mut merged = HashMap::with_capacity(universe.len());

    for (key, sheet) in universe {
        let historic = stats.get(&key);
        let projections = projected.get(&key).map(|p| {
            // The spreadsheet total counts as a sixth estimate.
            let mut estimates = Vec::with_capacity(1 + p.site_points.len());
            estimates.push(sheet.total_points);
            estimates.extend_from_slice(&p.site_points);
            estimates
        });
        let contract = contract_rows.get(&key).map(|c| ContractTerms {
            total_value: c.total_value.clone(),
            annual_value: c.annual_value.clone(),
            percent_guaranteed: c.percent_guaranteed.clone(),
        });

        merged.insert(
            key,
            MergedEntry {
                name: sheet.name,
                position: sheet.position,
                team: sheet.team,
                spreadsheet_total: sheet.total_points,
                projections,
                historic_points: historic.map(|s| s.site_points.clone()),
                games_played: historic.map(|s| s.games_played),
                contract,
            },
        );
    }

    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ContractRow;
    use season_stats::SeasonStats;
    use spreadsheet::SheetPlayer;

    fn sheet(name: &str, pos: &str, team: &str, total: f64) -> SheetPlayer {
        SheetPlayer {
            name: name.into(),
            position: pos.into(),
            team: team.into(),
            total_points: total,
        }
    }

    #[test]
    fn composite_key_case_folds_all_parts() {
        assert_eq!(composite_key("Allen", "QB", "Buf"), "allenqbbuf");
        assert_eq!(composite_key("mahomes", "qb", "KC"), "mahomesqbkc");
    }

    #[test]
    fn blend_attaches_every_overlay_when_keys_match() {
        let mut universe = HashMap::new();
        universe.insert(
            "allenqbbuf".to_string(),
            sheet("Josh Allen", "QB", "Buf", 380.5),
        );

        let mut stats = HashMap::new();
        stats.insert(
            "allenqbbuf".to_string(),
            SeasonStats {
                games_played: 17,
                site_points: vec![350.0, 360.0, 340.0, 355.0, 345.0],
            },
        );

        let mut projected = HashMap::new();
        projected.insert(
            "allenqbbuf".to_string(),
            projections::SiteProjections {
                site_points: vec![372.0, 390.0, 368.0, 375.0, 385.0],
            },
        );

        let mut contract_rows = HashMap::new();
        contract_rows.insert(
            "allenqbbuf".to_string(),
            ContractRow {
                name: "Josh Allen".into(),
                position: "QB".into(),
                team: "Buf".into(),
                total_value: "$258,000,000".into(),
                annual_value: "$43,000,000".into(),
                total_guaranteed: "$148,200,000".into(),
                avg_guarantee_per_year: "$24,700,000".into(),
                percent_guaranteed: "57.44%".into(),
            },
        );

        let merged = blend(universe, &stats, &projected, &contract_rows);
        assert_eq!(merged.len(), 1);

        let entry = &merged["allenqbbuf"];
        assert_eq!(entry.name, "Josh Allen");
        assert_eq!(entry.games_played, Some(17));
        assert_eq!(entry.historic_points.as_ref().unwrap().len(), 5);
        // Spreadsheet total leads the projection estimates.
        assert_eq!(
            entry.projections.as_deref(),
            Some(&[380.5, 372.0, 390.0, 368.0, 375.0, 385.0][..])
        );
        assert_eq!(
            entry.contract.as_ref().unwrap().total_value,
            "$258,000,000"
        );
    }

    #[test]
    fn blend_leaves_missing_overlays_as_none() {
        let mut universe = HashMap::new();
        universe.insert(
            "rookierbdet".to_string(),
            sheet("Rook Rookie", "RB", "Det", 120.0),
        );

        let merged = blend(universe, &HashMap::new(), &HashMap::new(), &HashMap::new());
        let entry = &merged["rookierbdet"];
        assert!(entry.projections.is_none());
        assert!(entry.historic_points.is_none());
        assert!(entry.games_played.is_none());
        assert!(entry.contract.is_none());
        assert!((entry.spreadsheet_total - 120.0).abs() < 1e-9);
    }

    #[test]
    fn blend_only_emits_players_from_the_universe() {
        // Stats for a player the spreadsheet does not carry are dropped.
        let mut stats = HashMap::new();
        stats.insert(
            "benchwrno".to_string(),
            SeasonStats {
                games_played: 3,
                site_points: vec![12.0],
            },
        );
        let merged = blend(HashMap::new(), &stats, &HashMap::new(), &HashMap::new());
        assert!(merged.is_empty());
    }
}
