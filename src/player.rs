// Normalized in-memory player representation.
//
// A `PlayerRecord` is built once per process start from a merged source
// entry and held immutably for the life of the serving process. Every
// numeric field holds a defined default when the source data is absent, so
// downstream sorting and filtering never deals with missing values.

use crate::sources::MergedEntry;

/// One player's merged fantasy and contract data.
///
/// The composite `key` (case-folded last name + position + team) is supplied
/// by the assembler; the record never derives its own key.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub key: String,
    pub name: String,
    pub position: String,
    pub team: String,
    pub last_year_points: f64,
    pub projected_points: f64,
    pub projected_points_stddev: f64,
    pub games_played: u32,
    pub contract_total_value: f64,
    pub contract_total_value_display: String,
    pub percent_guaranteed: f64,
    pub percent_guaranteed_display: String,
}

impl PlayerRecord {
    /// Build a record from a merged source entry. Pure, no I/O.
    ///
    /// Fallbacks: missing historic points average to 0, a missing projection
    /// collection falls back to the spreadsheet's single total with a 0
    /// deviation, and a missing contract yields 0 values with empty display
    /// strings.
    pub fn from_entry(key: &str, entry: &MergedEntry) -> PlayerRecord {
        let last_year_points = match entry.historic_points.as_deref() {
            Some(points) if !points.is_empty() => round2(mean(points)),
            _ => 0.0,
        };

        let (projected_points, projected_points_stddev) = match entry.projections.as_deref() {
            Some(points) if !points.is_empty() => {
                (round2(mean(points)), round2(sample_stddev(points)))
            }
            _ => (entry.spreadsheet_total, 0.0),
        };

        let (contract_total_value, contract_total_value_display, percent_guaranteed, percent_guaranteed_display) =
            match &entry.contract {
                Some(contract) => (
                    parse_currency(&contract.total_value),
                    contract.total_value.clone(),
                    parse_currency(&contract.percent_guaranteed),
                    contract.percent_guaranteed.clone(),
                ),
                None => (0.0, String::new(), 0.0, String::new()),
            };

        PlayerRecord {
            key: key.to_string(),
            name: entry.name.clone(),
            position: entry.position.clone(),
            team: entry.team.clone(),
            last_year_points,
            projected_points,
            projected_points_stddev,
            games_played: entry.games_played.unwrap_or(0),
            contract_total_value,
            contract_total_value_display,
            percent_guaranteed,
            percent_guaranteed_display,
        }
    }

    /// Fixed ordered projection of the display fields. The presentation
    /// layer pairs these positionally with its table headings, so the order
    /// is a contract: identifier, name, position, team, last-year points,
    /// projected points, projected deviation, games played, contract value
    /// display, percent-guaranteed display.
    pub fn display_row(&self) -> [String; 10] {
        [
            self.key.clone(),
            self.name.clone(),
            self.position.clone(),
            self.team.clone(),
            self.last_year_points.to_string(),
            self.projected_points.to_string(),
            self.projected_points_stddev.to_string(),
            self.games_played.to_string(),
            self.contract_total_value_display.clone(),
            self.percent_guaranteed_display.clone(),
        ]
    }
}

// ---------------------------------------------------------------------------
// List views used by the table pages
// ---------------------------------------------------------------------------

/// Players with a short prior season (< 12 games) or a volatile projection
/// (deviation > 40), sorted by projected points descending.
pub fn risky_players(players: &[PlayerRecord]) -> Vec<PlayerRecord> {
    let mut risky: Vec<PlayerRecord> = players
        .iter()
        .filter(|p| p.games_played < 12 || p.projected_points_stddev > 40.0)
        .cloned()
        .collect();
    risky.sort_by(|a, b| b.projected_points.total_cmp(&a.projected_points));
    risky
}

/// All players sorted by numeric contract value, highest paid first.
pub fn sorted_by_contract_value(players: &[PlayerRecord]) -> Vec<PlayerRecord> {
    let mut sorted = players.to_vec();
    sorted.sort_by(|a, b| b.contract_total_value.total_cmp(&a.contract_total_value));
    sorted
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 divisor); 0 for fewer than 2 values.
fn sample_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let variance =
        values.iter().map(|v| (v - mu) * (v - mu)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Numeric value of a currency or percent display string: everything other
/// than ASCII digits and '.' is stripped before parsing. A string with
/// nothing left after stripping parses to 0; anything worse is an upstream
/// data problem this layer does not try to repair.
pub fn parse_currency(display: &str) -> f64 {
    let digits: String = display
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
