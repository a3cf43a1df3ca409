// Spreadsheet-export loader.
//
// Reads the locally supplied CSV export (PLAYER, Position, Team, FFP_TOTAL
// columns). Its rows define the player universe the other sources overlay.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::{composite_key, SourceError};

/// One spreadsheet row, normalized.
#[derive(Debug, Clone)]
pub struct SheetPlayer {
    pub name: String,
    pub position: String,
    pub team: String,
    pub total_points: f64,
}

/// Raw CSV row. Extra columns the export carries are absorbed via
/// `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code, non_snake_case)]
struct RawSheetRow {
    PLAYER: String,
    Position: String,
    Team: String,
    FFP_TOTAL: f64,
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

fn load_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, SheetPlayer>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = HashMap::new();
    for result in reader.deserialize::<RawSheetRow>() {
        match result {
            Ok(raw) => {
                let name = raw.PLAYER.trim().to_string();
                // Keyed by last name; the export writes "First Last".
                let Some(last) = name.split_whitespace().nth(1) else {
                    warn!("skipping spreadsheet row '{name}': no last name");
                    continue;
                };
                if !raw.FFP_TOTAL.is_finite() {
                    warn!("skipping spreadsheet row '{name}': non-finite FFP_TOTAL");
                    continue;
                }
                let position = raw.Position.trim().to_string();
                let team = raw.Team.trim().to_string();
                let key = composite_key(last, &position, &team);
                players.insert(
                    key,
                    SheetPlayer {
                        name,
                        position,
                        team,
                        total_points: raw.FFP_TOTAL,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed spreadsheet row: {e}");
            }
        }
    }
    Ok(players)
}

/// Load the spreadsheet export from disk, keyed by composite identifier.
pub fn load_spreadsheet(path: &Path) -> Result<HashMap<String, SheetPlayer>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(SourceError::Validation(format!(
            "spreadsheet {} produced zero valid rows",
            path.display()
        )));
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_keyed_by_last_name_position_team() {
        let csv_data = "\
PLAYER,Position,Team,FFP_TOTAL
Josh Allen,QB,Buf,380.5
Saquon Barkley,RB,Phi,290.2";

        let players = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);

        let allen = &players["allenqbbuf"];
        assert_eq!(allen.name, "Josh Allen");
        assert_eq!(allen.position, "QB");
        assert_eq!(allen.team, "Buf");
        assert!((allen.total_points - 380.5).abs() < f64::EPSILON);

        assert!(players.contains_key("barkleyrbphi"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv_data = "\
PLAYER,Position,Team,FFP_TOTAL,RANK,BYE
Josh Allen,QB,Buf,380.5,1,12";

        let players = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert!(players.contains_key("allenqbbuf"));
    }

    #[test]
    fn single_word_names_are_skipped() {
        let csv_data = "\
PLAYER,Position,Team,FFP_TOTAL
Cher,QB,Buf,10.0
Josh Allen,QB,Buf,380.5";

        let players = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert!(players.contains_key("allenqbbuf"));
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let csv_data = "\
PLAYER,Position,Team,FFP_TOTAL
Josh Allen,QB,Buf,not-a-number
Saquon Barkley,RB,Phi,290.2";

        let players = load_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert!(players.contains_key("barkleyrbphi"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_spreadsheet(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}
