// Configuration loading and parsing (settings.toml, teams.toml, credentials.toml).

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub data_paths: DataPaths,
    pub credentials: CredentialsConfig,
    pub teams: TeamTable,
}

// ---------------------------------------------------------------------------
// settings.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire settings.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    server: ServerConfig,
    sources: SourcesConfig,
    data: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// Which seasons the two sportsdata.io endpoints are asked for: stats come
/// from the completed season, projections from the upcoming one.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub stats_season: u16,
    pub projection_season: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// Spreadsheet export that defines the player universe.
    pub spreadsheet: String,
    /// Blended-data cache file. When omitted the cache lands in the
    /// platform data directory.
    #[serde(default)]
    pub cache: Option<String>,
}

// ---------------------------------------------------------------------------
// teams.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[teams]` table in teams.toml.
#[derive(Debug, Clone, Deserialize)]
struct TeamsFile {
    teams: HashMap<String, String>,
}

/// Full team name → abbreviation lookup, e.g. "Chiefs" → "KC".
///
/// Passed explicitly into the assembler and the search page; nothing in the
/// crate keeps a module-global copy.
#[derive(Debug, Clone, Default)]
pub struct TeamTable {
    by_name: HashMap<String, String>,
}

impl TeamTable {
    pub fn new(by_name: HashMap<String, String>) -> Self {
        Self { by_name }
    }

    /// Abbreviation for a full team name, if the team is known.
    pub fn abbr(&self, full_name: &str) -> Option<&str> {
        self.by_name.get(full_name).map(String::as_str)
    }

    /// All abbreviations, sorted, for building the search dropdown.
    pub fn abbreviations(&self) -> Vec<&str> {
        let mut abbrs: Vec<&str> = self.by_name.values().map(String::as_str).collect();
        abbrs.sort_unstable();
        abbrs
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub sportsdata_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml`,
/// `config/teams.toml`, and (optionally) `config/credentials.toml`, all
/// relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- settings.toml (required) ---
    let settings_path = config_dir.join("settings.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- teams.toml (required) ---
    let teams_path = config_dir.join("teams.toml");
    let teams_text = read_file(&teams_path)?;
    let teams_file: TeamsFile =
        toml::from_str(&teams_text).map_err(|e| ConfigError::ParseError {
            path: teams_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        server: settings.server,
        sources: settings.sources,
        data_paths: settings.data,
        credentials,
        teams: TeamTable::new(teams_file.teams),
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        // If config/ also doesn't exist, the app will fail to load config.
        // Return an error with a clear message about the missing defaults
        // directory.
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        // Skip non-files and entries without a file name
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "server.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.server.bind.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "server.bind".into(),
            message: "must not be empty".into(),
        });
    }

    let season_fields: &[(&str, u16)] = &[
        ("sources.stats_season", config.sources.stats_season),
        ("sources.projection_season", config.sources.projection_season),
    ];
    for (name, season) in season_fields {
        if !(2000..=2100).contains(season) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("implausible season year {season}"),
            });
        }
    }

    if config.data_paths.spreadsheet.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.spreadsheet".into(),
            message: "must not be empty".into(),
        });
    }

    if config.teams.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "teams".into(),
            message: "team table must contain at least one entry".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: returns the path to the project root (works whether
    /// `cargo test` runs from the crate root or somewhere above it).
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("rosterview/defaults").exists() {
            cwd.join("rosterview")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    /// Helper: temp dir seeded with the default settings.toml and teams.toml.
    fn seeded_temp_dir(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let config_dir = tmp.join("config");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&config_dir).unwrap();

        let root = project_root();
        fs::copy(
            root.join("defaults/settings.toml"),
            config_dir.join("settings.toml"),
        )
        .unwrap();
        fs::copy(root.join("defaults/teams.toml"), config_dir.join("teams.toml")).unwrap();
        tmp
    }

    #[test]
    fn load_valid_config_from_project_files() {
        let root = project_root();
        ensure_config_files(&root).expect("should copy default configs");
        let config = load_config_from(&root).expect("should load valid config");

        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sources.stats_season, 2024);
        assert_eq!(config.sources.projection_season, 2025);
        assert_eq!(config.data_paths.spreadsheet, "data/projections_export.csv");
        assert!(config.data_paths.cache.is_none());

        // Full 32-team table with a few spot checks.
        assert_eq!(config.teams.len(), 32);
        assert_eq!(config.teams.abbr("Chiefs"), Some("KC"));
        assert_eq!(config.teams.abbr("49ers"), Some("SF"));
        assert_eq!(config.teams.abbr("Commanders"), Some("Wsh"));
        assert_eq!(config.teams.abbr("Oilers"), None);
    }

    #[test]
    fn missing_credentials_toml_is_ok() {
        let tmp = seeded_temp_dir("rosterview_config_test_no_creds");

        let config = load_config_from(&tmp).expect("should load without credentials.toml");
        assert!(config.credentials.sportsdata_api_key.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn credentials_toml_with_api_key() {
        let tmp = seeded_temp_dir("rosterview_config_test_with_creds");
        fs::write(
            tmp.join("config/credentials.toml"),
            "sportsdata_api_key = \"sd-test-key\"\n",
        )
        .unwrap();

        let config = load_config_from(&tmp).expect("should load with credentials.toml");
        assert_eq!(
            config.credentials.sportsdata_api_key.as_deref(),
            Some("sd-test-key")
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_port_zero() {
        let tmp = seeded_temp_dir("rosterview_config_test_port_zero");
        fs::write(
            tmp.join("config/settings.toml"),
            "[server]\nbind = \"127.0.0.1\"\nport = 0\n\
             \n[sources]\nstats_season = 2024\nprojection_season = 2025\n\
             \n[data]\nspreadsheet = \"data/projections_export.csv\"\n",
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "server.port"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_team_table() {
        let tmp = seeded_temp_dir("rosterview_config_test_empty_teams");
        fs::write(tmp.join("config/teams.toml"), "[teams]\n").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. } if field == "teams"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_implausible_season() {
        let tmp = seeded_temp_dir("rosterview_config_test_bad_season");
        fs::write(
            tmp.join("config/settings.toml"),
            "[server]\nbind = \"127.0.0.1\"\nport = 8080\n\
             \n[sources]\nstats_season = 1890\nprojection_season = 2025\n\
             \n[data]\nspreadsheet = \"data/projections_export.csv\"\n",
        )
        .unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "sources.stats_season")
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_settings_file_reports_path() {
        let tmp = std::env::temp_dir().join("rosterview_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn team_abbreviations_are_sorted() {
        let mut by_name = HashMap::new();
        by_name.insert("Chiefs".to_string(), "KC".to_string());
        by_name.insert("Bills".to_string(), "Buf".to_string());
        by_name.insert("Cardinals".to_string(), "Ari".to_string());
        let table = TeamTable::new(by_name);
        assert_eq!(table.abbreviations(), vec!["Ari", "Buf", "KC"]);
    }
}
