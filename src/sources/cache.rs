// Blended-data cache.
//
// An explicit cache object owned by the assembler: load-or-miss on startup,
// persist after a successful blend. The file is a JSON envelope with the
// merged mapping and a fetch timestamp. A corrupt or unreadable file is
// treated as a miss, never as a fatal error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{MergedEntry, SourceError};

const CACHE_FILE_NAME: &str = "player_cache.json";

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    fetched_at: DateTime<Utc>,
    entries: HashMap<String, MergedEntry>,
}

/// On-disk cache of one blended source mapping.
#[derive(Debug, Clone)]
pub struct SourceCache {
    path: PathBuf,
}

impl SourceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve the cache location: the configured path when set, otherwise
    /// the platform data directory (falling back to the working directory).
    pub fn resolve(configured: Option<&str>) -> Self {
        match configured {
            Some(path) => Self::new(path),
            None => {
                let path = ProjectDirs::from("", "", "rosterview")
                    .map(|dirs| dirs.data_dir().join(CACHE_FILE_NAME))
                    .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME));
                Self::new(path)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached mapping, or `None` when the file is absent or does
    /// not parse.
    pub fn load(&self) -> Option<HashMap<String, MergedEntry>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("failed to read cache {}: {e}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str::<CacheFile>(&text) {
            Ok(cache) => {
                info!(
                    "cache hit: {} entries fetched at {}",
                    cache.entries.len(),
                    cache.fetched_at
                );
                Some(cache.entries)
            }
            Err(e) => {
                warn!(
                    "ignoring corrupt cache {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Persist the blended mapping, stamping it with the current time.
    pub fn save(&self, entries: &HashMap<String, MergedEntry>) -> Result<(), SourceError> {
        let cache = CacheFile {
            fetched_at: Utc::now(),
            entries: entries.clone(),
        };
        let json = serde_json::to_string(&cache).map_err(|e| SourceError::Cache {
            path: self.path.display().to_string(),
            message: format!("serialization failed: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SourceError::Cache {
                path: self.path.display().to_string(),
                message: format!("failed to create cache directory: {e}"),
            })?;
        }
        std::fs::write(&self.path, json).map_err(|e| SourceError::Cache {
            path: self.path.display().to_string(),
            message: format!("write failed: {e}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
