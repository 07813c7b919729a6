//! Per-user offline status cache.
//!
//! Every successful status pull is written to `{cache_dir}/{username}.json`
//! so a kiosk that loses the server can keep counting from the last known
//! time-left.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last status seen from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedStatus {
    /// Balance.
    pub balance: i64,
    /// Time-left in seconds.
    pub time_left: i64,
    /// Account version.
    pub version: i64,
    /// When this entry was written.
    pub saved_at: DateTime<Utc>,
}

/// Directory of cached statuses, one JSON file per user.
#[derive(Debug, Clone)]
pub struct StatusCache {
    dir: PathBuf,
}

impl StatusCache {
    /// Cache rooted at `dir`; the directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, username: &str) -> PathBuf {
        let safe: String = username
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let safe = safe.trim_start_matches('.');
        let name = if safe.is_empty() { "_" } else { safe };
        self.dir.join(format!("{name}.json"))
    }

    /// Read the cached status, `None` when the user has no cache file.
    pub async fn load(&self, username: &str) -> io::Result<Option<CachedStatus>> {
        let raw = match tokio::fs::read(self.path_for(username)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Replace the cached status. Written to a temp file and renamed into
    /// place so a crash never leaves a truncated file.
    pub async fn save(&self, username: &str, status: &CachedStatus) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(username);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(status)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await
    }
}
