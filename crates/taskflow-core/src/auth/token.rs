use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Token file name in the cache directory.
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Holder for the single opaque bearer token.
///
/// The token lives in memory and, when the store was opened against a
/// directory, in a small JSON file so it survives process restarts.
/// Absence means unauthenticated; presence proves nothing - validity is
/// only ever established by a successful session fetch.
///
/// Clone is cheap - the in-memory slot is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    token: Arc<RwLock<Option<String>>>,
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Create a store persisting to `<dir>/token.json`.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            path: Some(dir.join(TOKEN_FILE)),
        }
    }

    /// Create a store with no disk backing (tests, ephemeral hosts).
    pub fn in_memory() -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// Load a previously saved token from disk.
    /// Returns true if one was found.
    pub async fn load(&self) -> Result<bool> {
        let Some(ref path) = self.path else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read token file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        debug!(saved_at = %stored.saved_at, "loaded stored token");

        *self.token.write().await = Some(stored.token);
        Ok(true)
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_present(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Replace the token and persist it.
    pub async fn set(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());

        if let Some(ref path) = self.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create token directory")?;
            }
            let stored = StoredToken {
                token: token.to_string(),
                saved_at: Utc::now(),
            };
            let contents = serde_json::to_string_pretty(&stored)?;
            std::fs::write(path, contents).context("Failed to write token file")?;
        }
        Ok(())
    }

    /// Forget the token in memory and on disk.
    pub async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;

        if let Some(ref path) = self.path {
            if path.exists() {
                std::fs::remove_file(path).context("Failed to remove token file")?;
            }
        }
        Ok(())
    }
}
