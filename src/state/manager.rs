//! Resume store implementation
//!
//! Provides file-based token persistence with atomic writes.

use super::types::{ResumeEntry, ResumeState};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Persists continuation tokens between runs
#[derive(Debug)]
pub struct ResumeStore {
    /// Path to the state file (empty in memory mode)
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<ResumeState>>,
    /// Whether to save on every update
    auto_save: bool,
}

impl ResumeStore {
    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(ResumeState::new())),
            auto_save: false,
        }
    }

    /// Open a store backed by `path`, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?
        } else {
            ResumeState::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// Path backing this store, if any
    pub fn path(&self) -> Option<&Path> {
        (!self.path.as_os_str().is_empty()).then_some(self.path.as_path())
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }

        let contents = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::state(format!("Failed to create state directory: {e}")))?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %self.path.display(), "Saved resume state");
        Ok(())
    }

    /// Token stored for an operation
    pub async fn get_token(&self, key: &str) -> Option<String> {
        let state = self.state.read().await;
        state.get_token(key).map(ToString::to_string)
    }

    /// Full entry stored for an operation
    pub async fn get_entry(&self, key: &str) -> Option<ResumeEntry> {
        self.state.read().await.operations.get(key).cloned()
    }

    /// Store a token for an operation
    pub async fn set_token(&self, key: &str, token: String) -> Result<()> {
        self.state.write().await.set_token(key, token);

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Forget an operation's token
    pub async fn clear(&self, key: &str) -> Result<()> {
        let removed = self.state.write().await.clear(key);

        if removed && self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Record how a fetch ended: keep the token if one remains, else clear
    pub async fn record(&self, key: &str, next_token: Option<&str>) -> Result<()> {
        match next_token {
            Some(token) => self.set_token(key, token.to_string()).await,
            None => self.clear(key).await,
        }
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> ResumeState {
        self.state.read().await.clone()
    }
}
