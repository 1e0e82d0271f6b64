//! State store implementation
//!
//! File-based persistence with atomic writes. Keys are independent per
//! entity: concurrent entities never contend on the same key, and a single
//! entity's checkpoints are strictly ordered by its own page loop.

use super::types::State;
use crate::error::{Error, Result};
use crate::pagination::PageToken;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Durable key-value store of per-entity pagination tokens
#[derive(Debug)]
pub struct StateStore {
    /// Path to the state file (empty in in-memory mode)
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
    /// Whether to persist on every update
    auto_save: bool,
}

impl StateStore {
    /// Create an in-memory store (no file persistence; tests and dry runs)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(State::new())),
            auto_save: false,
        }
    }

    /// Create a store backed by a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::persistence(format!("Failed to read state file: {e}")))?;
            serde_json::from_str(&contents)
                .map_err(|e| Error::persistence(format!("Failed to parse state file: {e}")))?
        } else {
            State::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// Create a store from an inline JSON string (not persisted)
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)
            .map_err(|e| Error::persistence(format!("Failed to parse state JSON: {e}")))?;

        Ok(Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(state)),
            auto_save: false,
        })
    }

    /// Get the resume token for an entity
    pub async fn get_token(&self, entity: &str) -> Option<PageToken> {
        let state = self.state.read().await;
        state.get_token(entity).cloned()
    }

    /// Checkpoint a token for an entity (`None` clears it).
    ///
    /// The write is durable before this returns; a failure here must stop
    /// the caller from fetching further pages.
    pub async fn set_token(&self, entity: &str, token: Option<PageToken>) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.set_token(entity, token);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Clear state for a specific entity
    pub async fn clear_entity(&self, entity: &str) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.entities.remove(entity);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Persist the current state to file
    pub async fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }

        let contents = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)
                .map_err(|e| Error::persistence(format!("Failed to serialize state: {e}")))?
        };

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::persistence(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::persistence(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }

    /// Export state as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::persistence(format!("Failed to serialize state: {e}")))
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

impl Clone for StateStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            auto_save: self.auto_save,
        }
    }
}
