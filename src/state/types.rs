//! State types persisted between runs

use crate::pagination::PageToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete extraction state, keyed per entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    /// Per-entity state
    #[serde(default)]
    pub entities: HashMap<String, EntityState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the resume token for an entity
    pub fn get_token(&self, entity: &str) -> Option<&PageToken> {
        self.entities.get(entity)?.token.as_ref()
    }

    /// Set (or clear, with `None`) the token for an entity
    pub fn set_token(&mut self, entity: &str, token: Option<PageToken>) {
        let entry = self.entities.entry(entity.to_string()).or_default();
        entry.token = token;
        entry.updated_at = Some(Utc::now());
    }
}

/// Persisted state for a single entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityState {
    /// Last checkpointed pagination token. Absent after a completed run, so
    /// the next run starts from the beginning; present only when a run was
    /// interrupted mid-stream.
    #[serde(default)]
    pub token: Option<PageToken>,

    /// When the last checkpoint was written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.entities.is_empty());
        assert!(state.get_token("runs").is_none());
    }

    #[test]
    fn test_state_token_round_trip() {
        let mut state = State::new();
        state.set_token("runs", Some(PageToken::Offset(100)));
        assert_eq!(state.get_token("runs"), Some(&PageToken::Offset(100)));

        state.set_token("runs", None);
        assert!(state.get_token("runs").is_none());
        // Entry survives clearing so the last-checkpoint time is visible
        assert!(state.entities.get("runs").unwrap().updated_at.is_some());
    }

    #[test]
    fn test_state_serialization() {
        let mut state = State::new();
        state.set_token("runs", Some(PageToken::Offset(200)));
        state.set_token("jobs", Some(PageToken::Cursor("cur_9".to_string())));

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.get_token("runs"), Some(&PageToken::Offset(200)));
        assert_eq!(
            restored.get_token("jobs"),
            Some(&PageToken::Cursor("cur_9".to_string()))
        );
    }
}
