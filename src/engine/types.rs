//! Engine types
//!
//! Per-entity statistics, failure reports, and the run summary.

use crate::error::Error;
use crate::pagination::PageToken;

/// Statistics from one entity's extraction
#[derive(Debug, Clone, Default)]
pub struct EntityStats {
    /// Records emitted to the sink
    pub records: usize,
    /// Pages fetched
    pub pages: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// A failed entity extraction, with the operability context the run report
/// needs: which entity, where it stopped, and how hard the fetch tried.
#[derive(Debug)]
pub struct EntityFailure {
    /// Entity name
    pub entity: String,
    /// Last successfully checkpointed token, if any
    pub last_token: Option<PageToken>,
    /// Fetch attempts recorded in the error (1 for non-fetch failures)
    pub attempts: u32,
    /// The underlying error
    pub error: Error,
}

impl std::fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = self
            .last_token
            .as_ref()
            .map_or_else(|| "none".to_string(), ToString::to_string);
        write!(
            f,
            "entity '{}' failed (last token: {}, attempts: {}): {}",
            self.entity, token, self.attempts, self.error
        )
    }
}

/// Outcome of extracting every selected entity
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Entities that completed, with their stats
    pub succeeded: Vec<(String, EntityStats)>,
    /// Entities that failed
    pub failed: Vec<EntityFailure>,
}

impl RunSummary {
    /// Whether every entity completed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total records emitted across all completed entities
    pub fn records_total(&self) -> usize {
        self.succeeded.iter().map(|(_, s)| s.records).sum()
    }

    /// Stats for a completed entity
    pub fn stats_for(&self, entity: &str) -> Option<&EntityStats> {
        self.succeeded
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, stats)| stats)
    }

    /// Failure for an entity, if it failed
    pub fn failure_for(&self, entity: &str) -> Option<&EntityFailure> {
        self.failed.iter().find(|f| f.entity == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_failure_display() {
        let failure = EntityFailure {
            entity: "jobs".to_string(),
            last_token: Some(PageToken::Offset(100)),
            attempts: 1,
            error: Error::rejected(401, "invalid token"),
        };
        let text = failure.to_string();
        assert!(text.contains("jobs"));
        assert!(text.contains("100"));
        assert!(text.contains("401"));
    }

    #[test]
    fn test_run_summary() {
        let mut summary = RunSummary::default();
        summary.succeeded.push((
            "accounts".to_string(),
            EntityStats {
                records: 1,
                pages: 1,
                duration_ms: 5,
            },
        ));
        assert!(summary.is_success());
        assert_eq!(summary.records_total(), 1);

        summary.failed.push(EntityFailure {
            entity: "jobs".to_string(),
            last_token: None,
            attempts: 1,
            error: Error::rejected(401, String::new()),
        });
        assert!(!summary.is_success());
        assert!(summary.failure_for("jobs").is_some());
        assert!(summary.stats_for("accounts").is_some());
    }
}
