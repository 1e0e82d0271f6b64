//! Extraction engine
//!
//! The fetch→project→emit→checkpoint loop for one entity, and the runner
//! that drives all selected entities as concurrent, failure-isolated tasks.
//!
//! The durability invariant lives here: a page's records are emitted to the
//! sink before its successor token is checkpointed, so a crash between emit
//! and checkpoint re-delivers at most one page and never loses one.

mod types;

pub use types::{EntityFailure, EntityStats, RunSummary};

use crate::catalog::EntityDescriptor;
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::projector::Projector;
use crate::sink::Sink;
use crate::state::StateStore;
use crate::template;
use crate::types::{JsonValue, StringMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Drives extraction for entities against one configured API account
#[derive(Clone)]
pub struct ExtractionEngine {
    client: Arc<HttpClient>,
    state: StateStore,
    sink: Arc<dyn Sink>,
    path_params: StringMap,
}

impl ExtractionEngine {
    /// Create a new engine
    pub fn new(
        client: Arc<HttpClient>,
        state: StateStore,
        sink: Arc<dyn Sink>,
        path_params: StringMap,
    ) -> Self {
        Self {
            client,
            state,
            sink,
            path_params,
        }
    }

    /// Get the state store
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Extract one entity to completion, resuming from its checkpointed
    /// token if one exists.
    pub async fn extract(&self, entity: &EntityDescriptor) -> Result<EntityStats> {
        let start = Instant::now();
        let mut stats = EntityStats::default();

        let path = template::render(&entity.path, &self.path_params)?;
        let mut projector = Projector::new(entity.record_path.clone(), entity.schema.clone());
        if let Some(hook) = &entity.post_process {
            projector = projector.with_hook(hook.clone());
        }

        // Read once at extraction start. From here on, an absent token only
        // ever means "no more pages": the loop reads it before the first
        // request and exits the moment next_token comes back empty, so a
        // completion-None is never fed back in as an input.
        let mut token = self.state.get_token(&entity.name).await;
        if let Some(resume) = &token {
            info!(entity = %entity.name, token = %resume, "resuming from checkpoint");
        } else {
            info!(entity = %entity.name, "starting extraction");
        }

        loop {
            let mut request = RequestConfig::new();
            for (key, value) in &entity.params {
                request = request.query(key, value);
            }
            for (key, value) in entity.pagination.request_params(token.as_ref()) {
                request = request.query(key, value);
            }

            let response = self.client.get_with_config(&path, request).await?;
            let body_text = response.text().await?;
            let body: JsonValue = serde_json::from_str(&body_text).map_err(|e| {
                crate::error::Error::malformed(
                    entity.record_path.to_string(),
                    format!("response body is not valid JSON: {e}"),
                )
            })?;

            let page = projector.project(&body)?;
            stats.pages += 1;

            debug!(
                entity = %entity.name,
                page = stats.pages,
                records = page.records.len(),
                "fetched page"
            );

            // Emit before checkpointing; never the other way around.
            for record in &page.records {
                self.sink.write(&entity.name, record).await?;
            }
            stats.records += page.records.len();

            let next = entity
                .pagination
                .next_token(&body, page.raw_count, token.as_ref());
            self.state.set_token(&entity.name, next.clone()).await?;

            match next {
                Some(next_token) => token = Some(next_token),
                None => break,
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            entity = %entity.name,
            records = stats.records,
            pages = stats.pages,
            "completed extraction"
        );

        Ok(stats)
    }

    /// Extract all given entities as concurrent tasks.
    ///
    /// Failures are isolated per entity: one entity failing never aborts its
    /// siblings, and every failure is reported with the entity name, the
    /// last checkpointed token, and the fetch attempt count.
    pub async fn extract_all(&self, entities: &[EntityDescriptor]) -> RunSummary {
        let tasks: Vec<_> = entities
            .iter()
            .map(|entity| {
                let engine = self.clone();
                let entity = entity.clone();
                tokio::spawn(async move {
                    let result = engine.extract(&entity).await;
                    (entity.name, result)
                })
            })
            .collect();

        let mut summary = RunSummary::default();
        for joined in futures::future::join_all(tasks).await {
            let Ok((name, result)) = joined else {
                // A panicked task still must not abort its siblings
                error!("entity task panicked");
                continue;
            };
            match result {
                Ok(stats) => summary.succeeded.push((name, stats)),
                Err(err) => {
                    let failure = EntityFailure {
                        last_token: self.state.get_token(&name).await,
                        attempts: err.attempts().unwrap_or(1),
                        entity: name,
                        error: err,
                    };
                    error!("{failure}");
                    summary.failed.push(failure);
                }
            }
        }

        summary
    }
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("client", &self.client)
            .field("state", &self.state)
            .field("path_params", &self.path_params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
