//! CLI runner - executes commands

use crate::auth::Credentials;
use crate::catalog::{self, EntityDescriptor};
use crate::cli::commands::{Cli, Commands};
use crate::config::ConnectorConfig;
use crate::engine::ExtractionEngine;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::sink::{NdjsonSink, Sink};
use crate::state::StateStore;
use crate::template;
use crate::types::StringMap;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read {
                entities,
                output,
                full_refresh,
            } => {
                self.read(entities.as_deref(), output.as_deref(), *full_refresh)
                    .await
            }
            Commands::Entities => self.entities(),
            Commands::Validate => self.validate(),
        }
    }

    /// Load configuration (inline JSON takes precedence over file)
    fn load_config(&self) -> Result<ConnectorConfig> {
        if let Some(json_str) = &self.cli.config_json {
            return ConnectorConfig::from_json(json_str);
        }
        if let Some(path) = &self.cli.config {
            return ConnectorConfig::from_file(path);
        }
        Err(Error::config(
            "No configuration provided (use --config or --config-json)",
        ))
    }

    /// Load the state store
    fn load_state(&self) -> Result<StateStore> {
        match &self.cli.state {
            Some(path) => StateStore::from_file(path),
            None => Ok(StateStore::in_memory()),
        }
    }

    /// Build the HTTP client from configuration
    fn build_client(config: &ConnectorConfig) -> Arc<HttpClient> {
        let mut builder = HttpClientConfig::builder()
            .base_url(&config.api_url)
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .max_retries(config.http.max_retries)
            .backoff(
                config.http.retry_backoff.backoff_type,
                Duration::from_millis(config.http.retry_backoff.initial_ms),
                Duration::from_millis(config.http.retry_backoff.max_ms),
            )
            .rate_limit(RateLimiterConfig::new(
                config.http.rate_limit.requests_per_second,
                config.http.rate_limit.burst_size,
            ));

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }

        let credentials = Credentials::bearer(&config.auth_token);
        Arc::new(HttpClient::with_credentials(builder.build(), credentials))
    }

    /// Path parameters shared by all entity templates
    fn path_params(config: &ConnectorConfig) -> StringMap {
        let mut params = StringMap::new();
        params.insert("account_id".to_string(), config.account_id.clone());
        params
    }

    /// Resolve the entity selection (comma-separated names, empty = all)
    fn select_entities(selection: Option<&str>) -> Result<Vec<EntityDescriptor>> {
        match selection {
            None => Ok(catalog::builtin().to_vec()),
            Some(names) => names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    catalog::find(name)
                        .cloned()
                        .ok_or_else(|| Error::entity_not_found(name))
                })
                .collect(),
        }
    }

    /// Check connection by probing the accounts endpoint
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = Self::build_client(&config);
        let params = Self::path_params(&config);

        let accounts = catalog::find("accounts")
            .ok_or_else(|| Error::entity_not_found("accounts"))?;
        let path = template::render(&accounts.path, &params)?;

        info!("Checking connection to {}", config.api_url);
        client.get(&path).await?;

        println!("{}", json!({ "type": "CONNECTION_STATUS", "status": "SUCCEEDED" }));
        Ok(())
    }

    /// Print the entity catalog
    fn discover(&self) -> Result<()> {
        let entities = catalog::builtin();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "entities": entities }))?
        );
        Ok(())
    }

    /// List entity names
    fn entities(&self) -> Result<()> {
        for entity in catalog::builtin() {
            println!("{}", entity.name);
        }
        Ok(())
    }

    /// Validate configuration and catalog without issuing requests
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        let params = Self::path_params(&config);

        for entity in catalog::builtin() {
            // Every template parameter must resolve at startup
            template::render(&entity.path, &params)?;
        }

        println!(
            "{}",
            json!({ "type": "VALIDATION", "status": "SUCCEEDED", "entities": catalog::builtin().len() })
        );
        Ok(())
    }

    /// Extract the selected entities
    async fn read(
        &self,
        selection: Option<&str>,
        output: Option<&std::path::Path>,
        full_refresh: bool,
    ) -> Result<()> {
        let config = self.load_config()?;
        let state = self.load_state()?;
        let entities = Self::select_entities(selection)?;

        if full_refresh {
            for entity in &entities {
                state.clear_entity(&entity.name).await?;
            }
        }

        let sink: Arc<dyn Sink> = match output {
            Some(path) => Arc::new(NdjsonSink::create(path).await?),
            None => Arc::new(NdjsonSink::stdout()),
        };

        let engine = ExtractionEngine::new(
            Self::build_client(&config),
            state,
            sink,
            Self::path_params(&config),
        );

        let summary = engine.extract_all(&entities).await;

        info!(
            records = summary.records_total(),
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            "run complete"
        );

        if summary.is_success() {
            Ok(())
        } else {
            let failed: Vec<_> = summary.failed.iter().map(|f| f.entity.as_str()).collect();
            Err(Error::Other(format!(
                "{} of {} entities failed: {}",
                summary.failed.len(),
                entities.len(),
                failed.join(", ")
            )))
        }
    }
}
