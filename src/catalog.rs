//! Entity catalog
//!
//! Static metadata for every extractable entity: name, path template,
//! primary key, optional replication cursor field, page size, record path,
//! pagination policy, and field schema. Descriptors are built once at
//! startup and referenced, never mutated, by the engine.
//!
//! Entity-specific behavior lives here as data; the engine stays generic.

use crate::pagination::Pagination;
use crate::projector::{RecordHook, RecordPath};
use crate::types::{FieldType, StringMap};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Schema
// ============================================================================

/// Declared top-level fields of an entity's records
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    fields: HashMap<String, FieldType>,
}

impl Schema {
    /// Build a schema from (name, type) pairs
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldType)>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }

    /// Check whether a field is declared
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Declared type of a field
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        self.fields.get(field).copied()
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether the schema declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Entity Descriptor
// ============================================================================

/// Static description of one extractable entity
#[derive(Debug, Clone, Serialize)]
pub struct EntityDescriptor {
    /// Unique entity name
    pub name: String,

    /// API path template, e.g. `/accounts/{account_id}/runs`
    pub path: String,

    /// Primary key fields
    pub primary_key: Vec<String>,

    /// Field used as the replication cursor, if any
    pub replication_key: Option<String>,

    /// Records per page for paginated entities
    pub page_size: Option<u32>,

    /// Fixed query parameters sent with every request
    pub params: StringMap,

    /// Location of the record array in response bodies
    pub record_path: RecordPath,

    /// Pagination policy
    pub pagination: Pagination,

    /// Declared record fields
    pub schema: Schema,

    /// Optional per-record transform/filter
    #[serde(skip)]
    pub post_process: Option<RecordHook>,
}

impl EntityDescriptor {
    /// Create a descriptor with defaults: no pagination, records at `$.data[*]`
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            primary_key: vec!["id".to_string()],
            replication_key: None,
            page_size: None,
            params: StringMap::new(),
            record_path: RecordPath::new(["data"]),
            pagination: Pagination::None,
            schema: Schema::default(),
            post_process: None,
        }
    }

    /// Set pagination policy
    #[must_use]
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Add a fixed query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the schema
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the record path
    #[must_use]
    pub fn with_record_path(mut self, record_path: RecordPath) -> Self {
        self.record_path = record_path;
        self
    }

    /// Attach a per-record hook
    #[must_use]
    pub fn with_post_process(mut self, hook: RecordHook) -> Self {
        self.post_process = Some(hook);
        self
    }
}

// ============================================================================
// Built-in Catalog
// ============================================================================

/// The built-in entities, in extraction order
static BUILTIN_ENTITIES: Lazy<Vec<EntityDescriptor>> =
    Lazy::new(|| vec![accounts(), projects(), jobs(), runs()]);

/// All built-in entity descriptors, in extraction order
pub fn builtin() -> &'static [EntityDescriptor] {
    &BUILTIN_ENTITIES
}

/// Find a built-in entity by name
pub fn find(name: &str) -> Option<&'static EntityDescriptor> {
    BUILTIN_ENTITIES.iter().find(|e| e.name == name)
}

fn accounts() -> EntityDescriptor {
    EntityDescriptor::new("accounts", "/accounts/{account_id}").with_schema(Schema::from_fields([
        ("id", FieldType::Integer),
        ("name", FieldType::String),
        ("state", FieldType::Integer),
        ("plan", FieldType::String),
        ("pending_cancel", FieldType::Boolean),
        ("run_slots", FieldType::Integer),
        ("developer_seats", FieldType::Integer),
        ("read_only_seats", FieldType::Integer),
        ("queue_limit", FieldType::Integer),
        ("pod_memory_request_mebibytes", FieldType::Number),
        ("docs_job_id", FieldType::Integer),
        ("freshness_job_id", FieldType::Integer),
        ("docs_job", FieldType::Integer),
        ("freshness_job", FieldType::Integer),
        ("lock_reason", FieldType::String),
        ("locked", FieldType::Boolean),
        ("unlock_if_subscription_renewed", FieldType::Boolean),
        ("unlocked_at", FieldType::DateTime),
        ("enterprise_authentication_method", FieldType::String),
        ("enterprise_login_slug", FieldType::String),
        ("enterprise_login_url", FieldType::String),
        ("enterprise_unique_identifier", FieldType::String),
        ("billing_email_address", FieldType::String),
        ("develop_file_system", FieldType::Boolean),
        ("starter_repo_url", FieldType::String),
        ("sso_reauth", FieldType::Boolean),
        ("created_at", FieldType::DateTime),
        ("updated_at", FieldType::DateTime),
    ]))
}

fn projects() -> EntityDescriptor {
    EntityDescriptor::new("projects", "/accounts/{account_id}/projects").with_schema(
        Schema::from_fields([
            ("id", FieldType::Integer),
            ("account_id", FieldType::Integer),
            ("name", FieldType::String),
            ("connection", FieldType::Object),
            ("connection_id", FieldType::Integer),
            ("repository", FieldType::Object),
            ("repository_id", FieldType::Integer),
            ("dbt_project_subdirectory", FieldType::String),
            ("state", FieldType::Integer),
            ("skipped_setup", FieldType::Boolean),
            ("group_permissions", FieldType::Array),
            ("docs_job_id", FieldType::Integer),
            ("freshness_job_id", FieldType::Integer),
            ("docs_job", FieldType::Object),
            ("freshness_job", FieldType::Object),
            ("created_at", FieldType::DateTime),
            ("updated_at", FieldType::DateTime),
        ]),
    )
}

fn jobs() -> EntityDescriptor {
    EntityDescriptor::new("jobs", "/accounts/{account_id}/jobs")
        .with_param("order_by", "updated_at")
        .with_schema(Schema::from_fields([
            ("id", FieldType::Integer),
            ("account_id", FieldType::Integer),
            ("project_id", FieldType::Integer),
            ("environment_id", FieldType::Integer),
            ("name", FieldType::String),
            ("dbt_version", FieldType::String),
            ("triggers", FieldType::Object),
            ("execute_steps", FieldType::Array),
            ("settings", FieldType::Object),
            ("state", FieldType::Integer),
            ("generate_docs", FieldType::Boolean),
            ("generate_sources", FieldType::Boolean),
            ("schedule", FieldType::Object),
            ("execution", FieldType::Object),
            ("deferring_job_definition_id", FieldType::Integer),
            ("is_deferrable", FieldType::Boolean),
            ("lifecycle_webhooks", FieldType::Boolean),
            ("lifecycle_webhooks_url", FieldType::String),
            ("cron_humanized", FieldType::String),
            ("next_run", FieldType::DateTime),
            ("next_run_humanized", FieldType::String),
            ("created_at", FieldType::DateTime),
            ("updated_at", FieldType::DateTime),
        ]))
}

fn runs() -> EntityDescriptor {
    EntityDescriptor::new("runs", "/accounts/{account_id}/runs")
        .with_page_size(100)
        .with_pagination(Pagination::offset_limit(100))
        .with_param("order_by", "finished_at")
        .with_schema(Schema::from_fields([
            ("id", FieldType::Integer),
            ("trigger_id", FieldType::Integer),
            ("account_id", FieldType::Integer),
            ("project_id", FieldType::Integer),
            ("environment_id", FieldType::Integer),
            ("job_definition_id", FieldType::Integer),
            ("job_id", FieldType::Integer),
            ("deferring_run_id", FieldType::Integer),
            ("status", FieldType::Integer),
            ("status_message", FieldType::String),
            ("status_humanized", FieldType::String),
            ("git_branch", FieldType::String),
            ("git_sha", FieldType::String),
            ("dbt_version", FieldType::String),
            ("environment", FieldType::String),
            ("owner_thread_id", FieldType::String),
            ("executed_by_thread_id", FieldType::String),
            ("artifacts_saved", FieldType::Boolean),
            ("artifacts_s3_path", FieldType::String),
            ("artifact_s3_path", FieldType::String),
            ("has_docs_generated", FieldType::Boolean),
            ("has_sources_generated", FieldType::Boolean),
            ("notifications_sent", FieldType::Boolean),
            ("blocked_by", FieldType::Array),
            ("scribe_enabled", FieldType::Boolean),
            ("trigger", FieldType::Object),
            ("job", FieldType::Object),
            ("run_steps", FieldType::Array),
            ("duration", FieldType::String),
            ("queued_duration", FieldType::String),
            ("run_duration", FieldType::String),
            ("duration_humanized", FieldType::String),
            ("queued_duration_humanized", FieldType::String),
            ("run_duration_humanized", FieldType::String),
            ("created_at_humanized", FieldType::String),
            ("finished_at_humanized", FieldType::String),
            ("in_progress", FieldType::Boolean),
            ("is_complete", FieldType::Boolean),
            ("is_success", FieldType::Boolean),
            ("is_error", FieldType::Boolean),
            ("is_cancelled", FieldType::Boolean),
            ("href", FieldType::String),
            ("created_at", FieldType::DateTime),
            ("updated_at", FieldType::DateTime),
            ("dequeued_at", FieldType::DateTime),
            ("should_start_at", FieldType::DateTime),
            ("started_at", FieldType::DateTime),
            ("finished_at", FieldType::DateTime),
            ("last_checked_at", FieldType::DateTime),
            ("last_heartbeat_at", FieldType::DateTime),
        ]))
}
