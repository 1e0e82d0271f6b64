// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # dbt Cloud Connector
//!
//! A Rust-native connector that extracts entities from the dbt Cloud
//! Administrative API and emits them as schema-conformant, record-oriented
//! NDJSON with resumable state.
//!
//! ## Features
//!
//! - **Paginated extraction**: offset-limit and cursor pagination with an
//!   opaque resume token per entity
//! - **Resumable state**: a checkpoint after every page bounds re-extraction
//!   after a crash to at most one page
//! - **Schema conformance**: root-only truncation keeps declared top-level
//!   fields and passes nested structures through untyped
//! - **Retry & rate limiting**: exponential backoff for transient failures,
//!   token bucket rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dbtcloud_connector::{catalog, Credentials, ExtractionEngine};
//!
//! #[tokio::main]
//! async fn main() -> dbtcloud_connector::Result<()> {
//!     let config = ConnectorConfig::from_file("config.json")?;
//!     let client = HttpClient::with_credentials(
//!         HttpClientConfig::builder().base_url(&config.api_url).build(),
//!         Credentials::bearer(&config.auth_token),
//!     );
//!     let engine = ExtractionEngine::new(/* client, state, sink, params */);
//!     let summary = engine.extract_all(catalog::builtin()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Extraction Engine                        │
//! │     fetch → project → emit → checkpoint, per entity          │
//! └──────────────────────────────────────────────────────────────┘
//!         │            │               │              │
//! ┌───────┴───┬────────┴─────┬─────────┴────┬─────────┴────────┐
//! │   Auth    │    HTTP      │   Paginate   │      State       │
//! ├───────────┼──────────────┼──────────────┼──────────────────┤
//! │ Bearer    │ GET          │ Offset-limit │ Per-entity token │
//! │           │ Retry        │ Cursor       │ Atomic writes    │
//! │           │ Rate limit   │ Unpaginated  │ Resume on start  │
//! └───────────┴──────────────┴──────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential provider
pub mod auth;

/// Connector configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Record projection
pub mod projector;

/// State management and checkpointing
pub mod state;

/// Record sinks
pub mod sink;

/// Main extraction engine
pub mod engine;

/// Entity catalog
pub mod catalog;

/// Path template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::Credentials;
pub use catalog::{EntityDescriptor, Schema};
pub use config::ConnectorConfig;
pub use engine::{EntityStats, ExtractionEngine, RunSummary};
pub use error::{Error, Result};
pub use pagination::{PageToken, Pagination};
pub use projector::{Projector, RecordHook, RecordPath};
pub use sink::{MemorySink, NdjsonSink, Sink};
pub use state::StateStore;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
