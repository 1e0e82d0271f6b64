//! Error types for the connector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    /// Network failure, timeout, 5xx, or rate-limit response that survived
    /// the bounded retry budget.
    #[error("Transient fetch failure after {attempts} attempts: {message}")]
    TransientFetch { message: String, attempts: u32 },

    /// A 4xx other than 429. Never retried.
    #[error("Request rejected with HTTP {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    /// Response body missing the expected record array location.
    #[error("Malformed response at '{path}': {message}")]
    MalformedResponse { path: String, message: String },

    #[error("Invalid record path expression '{expr}': {message}")]
    InvalidRecordPath { expr: String, message: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    /// State store write failure. Fatal for the entity being extracted: the
    /// engine never advances past an unpersisted checkpoint.
    #[error("State persistence error: {message}")]
    Persistence { message: String },

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Entity '{entity}' not found in catalog")]
    EntityNotFound { entity: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined parameter in path template: {parameter}")]
    UndefinedParameter { parameter: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a transient fetch error
    pub fn transient(message: impl Into<String>, attempts: u32) -> Self {
        Self::TransientFetch {
            message: message.into(),
            attempts,
        }
    }

    /// Create a request rejection error
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::RequestRejected {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create an entity-not-found error
    pub fn entity_not_found(entity: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined parameter error
    pub fn undefined_parameter(parameter: impl Into<String>) -> Self {
        Self::UndefinedParameter {
            parameter: parameter.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::TransientFetch { .. } => true,
            Error::RequestRejected { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Number of fetch attempts recorded in this error, if any
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::TransientFetch { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
