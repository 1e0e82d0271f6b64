//! Record projection
//!
//! Turns a raw response body into schema-conformant records: locate the
//! record array with a typed path accessor, truncate each element to the
//! declared top-level fields (root-only conformance), and run an optional
//! per-record hook that may transform or drop records.

use crate::catalog::Schema;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Serialize, Serializer};
use std::sync::Arc;

// ============================================================================
// Record Path
// ============================================================================

/// Typed accessor describing "the record array at this location".
///
/// Parsed and validated when the catalog is built, not resolved ad hoc per
/// call. Accepts `$.data[*]`, `data`, or nested forms like `$.result.items[*]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPath {
    segments: Vec<String>,
}

impl RecordPath {
    /// Build a path from known-good segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a path expression
    pub fn parse(expr: &str) -> Result<Self> {
        let mut trimmed = expr.strip_prefix("$.").unwrap_or(expr);
        trimmed = trimmed.strip_suffix("[*]").unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Err(Error::InvalidRecordPath {
                expr: expr.to_string(),
                message: "empty path".to_string(),
            });
        }

        let segments: Vec<String> = trimmed.split('.').map(ToString::to_string).collect();
        for segment in &segments {
            let valid = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(Error::InvalidRecordPath {
                    expr: expr.to_string(),
                    message: format!("invalid segment '{segment}'"),
                });
            }
        }

        Ok(Self { segments })
    }

    /// Extract the record array from a response body.
    ///
    /// A lone object at the path is wrapped as a single-record page
    /// (singleton endpoints). A missing location or a scalar is a
    /// `MalformedResponse`.
    pub fn extract(&self, body: &JsonValue) -> Result<Vec<JsonValue>> {
        let mut current = body;
        for segment in &self.segments {
            current = current
                .as_object()
                .and_then(|map| map.get(segment))
                .ok_or_else(|| {
                    Error::malformed(self.to_string(), format!("missing key '{segment}'"))
                })?;
        }

        match current {
            JsonValue::Array(items) => Ok(items.clone()),
            JsonValue::Object(_) => Ok(vec![current.clone()]),
            other => Err(Error::malformed(
                self.to_string(),
                format!("expected array or object, found {}", type_name(other)),
            )),
        }
    }
}

impl std::fmt::Display for RecordPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$.{}[*]", self.segments.join("."))
    }
}

impl Serialize for RecordPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// Record Hook
// ============================================================================

/// Per-record transform/filter applied after conformance truncation.
///
/// Returning `None` drops the record silently; dropping is filtering, not
/// failure.
#[derive(Clone)]
pub struct RecordHook(Arc<dyn Fn(JsonObject) -> Option<JsonObject> + Send + Sync>);

impl RecordHook {
    /// Wrap a transform/filter function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(JsonObject) -> Option<JsonObject> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the hook to a record
    pub fn apply(&self, record: JsonObject) -> Option<JsonObject> {
        (self.0)(record)
    }
}

impl std::fmt::Debug for RecordHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordHook").finish_non_exhaustive()
    }
}

// ============================================================================
// Projector
// ============================================================================

/// A page of projected records.
///
/// `raw_count` is the record-array length before the hook filtered anything;
/// pagination advance is driven by the raw count, not the emitted count.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    /// Schema-conformant records, post-hook
    pub records: Vec<JsonObject>,
    /// Record-array length before hook filtering
    pub raw_count: usize,
}

/// Projects raw response bodies into schema-conformant records
#[derive(Debug, Clone)]
pub struct Projector {
    record_path: RecordPath,
    schema: Schema,
    hook: Option<RecordHook>,
}

impl Projector {
    /// Create a projector for a record path and schema
    pub fn new(record_path: RecordPath, schema: Schema) -> Self {
        Self {
            record_path,
            schema,
            hook: None,
        }
    }

    /// Attach a per-record hook
    #[must_use]
    pub fn with_hook(mut self, hook: RecordHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Project a response body into records
    pub fn project(&self, body: &JsonValue) -> Result<Projection> {
        let raw = self.record_path.extract(body)?;
        let raw_count = raw.len();

        let mut records = Vec::with_capacity(raw_count);
        for element in raw {
            let JsonValue::Object(object) = element else {
                return Err(Error::malformed(
                    self.record_path.to_string(),
                    "record element is not an object".to_string(),
                ));
            };

            let conformed = self.conform(object);
            let emitted = match &self.hook {
                Some(hook) => hook.apply(conformed),
                None => Some(conformed),
            };
            if let Some(record) = emitted {
                records.push(record);
            }
        }

        Ok(Projection { records, raw_count })
    }

    /// Root-only conformance truncation: keep declared top-level fields,
    /// drop unknown ones, leave missing fields absent. Nested objects and
    /// arrays pass through opaquely.
    fn conform(&self, object: JsonObject) -> JsonObject {
        object
            .into_iter()
            .filter(|(key, _)| self.schema.contains(key))
            .collect()
    }
}
