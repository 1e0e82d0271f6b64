//! Pagination strategies
//!
//! One tagged variant per pagination pattern, selected per entity. A
//! strategy contributes query parameters for the page identified by a token
//! and computes the token for the page after it.

use crate::types::{JsonValue, StringMap};
use serde::{Deserialize, Serialize};

/// Opaque resume marker passed between page requests.
///
/// An absent token (`Option::None`) means "start from the beginning" when
/// used as an input and "no more pages" when produced as an output; callers
/// distinguish the two by loop position, never by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PageToken {
    /// Record offset for offset-limit pagination
    Offset(u64),
    /// Cursor string for cursor pagination
    Cursor(String),
}

impl PageToken {
    /// Offset value, if this is an offset token
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Offset(n) => Some(*n),
            Self::Cursor(_) => None,
        }
    }
}

impl std::fmt::Display for PageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offset(n) => write!(f, "{n}"),
            Self::Cursor(c) => write!(f, "{c}"),
        }
    }
}

/// Pagination policy for an entity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Pagination {
    /// Single request; every response is the final page
    #[default]
    None,

    /// Offset-limit pagination. Advances `previous (default 0) + page_size`
    /// while pages are non-empty; the empty page is the completion signal,
    /// so one request past the true end is expected. A page shorter than
    /// `page_size` but non-empty still fetches one more page.
    OffsetLimit {
        /// Query parameter name for offset
        offset_param: String,
        /// Query parameter name for limit
        limit_param: String,
        /// Number of records per page
        page_size: u32,
    },

    /// Cursor pagination. The next cursor is read from the response body;
    /// an absent or empty cursor ends pagination.
    Cursor {
        /// Query parameter name for cursor
        cursor_param: String,
        /// Dot path to the cursor in the response body
        cursor_path: String,
    },
}

impl Pagination {
    /// Create offset-limit pagination with the conventional parameter names
    pub fn offset_limit(page_size: u32) -> Self {
        Self::OffsetLimit {
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
            page_size,
        }
    }

    /// Create cursor pagination
    pub fn cursor(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self::Cursor {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
        }
    }

    /// Query parameters for the page identified by `token`.
    ///
    /// An absent token requests the first page.
    pub fn request_params(&self, token: Option<&PageToken>) -> StringMap {
        let mut params = StringMap::new();
        match self {
            Self::None => {}
            Self::OffsetLimit {
                offset_param,
                limit_param,
                page_size,
            } => {
                let offset = token.and_then(PageToken::offset).unwrap_or(0);
                params.insert(offset_param.clone(), offset.to_string());
                params.insert(limit_param.clone(), page_size.to_string());
            }
            Self::Cursor { cursor_param, .. } => {
                if let Some(PageToken::Cursor(cursor)) = token {
                    params.insert(cursor_param.clone(), cursor.clone());
                }
            }
        }
        params
    }

    /// Compute the token for the page after the one just fetched, or `None`
    /// when the response was the final page.
    pub fn next_token(
        &self,
        body: &JsonValue,
        records_count: usize,
        previous: Option<&PageToken>,
    ) -> Option<PageToken> {
        match self {
            Self::None => None,
            Self::OffsetLimit { page_size, .. } => {
                if records_count == 0 {
                    return None;
                }
                let offset = previous.and_then(PageToken::offset).unwrap_or(0);
                Some(PageToken::Offset(offset + u64::from(*page_size)))
            }
            Self::Cursor { cursor_path, .. } => {
                let cursor = lookup_path(body, cursor_path)?.as_str()?;
                if cursor.is_empty() {
                    return None;
                }
                Some(PageToken::Cursor(cursor.to_string()))
            }
        }
    }
}

/// Look up a value in a JSON body by dot path
fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
