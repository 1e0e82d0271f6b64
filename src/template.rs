//! Path template interpolation
//!
//! Handles `{param}` interpolation in entity path templates, e.g.
//! `/accounts/{account_id}/runs`. Parameters come from an explicit map; an
//! unresolved parameter is an error so bad templates fail at startup
//! validation, not mid-extraction.

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching path parameters: {param_name}
static PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").unwrap());

/// Render a path template with the given parameters
pub fn render(template: &str, params: &StringMap) -> Result<String> {
    let mut result = template.to_string();
    let mut missing = Vec::new();

    for cap in PARAM_REGEX.captures_iter(template) {
        let full_match = cap.get(0).unwrap().as_str();
        let name = cap.get(1).unwrap().as_str();

        match params.get(name) {
            Some(value) => {
                result = result.replace(full_match, value);
            }
            None => {
                missing.push(name.to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_parameter(missing.join(", ")))
    }
}

/// List the parameter names a template requires
pub fn required_params(template: &str) -> Vec<String> {
    PARAM_REGEX
        .captures_iter(template)
        .map(|cap| cap.get(1).unwrap().as_str().to_string())
        .collect()
}
