use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Substring the backend puts in a 400 detail when a document fails the
/// required-field checks.
pub const POLICY_VIOLATION_MARKER: &str = "policy violations";

/// Body of a non-2xx backend response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    pub fn parse(raw: &[u8]) -> Self {
        serde_json::from_slice(raw).unwrap_or_default()
    }

    /// String details are returned verbatim; structured details (validation
    /// error lists) are rendered as compact JSON.
    pub fn detail_message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

pub fn is_policy_violation(status: u16, detail: Option<&str>) -> bool {
    status == 400 && detail.is_some_and(|d| d.contains(POLICY_VIOLATION_MARKER))
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
