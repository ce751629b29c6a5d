use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{lenient_optional_timestamp, null_as_default, DocumentRecord, Severity};

/// Envelope returned by `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub data: Option<DocumentRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPolicy {
    pub id: i64,
    pub rule_name: String,
    pub rule_type: String,
    pub field_name: String,
    pub condition: String,
    #[serde(default)]
    pub expected_value: Option<String>,
    #[serde(default)]
    pub severity: Severity,
    pub is_active: bool,
    #[serde(
        default,
        deserialize_with = "lenient_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
