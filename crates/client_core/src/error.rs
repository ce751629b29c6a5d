use shared::error::is_policy_violation;
use thiserror::Error;

pub const UPLOAD_FAILED_FALLBACK: &str = "Upload failed";
pub const REQUIRED_FIELDS_GUIDANCE: &str = "Please ensure your document contains: Invoice Number, Amount, Date, and Vendor Name with valid formatting.";

/// Failure of a single round trip to the audit backend.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("backend responded with status {status}: {}", .detail.as_deref().unwrap_or("<no detail>"))]
    Status { status: u16, detail: Option<String> },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    pub fn classify(&self) -> UploadFailure {
        match self {
            UploadError::Status { status, detail }
                if is_policy_violation(*status, detail.as_deref()) =>
            {
                UploadFailure::PolicyViolation {
                    detail: detail.clone().unwrap_or_default(),
                }
            }
            UploadError::Status { detail, .. } => UploadFailure::Generic {
                detail: detail.clone(),
            },
            UploadError::Transport(_) | UploadError::MalformedResponse(_) => {
                UploadFailure::Generic { detail: None }
            }
        }
    }
}

/// User-facing classification of a failed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    PolicyViolation { detail: String },
    Generic { detail: Option<String> },
}

impl UploadFailure {
    /// System messages appended to the conversation for this failure, in order.
    pub fn conversation_messages(&self) -> Vec<String> {
        match self {
            UploadFailure::PolicyViolation { detail } => vec![
                format!("Upload Rejected: {detail}"),
                REQUIRED_FIELDS_GUIDANCE.to_string(),
            ],
            UploadFailure::Generic { detail } => vec![format!(
                "Error: {}",
                detail.as_deref().unwrap_or(UPLOAD_FAILED_FALLBACK)
            )],
        }
    }

    pub fn is_policy_violation(&self) -> bool {
        matches!(self, UploadFailure::PolicyViolation { .. })
    }
}
