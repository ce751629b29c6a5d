//! HTTP transport to the audit backend.

use std::{path::Path, time::Duration};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use shared::{
    domain::{DocumentId, DocumentRecord},
    error::ApiErrorBody,
    protocol::{AuditPolicy, HealthResponse, UploadResponse},
};
use tracing::{debug, info};
use url::Url;

use crate::error::UploadError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "gif", "bmp", "tiff"];

/// A single file handed to the backend as the whole multipart payload.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    /// Builds an upload from a file name, guessing the content type from its
    /// extension.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub fn has_accepted_extension(&self) -> bool {
        is_accepted_extension(Path::new(&self.filename))
    }
}

pub fn is_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[async_trait]
pub trait AuditBackend: Send + Sync {
    /// Issues exactly one submission request. No retries.
    async fn submit_document(&self, upload: DocumentUpload)
        -> Result<DocumentRecord, UploadError>;
}

pub struct HttpAuditBackend {
    http: Client,
    base_url: String,
}

impl HttpAuditBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    pub async fn fetch_document(&self, document_id: DocumentId) -> Result<DocumentRecord> {
        let response = self
            .http
            .get(format!("{}/document/{}", self.base_url, document_id.0))
            .send()
            .await
            .with_context(|| format!("failed to request document {}", document_id.0))?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("invalid document payload for {}", document_id.0))
    }

    pub async fn audit_policies(&self) -> Result<Vec<AuditPolicy>> {
        let response = self
            .http
            .get(format!("{}/audit-policies", self.base_url))
            .send()
            .await
            .context("failed to request audit policies")?;
        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .context("invalid audit policy payload")
    }
}

#[async_trait]
impl AuditBackend for HttpAuditBackend {
    async fn submit_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<DocumentRecord, UploadError> {
        let content_type = upload
            .content_type
            .as_deref()
            .filter(|ct| ct.parse::<mime_guess::mime::Mime>().is_ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        debug!(
            filename = %upload.filename,
            content_type = %content_type,
            size_bytes = upload.bytes.len(),
            "upload: sending multipart request"
        );
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&content_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let detail = ApiErrorBody::parse(&body).detail_message();
            info!(
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "upload: backend rejected document"
            );
            return Err(UploadError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let envelope: UploadResponse = response
            .json()
            .await
            .map_err(|err| UploadError::MalformedResponse(err.to_string()))?;
        envelope.data.ok_or_else(|| {
            UploadError::MalformedResponse(format!(
                "success response without document data: {}",
                envelope.message
            ))
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid API base URL '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "unsupported API base URL scheme '{}'",
            parsed.scheme()
        ));
    }
    Ok(trimmed.to_string())
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.bytes().await.unwrap_or_default();
    let detail = ApiErrorBody::parse(&body)
        .detail_message()
        .unwrap_or_else(|| status.to_string());
    Err(anyhow!("backend returned {}: {detail}", status.as_u16()))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
