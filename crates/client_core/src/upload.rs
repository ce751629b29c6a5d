//! Submission lifecycle for a single document: pending, then processed or failed.

use std::sync::Arc;

use shared::domain::{DocumentRecord, Origin};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    error::UploadFailure,
    session::Session,
    transport::{AuditBackend, DocumentUpload},
};

pub const PROCESSED_MESSAGE: &str = "Document processed successfully!";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Processed(Arc<DocumentRecord>),
    Failed(UploadFailure),
}

impl UploadOutcome {
    pub fn record(&self) -> Option<&Arc<DocumentRecord>> {
        match self {
            UploadOutcome::Processed(record) => Some(record),
            UploadOutcome::Failed(_) => None,
        }
    }
}

pub struct UploadController {
    backend: Arc<dyn AuditBackend>,
    session: Arc<Session>,
    // Single FIFO slot: a submission waits for the previous one to finish so
    // result events land in request order.
    submission_slot: Mutex<()>,
}

impl UploadController {
    pub fn new(backend: Arc<dyn AuditBackend>, session: Arc<Session>) -> Arc<Self> {
        Arc::new(Self {
            backend,
            session,
            submission_slot: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn submit(&self, upload: DocumentUpload) -> UploadOutcome {
        let _slot = self.submission_slot.lock().await;
        let _loading = self.session.begin_loading();

        let filename = upload.filename.clone();
        if !upload.has_accepted_extension() {
            warn!(filename = %filename, "upload: file extension is not in the accepted list");
        }
        self.session
            .append(format!("Uploading {filename}..."), Origin::User, None)
            .await;

        match self.backend.submit_document(upload).await {
            Ok(record) => {
                let record = Arc::new(record);
                info!(
                    filename = %filename,
                    document_id = record.id.0,
                    is_duplicate = record.is_duplicate,
                    "upload: document processed"
                );
                self.session
                    .append(PROCESSED_MESSAGE, Origin::System, Some(Arc::clone(&record)))
                    .await;
                self.session.add_to_history(Arc::clone(&record)).await;
                UploadOutcome::Processed(record)
            }
            Err(err) => {
                let failure = err.classify();
                warn!(
                    filename = %filename,
                    error = %err,
                    policy_violation = failure.is_policy_violation(),
                    "upload: submission failed"
                );
                for message in failure.conversation_messages() {
                    self.session.append(message, Origin::System, None).await;
                }
                UploadOutcome::Failed(failure)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
