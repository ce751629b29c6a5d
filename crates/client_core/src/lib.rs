use std::{sync::Arc, time::Duration};

use anyhow::Result;

pub mod coordinator;
pub mod error;
pub mod format;
pub mod render;
pub mod session;
pub mod store;
pub mod transport;
pub mod upload;

pub use coordinator::{refresh_for, Dispatched, UserAction, ViewCoordinator, ViewRefresh};
pub use error::{UploadError, UploadFailure};
pub use format::format_result;
pub use render::{render_audit, AuditRender, DocumentView, HistoryEntryView};
pub use session::{Session, SessionEvent, SessionSnapshot};
pub use store::{ConversationEvent, ConversationStore};
pub use transport::{AuditBackend, DocumentUpload, HttpAuditBackend};
pub use upload::{UploadController, UploadOutcome};

/// One client session against an audit backend: the HTTP transport, the
/// session state and the coordinator that drives it.
pub struct AuditClient {
    backend: Arc<HttpAuditBackend>,
    coordinator: ViewCoordinator,
}

impl AuditClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let backend = Arc::new(HttpAuditBackend::new(base_url, request_timeout)?);
        let session = Session::new();
        let uploads = UploadController::new(backend.clone(), session);
        Ok(Self {
            backend,
            coordinator: ViewCoordinator::new(uploads),
        })
    }

    pub fn backend(&self) -> &HttpAuditBackend {
        &self.backend
    }

    pub fn coordinator(&self) -> &ViewCoordinator {
        &self.coordinator
    }

    pub fn session(&self) -> &Arc<Session> {
        self.coordinator.session()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
