//! Glue from user actions to session and upload calls.

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    session::{Session, SessionEvent},
    transport::DocumentUpload,
    upload::{UploadController, UploadOutcome},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    FileChosen(PathBuf),
    /// Only the first dropped file is submitted.
    FilesDropped(Vec<PathBuf>),
    HistoryEntryClicked(usize),
}

/// What the view should do after a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRefresh {
    ScrollToLatest,
    Redraw,
    ShowSpinner(bool),
}

pub fn refresh_for(event: &SessionEvent) -> ViewRefresh {
    match event {
        SessionEvent::EventAppended { .. } | SessionEvent::LogReplaced { .. } => {
            ViewRefresh::ScrollToLatest
        }
        SessionEvent::HistoryUpdated { .. } | SessionEvent::Reset => ViewRefresh::Redraw,
        SessionEvent::LoadingChanged(loading) => ViewRefresh::ShowSpinner(*loading),
    }
}

#[derive(Debug)]
pub enum Dispatched {
    UploadStarted(JoinHandle<UploadOutcome>),
    Selected,
    Ignored,
}

pub struct ViewCoordinator {
    session: Arc<Session>,
    uploads: Arc<UploadController>,
}

impl ViewCoordinator {
    pub fn new(uploads: Arc<UploadController>) -> Self {
        Self {
            session: Arc::clone(uploads.session()),
            uploads,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.session.subscribe_events()
    }

    /// Uploads run on their own task so the caller stays responsive while the
    /// backend works.
    pub async fn dispatch(&self, action: UserAction) -> Result<Dispatched> {
        match action {
            UserAction::FileChosen(path) => self.start_upload(path).await,
            UserAction::FilesDropped(paths) => {
                let mut paths = paths.into_iter();
                let Some(first) = paths.next() else {
                    debug!("view: drop without files ignored");
                    return Ok(Dispatched::Ignored);
                };
                let skipped = paths.count();
                if skipped > 0 {
                    debug!(skipped, "view: only the first dropped file is uploaded");
                }
                self.start_upload(first).await
            }
            UserAction::HistoryEntryClicked(index) => {
                match self.session.select_history_index(index).await {
                    Some(_) => Ok(Dispatched::Selected),
                    None => {
                        warn!(index, "view: history entry does not exist");
                        Ok(Dispatched::Ignored)
                    }
                }
            }
        }
    }

    async fn start_upload(&self, path: PathBuf) -> Result<Dispatched> {
        let upload = read_upload(path).await?;
        let uploads = Arc::clone(&self.uploads);
        let handle = tokio::spawn(async move { uploads.submit(upload).await });
        Ok(Dispatched::UploadStarted(handle))
    }
}

pub async fn read_upload(path: PathBuf) -> Result<DocumentUpload> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(DocumentUpload::from_bytes(filename, bytes))
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
