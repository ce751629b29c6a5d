//! Session-scoped state shared between the upload controller and the view.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::domain::{DocumentRecord, EventId, Origin};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use crate::store::{ConversationEvent, ConversationStore};

/// Change notifications for whoever renders the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    EventAppended { id: EventId, log_len: usize },
    LogReplaced { log_len: usize },
    HistoryUpdated { history_len: usize },
    LoadingChanged(bool),
    Reset,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub events: Vec<ConversationEvent>,
    pub history: Vec<Arc<DocumentRecord>>,
    pub selected: Option<Arc<DocumentRecord>>,
    pub log_generation: u64,
    pub loading: bool,
}

pub struct Session {
    inner: Mutex<ConversationStore>,
    loading: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            inner: Mutex::new(ConversationStore::new()),
            loading: AtomicBool::new(false),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn append(
        &self,
        content: impl Into<String>,
        origin: Origin,
        attachment: Option<Arc<DocumentRecord>>,
    ) -> EventId {
        let (id, log_len) = {
            let mut store = self.inner.lock().await;
            let id = store.append(content, origin, attachment);
            (id, store.events().len())
        };
        self.emit(SessionEvent::EventAppended { id, log_len });
        id
    }

    pub async fn add_to_history(&self, record: Arc<DocumentRecord>) {
        let history_len = {
            let mut store = self.inner.lock().await;
            store.add_to_history(record);
            store.history().len()
        };
        self.emit(SessionEvent::HistoryUpdated { history_len });
    }

    pub async fn select_history_entry(&self, record: Arc<DocumentRecord>) {
        let log_len = {
            let mut store = self.inner.lock().await;
            store.select_history_entry(record);
            store.events().len()
        };
        self.emit(SessionEvent::LogReplaced { log_len });
    }

    pub async fn select_history_index(&self, index: usize) -> Option<Arc<DocumentRecord>> {
        let (selected, log_len) = {
            let mut store = self.inner.lock().await;
            let selected = store.select_history_index(index)?;
            (selected, store.events().len())
        };
        self.emit(SessionEvent::LogReplaced { log_len });
        Some(selected)
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
        self.emit(SessionEvent::Reset);
    }

    pub async fn events(&self) -> Vec<ConversationEvent> {
        self.inner.lock().await.events().to_vec()
    }

    pub async fn latest_event(&self) -> Option<ConversationEvent> {
        self.inner.lock().await.latest().cloned()
    }

    pub async fn history(&self) -> Vec<Arc<DocumentRecord>> {
        self.inner.lock().await.history().to_vec()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let store = self.inner.lock().await;
        SessionSnapshot {
            events: store.events().to_vec(),
            history: store.history().to_vec(),
            selected: store.selected().cloned(),
            log_generation: store.log_generation(),
            loading: self.is_loading(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Marks the session as loading until the returned guard is dropped.
    pub fn begin_loading(self: &Arc<Self>) -> LoadingGuard {
        self.set_loading(true);
        LoadingGuard {
            session: Arc::clone(self),
        }
    }

    fn set_loading(&self, loading: bool) {
        let previous = self.loading.swap(loading, Ordering::SeqCst);
        if previous != loading {
            debug!(loading, "session: loading state changed");
            self.emit(SessionEvent::LoadingChanged(loading));
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the view may not be attached yet.
        let _ = self.events.send(event);
    }
}

/// Clears the loading flag on drop, including when the owning future is
/// cancelled or unwinds.
pub struct LoadingGuard {
    session: Arc<Session>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.session.set_loading(false);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
