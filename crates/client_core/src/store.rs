//! Conversation log and document history for one session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::domain::{DocumentRecord, EventId, Origin};

pub const VIEWING_FROM_HISTORY_PREFIX: &str = "Viewing";
pub const LOADED_FROM_HISTORY_MESSAGE: &str = "Document loaded from history";

/// One entry of the conversation log. Fields are only readable once the event
/// has been appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEvent {
    id: EventId,
    content: String,
    origin: Origin,
    created_at: DateTime<Utc>,
    attachment: Option<Arc<DocumentRecord>>,
}

impl ConversationEvent {
    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn attachment(&self) -> Option<&Arc<DocumentRecord>> {
        self.attachment.as_ref()
    }
}

#[derive(Debug)]
pub struct ConversationStore {
    log: Vec<ConversationEvent>,
    history: Vec<Arc<DocumentRecord>>,
    selected: Option<Arc<DocumentRecord>>,
    next_event_id: i64,
    // Bumped whenever the log is replaced rather than appended to.
    log_generation: u64,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            history: Vec::new(),
            selected: None,
            next_event_id: 1,
            log_generation: 0,
        }
    }

    pub fn append(
        &mut self,
        content: impl Into<String>,
        origin: Origin,
        attachment: Option<Arc<DocumentRecord>>,
    ) -> EventId {
        let event = self.new_event(content.into(), origin, attachment);
        let id = event.id;
        self.log.push(event);
        id
    }

    /// Newest first. Duplicates are kept; the backend flags them instead.
    pub fn add_to_history(&mut self, record: Arc<DocumentRecord>) {
        self.history.insert(0, record);
    }

    /// Replaces the visible log with a two-event view of `record`.
    pub fn select_history_entry(&mut self, record: Arc<DocumentRecord>) {
        let viewing = self.new_event(
            format!(
                "{VIEWING_FROM_HISTORY_PREFIX} {}",
                record.original_filename
            ),
            Origin::User,
            None,
        );
        let loaded = self.new_event(
            LOADED_FROM_HISTORY_MESSAGE.to_string(),
            Origin::System,
            Some(Arc::clone(&record)),
        );
        self.log = vec![viewing, loaded];
        self.log_generation += 1;
        self.selected = Some(record);
    }

    pub fn select_history_index(&mut self, index: usize) -> Option<Arc<DocumentRecord>> {
        let record = self.history.get(index).cloned()?;
        self.select_history_entry(Arc::clone(&record));
        Some(record)
    }

    pub fn events(&self) -> &[ConversationEvent] {
        &self.log
    }

    pub fn latest(&self) -> Option<&ConversationEvent> {
        self.log.last()
    }

    pub fn history(&self) -> &[Arc<DocumentRecord>] {
        &self.history
    }

    pub fn selected(&self) -> Option<&Arc<DocumentRecord>> {
        self.selected.as_ref()
    }

    /// Changes only when the log is replaced or cleared, so two equal values
    /// mean one log is a prefix of the other.
    pub fn log_generation(&self) -> u64 {
        self.log_generation
    }

    pub fn is_selected(&self, record: &DocumentRecord) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.id == record.id)
    }

    /// Clears log, history and selection. Event ids keep counting so they stay
    /// unique for the whole session.
    pub fn reset(&mut self) {
        self.log.clear();
        self.log_generation += 1;
        self.history.clear();
        self.selected = None;
    }

    fn new_event(
        &mut self,
        content: String,
        origin: Origin,
        attachment: Option<Arc<DocumentRecord>>,
    ) -> ConversationEvent {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        ConversationEvent {
            id,
            content,
            origin,
            created_at: Utc::now(),
            attachment,
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
