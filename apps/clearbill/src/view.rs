//! Plain-text rendering of the conversation log and history list.

use std::sync::Arc;

use client_core::{
    refresh_for, ConversationEvent, DocumentView, HistoryEntryView, SessionEvent,
    SessionSnapshot, ViewRefresh,
};
use shared::domain::{DocumentRecord, Origin};

pub fn render_event(event: &ConversationEvent) -> String {
    let who = match event.origin() {
        Origin::User => "you",
        Origin::System => "clearbill",
    };
    let mut out = format!(
        "[{}] {who}: {}\n",
        event.created_at().format("%H:%M"),
        event.content()
    );
    if let Some(record) = event.attachment() {
        let card = DocumentView::from_record(record).to_string();
        for line in card.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

pub fn render_transcript(events: &[ConversationEvent]) -> String {
    if events.is_empty() {
        return "(no messages yet)\n".to_string();
    }
    events.iter().map(render_event).collect()
}

pub fn render_history(
    history: &[Arc<DocumentRecord>],
    selected: Option<&Arc<DocumentRecord>>,
) -> String {
    if history.is_empty() {
        return "(no documents yet)\n".to_string();
    }
    let mut out = String::new();
    for (index, record) in history.iter().enumerate() {
        let is_selected = selected.is_some_and(|s| s.id == record.id);
        let entry = HistoryEntryView::from_record(record, is_selected);
        let marker = if entry.selected { '*' } else { ' ' };
        out.push_str(&format!(
            "{marker} [{index}] {} ({})",
            entry.filename, entry.subtitle
        ));
        if entry.duplicate {
            out.push_str(" [duplicate]");
        }
        out.push('\n');
    }
    out
}

/// Follows session notifications and prints only what the user has not seen.
/// Notifications can arrive after the log they describe was replaced, so the
/// printer trusts the snapshot's log generation over the notification kind.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: usize,
    log_generation: u64,
}

impl TranscriptPrinter {
    pub fn apply(&mut self, event: &SessionEvent, snapshot: &SessionSnapshot) -> String {
        match refresh_for(event) {
            ViewRefresh::ScrollToLatest => self.catch_up(snapshot),
            ViewRefresh::ShowSpinner(true) => "... processing\n".to_string(),
            ViewRefresh::ShowSpinner(false) | ViewRefresh::Redraw => String::new(),
        }
    }

    /// Renders every event past the last one printed, starting over when the
    /// log was replaced since the previous call.
    pub fn catch_up(&mut self, snapshot: &SessionSnapshot) -> String {
        let mut out = String::new();
        if snapshot.log_generation != self.log_generation {
            self.log_generation = snapshot.log_generation;
            self.printed = 0;
            if snapshot.selected.is_some() {
                out.push_str("-- history view --\n");
            }
        }
        let start = self.printed.min(snapshot.events.len());
        out.extend(snapshot.events[start..].iter().map(render_event));
        self.printed = snapshot.events.len();
        out
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
