use chrono::Utc;
use shared::domain::DocumentId;

use super::*;

fn record(id: i64) -> Arc<DocumentRecord> {
    Arc::new(DocumentRecord {
        id: DocumentId(id),
        original_filename: format!("doc-{id}.png"),
        file_type: "image".to_string(),
        created_at: Utc::now(),
        is_duplicate: false,
        extracted_text: None,
        audit_result: None,
        file_hash: None,
        file_url: None,
    })
}

#[tokio::test]
async fn append_notifies_subscribers_with_log_growth() {
    let session = Session::new();
    let mut rx = session.subscribe_events();

    let id = session.append("Uploading a.png...", Origin::User, None).await;

    assert_eq!(
        rx.recv().await.expect("event"),
        SessionEvent::EventAppended { id, log_len: 1 }
    );
}

#[tokio::test]
async fn history_selection_emits_log_replaced() {
    let session = Session::new();
    session.add_to_history(record(1)).await;
    session.add_to_history(record(2)).await;
    let mut rx = session.subscribe_events();

    let selected = session.select_history_index(1).await.expect("selected");
    assert_eq!(selected.id, DocumentId(1));
    assert_eq!(
        rx.recv().await.expect("event"),
        SessionEvent::LogReplaced { log_len: 2 }
    );

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.events.len(), 2);
    assert_eq!(snapshot.selected.map(|r| r.id), Some(DocumentId(1)));
    assert_eq!(snapshot.history.len(), 2);
}

#[tokio::test]
async fn missing_history_index_emits_nothing() {
    let session = Session::new();
    let mut rx = session.subscribe_events();

    assert!(session.select_history_index(0).await.is_none());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn loading_guard_clears_flag_on_drop() {
    let session = Session::new();
    let mut rx = session.subscribe_events();

    {
        let _guard = session.begin_loading();
        assert!(session.is_loading());
    }

    assert!(!session.is_loading());
    assert_eq!(rx.recv().await.expect("event"), SessionEvent::LoadingChanged(true));
    assert_eq!(rx.recv().await.expect("event"), SessionEvent::LoadingChanged(false));
}

#[tokio::test]
async fn reset_clears_everything() {
    let session = Session::new();
    session.append("hello", Origin::User, None).await;
    session.add_to_history(record(1)).await;
    session.reset().await;

    let snapshot = session.snapshot().await;
    assert!(snapshot.events.is_empty());
    assert!(snapshot.history.is_empty());
    assert!(snapshot.selected.is_none());
}
