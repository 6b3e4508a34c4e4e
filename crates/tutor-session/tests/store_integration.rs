use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tutor_core::{FileMeta, MessageKind, Sender, TutorError};
use tutor_session::{ReplySource, SessionStore, Snapshot, StoreConfig};
use uuid::Uuid;

const WAIT: Duration = Duration::from_secs(5);

/// Helper: store with a short reply delay and a fixed reply seed.
fn fast_store() -> SessionStore {
    SessionStore::new(StoreConfig {
        reply_delay_ms: 10,
        reply_seed: Some(1),
    })
}

/// Helper: await the first snapshot satisfying `cond`.
async fn wait_for(store: &SessionStore, cond: impl Fn(&Snapshot) -> bool) -> Snapshot {
    let mut rx = store.subscribe();
    tokio::time::timeout(WAIT, async {
        loop {
            let current = rx.borrow_and_update().clone();
            if cond(&current) {
                return current;
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("condition not reached in time")
}

#[tokio::test]
async fn test_send_appends_user_message_then_reply() {
    let store = fast_store();
    assert_eq!(store.snapshot().messages.len(), 1);

    store.send_user_message("hello").await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.messages.len(), 2);
    assert!(snapshot.awaiting_reply);
    assert_eq!(snapshot.messages[1].sender, Sender::User);

    let snapshot = wait_for(&store, |s| s.messages.len() == 3).await;
    assert!(!snapshot.awaiting_reply);
    let last = snapshot.messages.last().unwrap();
    assert_eq!(last.sender, Sender::Ai);
    assert!(last.content.contains("\"hello\""));
}

#[tokio::test]
async fn test_blank_send_is_rejected() {
    let store = fast_store();
    for text in ["", "   "] {
        let err = store.send_user_message(text).await.unwrap_err();
        assert!(matches!(err, TutorError::InvalidInput(_)));
    }
    assert_eq!(store.snapshot().messages.len(), 1);
    assert!(!store.snapshot().awaiting_reply);
}

#[tokio::test]
async fn test_stacked_sends_each_get_a_reply() {
    let store = fast_store();
    store.send_user_message("first").await.unwrap();
    store.send_user_message("second").await.unwrap();
    assert_eq!(store.snapshot().messages.len(), 3);

    let snapshot = wait_for(&store, |s| s.messages.len() == 5).await;
    assert!(!snapshot.awaiting_reply);
    let replies: Vec<_> = snapshot
        .messages
        .iter()
        .filter(|m| m.sender == Sender::Ai && m.kind == MessageKind::Text)
        .collect();
    // Seed welcome plus one reply per send.
    assert_eq!(replies.len(), 3);
}

#[tokio::test]
async fn test_upload_creates_documents_and_analysis_messages() {
    let store = fast_store();
    let files = vec![
        FileMeta::new("syllabus.pdf", 4096, Some("application/pdf")),
        FileMeta::new("notes.md", 512, Some("text/markdown")),
    ];
    store.upload_documents(files).await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.documents.len(), 2);
    assert_eq!(snapshot.documents[0].name, "syllabus.pdf");
    assert_eq!(snapshot.documents[1].name, "notes.md");
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[1].kind, MessageKind::DocumentAnalysis);
    assert!(snapshot.messages[1].content.contains("\"syllabus.pdf\""));
    assert!(snapshot.messages[2].content.contains("\"notes.md\""));
}

#[tokio::test]
async fn test_remove_document_leaves_sessions_untouched() {
    let store = fast_store();
    store
        .upload_documents(vec![FileMeta::new("a.txt", 1, None)])
        .await
        .unwrap();
    let target = store.snapshot().documents[0].id;
    let messages_before = store.snapshot().messages.len();

    store.remove_document(target).await.unwrap();
    let snapshot = store.snapshot();
    assert!(snapshot.documents.is_empty());
    assert_eq!(snapshot.messages.len(), messages_before);

    let err = store.remove_document(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, TutorError::NotFound(_)));
}

#[tokio::test]
async fn test_two_new_sessions_grow_set_and_move_active_pointer() {
    let store = fast_store();
    store.start_new_session().await.unwrap();
    let after_first = store.snapshot().active_session_id;
    store.start_new_session().await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.sessions.len(), 3);
    assert_ne!(snapshot.active_session_id, after_first);
    assert_eq!(snapshot.active_session_id, snapshot.sessions[2].id);
    assert_eq!(snapshot.messages.len(), 1);
}

#[tokio::test]
async fn test_switch_session_restores_history_and_is_idempotent() {
    let store = fast_store();
    let original = store.snapshot().active_session_id;
    store.send_user_message("remember me").await.unwrap();
    wait_for(&store, |s| s.messages.len() == 3).await;
    store.start_new_session().await.unwrap();
    assert_eq!(store.snapshot().messages.len(), 1);

    store.switch_session(original).await.unwrap();
    let first = store.snapshot();
    store.switch_session(original).await.unwrap();
    let second = store.snapshot();

    assert_eq!(first.messages.len(), 3);
    assert_eq!(second.messages.len(), 3);
    assert_eq!(first.active_session_id, second.active_session_id);

    let err = store.switch_session(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, TutorError::NotFound(_)));
}

#[tokio::test]
async fn test_reply_after_switch_lands_in_origin_session() {
    let store = fast_store();
    let origin = store.snapshot().active_session_id;
    store.send_user_message("slow question").await.unwrap();
    store.start_new_session().await.unwrap();
    // The pending reply belongs to the origin session, so the active session
    // is not awaiting anything.
    assert!(!store.snapshot().awaiting_reply);

    let snapshot = wait_for(&store, |s| {
        s.sessions
            .iter()
            .any(|summary| summary.id == origin && summary.message_count == 3)
    })
    .await;
    // The now-active session still only has its seed message.
    assert_eq!(snapshot.messages.len(), 1);
}

#[tokio::test]
async fn test_clear_current_session_resets_to_one_message() {
    let store = fast_store();
    store.send_user_message("a").await.unwrap();
    wait_for(&store, |s| s.messages.len() == 3).await;

    store.clear_current_session().await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.messages[0].sender, Sender::Ai);
    assert!(!snapshot.awaiting_reply);
}

#[tokio::test]
async fn test_clear_cancels_pending_reply() {
    let store = SessionStore::new(StoreConfig {
        reply_delay_ms: 50,
        reply_seed: Some(1),
    });
    store.send_user_message("doomed").await.unwrap();
    store.clear_current_session().await.unwrap();

    // Well past the reply delay: the cancelled reply must never appear.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = store.snapshot();
    assert_eq!(snapshot.messages.len(), 1);
    assert!(!snapshot.awaiting_reply);
}

#[tokio::test]
async fn test_clear_all_history_keeps_documents() {
    let store = fast_store();
    store
        .upload_documents(vec![FileMeta::new("keep.csv", 64, Some("text/csv"))])
        .await
        .unwrap();
    store.start_new_session().await.unwrap();
    store.send_user_message("hi").await.unwrap();
    let docs_before = store.snapshot().documents.len();

    store.clear_all_history().await.unwrap();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.sessions.len(), 1);
    assert_eq!(snapshot.messages.len(), 1);
    assert_eq!(snapshot.documents.len(), docs_before);

    // No stray reply from the pre-reset send.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.snapshot().messages.len(), 1);
}

#[tokio::test]
async fn test_custom_reply_source_is_used() {
    struct Echo;

    #[async_trait]
    impl ReplySource for Echo {
        async fn reply(&self, prompt: &str) -> String {
            format!("echo: {prompt}")
        }
    }

    let store = SessionStore::with_reply_source(
        StoreConfig {
            reply_delay_ms: 10,
            reply_seed: None,
        },
        Arc::new(Echo),
    );
    store.send_user_message("ping").await.unwrap();
    let snapshot = wait_for(&store, |s| s.messages.len() == 3).await;
    assert_eq!(snapshot.messages[2].content, "echo: ping");
}

#[tokio::test]
async fn test_subscriber_observes_every_phase() {
    // Wide delay so the pending-phase snapshot cannot be coalesced away
    // before this test observes it.
    let store = SessionStore::new(StoreConfig {
        reply_delay_ms: 300,
        reply_seed: Some(1),
    });
    let mut rx = store.subscribe();
    assert_eq!(rx.borrow_and_update().messages.len(), 1);

    store.send_user_message("hello").await.unwrap();
    rx.changed().await.unwrap();
    let pending = rx.borrow_and_update().clone();
    assert_eq!(pending.messages.len(), 2);
    assert!(pending.awaiting_reply);

    rx.changed().await.unwrap();
    let done = rx.borrow_and_update().clone();
    assert_eq!(done.messages.len(), 3);
    assert!(!done.awaiting_reply);
}
