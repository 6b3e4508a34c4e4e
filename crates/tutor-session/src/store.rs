//! Async runtime around the pure state machine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tutor_core::{FileMeta, TutorResult};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::reply::{CannedReplies, ReplySource};
use crate::state::{Effect, Intent, Snapshot, State};

/// The session store: applies intents to the shared [`State`] under a write
/// lock, executes the resulting effects, and publishes a fresh [`Snapshot`]
/// after every accepted intent.
///
/// Cloning is cheap; all clones share the same state. Scheduled replies run as
/// spawned tasks keyed by `(session_id, request_id)` so that clearing a
/// session can cancel exactly the replies bound to it.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: RwLock<State>,
    tasks: Mutex<HashMap<(Uuid, Uuid), JoinHandle<()>>>,
    snapshot_tx: watch::Sender<Snapshot>,
    replies: Arc<dyn ReplySource>,
    config: StoreConfig,
}

impl SessionStore {
    /// Creates a store with the canned reply bank (seeded if the config says
    /// so).
    pub fn new(config: StoreConfig) -> Self {
        let replies: Arc<dyn ReplySource> = match config.reply_seed {
            Some(seed) => Arc::new(CannedReplies::seeded(seed)),
            None => Arc::new(CannedReplies::new()),
        };
        Self::with_reply_source(config, replies)
    }

    /// Creates a store with a custom reply source.
    pub fn with_reply_source(config: StoreConfig, replies: Arc<dyn ReplySource>) -> Self {
        let state = State::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot());
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                tasks: Mutex::new(HashMap::new()),
                snapshot_tx,
                replies,
                config,
            }),
        }
    }

    /// Appends a user message to the active session and schedules a simulated
    /// reply. Rejects empty or whitespace-only text.
    pub async fn send_user_message(&self, text: impl Into<String>) -> TutorResult<()> {
        self.dispatch(Intent::SendUserMessage { text: text.into() }).await
    }

    /// Records each file's metadata and appends one analysis message per file,
    /// in list order.
    pub async fn upload_documents(&self, files: Vec<FileMeta>) -> TutorResult<()> {
        self.dispatch(Intent::UploadDocuments { files }).await
    }

    /// Creates a fresh session and makes it active; prior sessions are kept.
    pub async fn start_new_session(&self) -> TutorResult<()> {
        self.dispatch(Intent::StartNewSession).await
    }

    /// Makes an existing session active, restoring its full message list.
    pub async fn switch_session(&self, session_id: Uuid) -> TutorResult<()> {
        self.dispatch(Intent::SwitchSession { session_id }).await
    }

    /// Resets the active session to a single fresh seed message and cancels
    /// its in-flight replies. Other sessions and documents are untouched.
    pub async fn clear_current_session(&self) -> TutorResult<()> {
        self.dispatch(Intent::ClearCurrentSession).await
    }

    /// Discards all sessions in favor of one fresh default session. Documents
    /// are untouched.
    pub async fn clear_all_history(&self) -> TutorResult<()> {
        self.dispatch(Intent::ClearAllHistory).await
    }

    /// Removes one document from the knowledge base.
    pub async fn remove_document(&self, document_id: Uuid) -> TutorResult<()> {
        self.dispatch(Intent::RemoveDocument { document_id }).await
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// Subscribes to snapshot updates. The receiver starts at the current
    /// snapshot; every accepted intent and delivered reply publishes a new
    /// one.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    async fn dispatch(&self, intent: Intent) -> TutorResult<()> {
        let effects = {
            let mut state = self.inner.state.write().await;
            match state.apply(intent) {
                Ok(effects) => {
                    self.inner.snapshot_tx.send_replace(state.snapshot());
                    effects
                }
                Err(err) => {
                    debug!(error = %err, "intent rejected");
                    return Err(err);
                }
            }
        };
        for effect in effects {
            self.run_effect(effect);
        }
        Ok(())
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::ScheduleReply {
                session_id,
                request_id,
                prompt,
            } => self.schedule_reply(session_id, request_id, prompt),
            Effect::CancelReply {
                session_id,
                request_id,
            } => {
                if let Some(handle) = self.inner.tasks.lock().remove(&(session_id, request_id)) {
                    handle.abort();
                    debug!(%session_id, %request_id, "reply cancelled");
                }
            }
        }
    }

    fn schedule_reply(&self, session_id: Uuid, request_id: Uuid, prompt: String) {
        let store = self.clone();
        // Insert under the registry lock so the task cannot observe the map
        // before its own handle is in it.
        let mut tasks = self.inner.tasks.lock();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(store.inner.config.reply_delay()).await;
            let content = store.inner.replies.reply(&prompt).await;
            // If this reply was cancelled while we slept, its pending entry is
            // gone and the delivery below is a discarded no-op.
            if let Err(err) = store
                .dispatch(Intent::DeliverReply {
                    session_id,
                    request_id,
                    content,
                })
                .await
            {
                debug!(%session_id, %request_id, error = %err, "reply discarded");
            }
            store.inner.tasks.lock().remove(&(session_id, request_id));
        });
        tasks.insert((session_id, request_id), handle);
        info!(%session_id, %request_id, "reply scheduled");
    }
}
