//! Pure state transitions for the session store.
//!
//! All mutation funnels through [`State::apply`]: one intent in, a consistent
//! state plus a list of side-effect requests out. The function performs no
//! I/O, timing, or scheduling; executing [`Effect`]s is the runtime's job
//! (see [`crate::store::SessionStore`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tutor_core::{Document, FileMeta, Message, MessageKind, TutorError, TutorResult};
use uuid::Uuid;

use crate::reply;
use crate::session::{Session, DEFAULT_TITLE};

/// A named request to transform store state.
#[derive(Debug, Clone)]
pub enum Intent {
    /// Append a user message to the active session and request a reply.
    SendUserMessage {
        /// Raw input text; rejected if empty after trimming.
        text: String,
    },
    /// Deliver a scheduled reply to its origin session.
    DeliverReply {
        /// Session that was active when the originating send was issued.
        session_id: Uuid,
        /// Identifies the in-flight reply this delivery completes.
        request_id: Uuid,
        /// Reply content produced by the reply source.
        content: String,
    },
    /// Record uploaded files and append one analysis message per file.
    UploadDocuments {
        /// Platform file-selection result, processed in list order.
        files: Vec<FileMeta>,
    },
    /// Create a fresh session and make it active.
    StartNewSession,
    /// Make an existing session active.
    SwitchSession {
        /// Target session; must exist.
        session_id: Uuid,
    },
    /// Reset the active session to a single fresh seed message.
    ClearCurrentSession,
    /// Discard every session in favor of one fresh default session.
    ClearAllHistory,
    /// Remove one document from the knowledge base.
    RemoveDocument {
        /// Target document; must exist.
        document_id: Uuid,
    },
}

/// A side-effect request emitted by a transition for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Spawn a delayed reply task for `(session_id, request_id)`.
    ScheduleReply {
        session_id: Uuid,
        request_id: Uuid,
        /// The trimmed user text the reply should address.
        prompt: String,
    },
    /// Abort the reply task for `(session_id, request_id)` if still running.
    CancelReply { session_id: Uuid, request_id: Uuid },
}

/// Summary of one session, as shown in the history sidebar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
    pub preview: String,
    pub message_count: usize,
    pub last_message_at: DateTime<Utc>,
}

/// Immutable view of store state published to observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The session whose messages are currently visible.
    pub active_session_id: Uuid,
    /// All sessions in creation order.
    pub sessions: Vec<SessionSummary>,
    /// Full message list of the active session.
    pub messages: Vec<Message>,
    /// All documents in upload order.
    pub documents: Vec<Document>,
    /// Advisory: a reply for the active session is in flight.
    pub awaiting_reply: bool,
}

/// The session store's complete state: sessions, the active-session pointer,
/// the document set, and bookkeeping for in-flight replies.
#[derive(Debug)]
pub struct State {
    sessions: Vec<Session>,
    active_session_id: Uuid,
    documents: Vec<Document>,
    /// In-flight replies as `(session_id, request_id)` pairs.
    pending: Vec<(Uuid, Uuid)>,
}

impl State {
    /// Creates the startup state: one default session, no documents.
    pub fn new() -> Self {
        let default_session = Session::new(DEFAULT_TITLE, reply::WELCOME);
        let active_session_id = default_session.id;
        Self {
            sessions: vec![default_session],
            active_session_id,
            documents: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Applies one intent, returning the effects the runtime must execute.
    ///
    /// On `Err` the state is unchanged.
    pub fn apply(&mut self, intent: Intent) -> TutorResult<Vec<Effect>> {
        match intent {
            Intent::SendUserMessage { text } => self.send_user_message(&text),
            Intent::DeliverReply {
                session_id,
                request_id,
                content,
            } => self.deliver_reply(session_id, request_id, &content),
            Intent::UploadDocuments { files } => self.upload_documents(&files),
            Intent::StartNewSession => self.start_new_session(),
            Intent::SwitchSession { session_id } => self.switch_session(session_id),
            Intent::ClearCurrentSession => self.clear_current_session(),
            Intent::ClearAllHistory => self.clear_all_history(),
            Intent::RemoveDocument { document_id } => self.remove_document(document_id),
        }
    }

    fn send_user_message(&mut self, text: &str) -> TutorResult<Vec<Effect>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TutorError::InvalidInput("message text is empty".into()));
        }

        let session_id = self.active_session_id;
        let request_id = Uuid::new_v4();
        self.active_session_mut().add_message(Message::user(trimmed));
        // No lock: sends may stack while earlier replies are still in flight.
        self.pending.push((session_id, request_id));

        Ok(vec![Effect::ScheduleReply {
            session_id,
            request_id,
            prompt: trimmed.to_string(),
        }])
    }

    fn deliver_reply(
        &mut self,
        session_id: Uuid,
        request_id: Uuid,
        content: &str,
    ) -> TutorResult<Vec<Effect>> {
        let position = self
            .pending
            .iter()
            .position(|&entry| entry == (session_id, request_id))
            .ok_or_else(|| {
                TutorError::NotFound(format!("no pending reply {request_id} for session {session_id}"))
            })?;

        // Delivery targets the origin session, which need not be active.
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| TutorError::NotFound(format!("session {session_id} not found")))?;

        self.pending.remove(position);
        session.add_message(Message::ai(content));
        Ok(Vec::new())
    }

    fn upload_documents(&mut self, files: &[FileMeta]) -> TutorResult<Vec<Effect>> {
        if files.is_empty() {
            return Err(TutorError::InvalidInput("upload batch is empty".into()));
        }

        // N independent single-file uploads in list order, not one atomic batch.
        for file in files {
            self.documents.push(Document::from_file(file));
            let analysis = Message::ai_with_kind(
                MessageKind::DocumentAnalysis,
                reply::document_analysis(&file.name),
            );
            self.active_session_mut().add_message(analysis);
        }
        Ok(Vec::new())
    }

    fn start_new_session(&mut self) -> TutorResult<Vec<Effect>> {
        let title = format!("Session {}", self.sessions.len());
        let session = Session::new(title, reply::NEW_SESSION);
        self.active_session_id = session.id;
        self.sessions.push(session);
        Ok(Vec::new())
    }

    fn switch_session(&mut self, session_id: Uuid) -> TutorResult<Vec<Effect>> {
        if !self.sessions.iter().any(|s| s.id == session_id) {
            return Err(TutorError::NotFound(format!("session {session_id} not found")));
        }
        self.active_session_id = session_id;
        Ok(Vec::new())
    }

    fn clear_current_session(&mut self) -> TutorResult<Vec<Effect>> {
        let session_id = self.active_session_id;
        self.active_session_mut().reset(reply::SESSION_CLEARED);
        Ok(self.cancel_pending_for(|sid| sid == session_id))
    }

    fn clear_all_history(&mut self) -> TutorResult<Vec<Effect>> {
        let effects = self.cancel_pending_for(|_| true);
        let default_session = Session::new(DEFAULT_TITLE, reply::WELCOME_RESET);
        self.active_session_id = default_session.id;
        self.sessions = vec![default_session];
        // Documents survive a history reset; they are an orthogonal entity.
        Ok(effects)
    }

    fn remove_document(&mut self, document_id: Uuid) -> TutorResult<Vec<Effect>> {
        let position = self
            .documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| TutorError::NotFound(format!("document {document_id} not found")))?;
        self.documents.remove(position);
        Ok(Vec::new())
    }

    /// Drops pending entries matching the predicate, emitting a cancel effect
    /// for each.
    fn cancel_pending_for(&mut self, matches: impl Fn(Uuid) -> bool) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.pending.retain(|&(session_id, request_id)| {
            if matches(session_id) {
                effects.push(Effect::CancelReply {
                    session_id,
                    request_id,
                });
                false
            } else {
                true
            }
        });
        effects
    }

    fn active_session_mut(&mut self) -> &mut Session {
        let active = self.active_session_id;
        self.sessions
            .iter_mut()
            .find(|s| s.id == active)
            .unwrap_or_else(|| unreachable!("active session id always references an existing session"))
    }

    /// The session whose messages are currently visible.
    pub fn active_session(&self) -> &Session {
        self.sessions
            .iter()
            .find(|s| s.id == self.active_session_id)
            .unwrap_or_else(|| unreachable!("active session id always references an existing session"))
    }

    /// Id of the session whose messages are currently visible.
    pub fn active_session_id(&self) -> Uuid {
        self.active_session_id
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Advisory flag: true iff a reply targeting the active session is in
    /// flight. Drives a loading indicator; gates nothing.
    pub fn awaiting_reply(&self) -> bool {
        self.pending
            .iter()
            .any(|&(session_id, _)| session_id == self.active_session_id)
    }

    /// Number of in-flight replies across all sessions.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clones the current state into an immutable observer view.
    pub fn snapshot(&self) -> Snapshot {
        let active = self.active_session();
        Snapshot {
            active_session_id: self.active_session_id,
            sessions: self
                .sessions
                .iter()
                .map(|s| SessionSummary {
                    id: s.id,
                    title: s.title.clone(),
                    preview: s.preview.clone(),
                    message_count: s.message_count(),
                    last_message_at: s.last_message_at,
                })
                .collect(),
            messages: active.messages.clone(),
            documents: self.documents.clone(),
            awaiting_reply: self.awaiting_reply(),
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
