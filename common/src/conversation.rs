use tracing::debug;

use crate::api::{AssistantReply, ChatError, ChatRequest};
use crate::config::ChatConfig;
use crate::message::{Message, MessageStore};

/// A user turn that has been accepted and is waiting on the assistant.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTurn {
    pub request: ChatRequest,
}

/// Session-scoped chat state: the message history, the input buffer, and
/// the single-flight `pending` flag.
///
/// Only the turn transitions below mutate the history or `pending`.
#[derive(Clone, Debug)]
pub struct ConversationState {
    store: MessageStore,
    input: String,
    pending: bool,
    closed: bool,
    server_session: Option<String>,
    follow_up_text: String,
    apology_text: String,
}

impl ConversationState {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            store: MessageStore::seeded(config.greeting.clone()),
            input: String::new(),
            pending: false,
            closed: false,
            server_session: None,
            follow_up_text: config.follow_up.clone(),
            apology_text: config.apology.clone(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.snapshot()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Whether the send affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.pending && !self.closed && !self.input.trim().is_empty()
    }

    pub fn server_session(&self) -> Option<&str> {
        self.server_session.as_deref()
    }

    /// Accept a user turn: append it, clear the input, raise `pending`.
    ///
    /// Blank text is a silent no-op, and so is any call while a turn is
    /// already in flight or after the session closed.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() {
            return None;
        }
        if self.pending || self.closed {
            debug!(pending = self.pending, closed = self.closed, "turn rejected");
            return None;
        }
        self.store.append(Message::user(text));
        self.input.clear();
        self.pending = true;
        Some(PendingTurn {
            request: ChatRequest {
                message: text.to_string(),
                session_id: self.server_session.clone(),
            },
        })
    }

    /// Settle the in-flight turn with the assistant's reply or the apology,
    /// then drop `pending`.
    pub fn complete_turn(&mut self, outcome: Result<AssistantReply, ChatError>) {
        if self.closed {
            return;
        }
        let message = match outcome {
            Ok(reply) => {
                if reply.session_id.is_some() {
                    self.server_session = reply.session_id;
                }
                Message::bot(reply.text).with_documents(reply.documents)
            }
            Err(_) => Message::bot(self.apology_text.clone()),
        };
        self.store.append(message);
        self.pending = false;
    }

    /// Append the synthetic registration prompt. Ignored once closed.
    pub fn push_follow_up(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.store.append(Message::bot(self.follow_up_text.clone()));
        true
    }

    /// End the session. Late replies and follow-ups are dropped from here on.
    pub fn close(&mut self) {
        self.closed = true;
        self.pending = false;
    }
}
