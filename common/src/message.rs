use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// A downloadable resource attached to a bot message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Opaque identifier, used to build the retrieval URL.
    pub id: String,
    /// Display label.
    pub name: String,
}

/// One conversational turn.
///
/// Messages are immutable once appended to a [`MessageStore`]; the
/// timestamp is for display only and never affects ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub documents: Option<Vec<DocumentRef>>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::at(text, Sender::User, Utc::now())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::at(text, Sender::Bot, Utc::now())
    }

    pub fn at(text: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp,
            documents: None,
        }
    }

    /// Attach documents. Only bot messages carry them; an empty list
    /// is kept as "no documents".
    pub fn with_documents(mut self, documents: Vec<DocumentRef>) -> Self {
        if self.sender == Sender::Bot && !documents.is_empty() {
            self.documents = Some(documents);
        }
        self
    }

    pub fn documents(&self) -> &[DocumentRef] {
        self.documents.as_deref().unwrap_or_default()
    }
}

/// Ordered, append-only conversation record.
///
/// Insertion order is display order. `revision` bumps on every append so
/// the view can scroll the newest message into view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageStore {
    messages: Vec<Message>,
    revision: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a single bot greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.append(Message::bot(greeting));
        store
    }

    /// The only mutator.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.revision += 1;
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Monotonic append counter; the scroll-to-latest signal.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
