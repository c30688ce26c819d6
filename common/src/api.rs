//! Wire types for the assistant and registration backends.
//!
//! Transports (browser fetch, native reqwest) hand raw `(status, body)`
//! pairs to [`interpret_chat_response`] and [`interpret_registration_response`]
//! so every client classifies failures the same way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::DocumentRef;

/// `POST /chat` request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// `POST /chat` success body, as loosely as the backend sends it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatResponseBody {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub documentos: Option<Vec<DocumentoWire>>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentoWire {
    pub id: WireId,
    pub nombre: String,
}

/// Document ids arrive as strings or integers depending on the backend.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

impl From<DocumentoWire> for DocumentRef {
    fn from(doc: DocumentoWire) -> Self {
        DocumentRef {
            id: doc.id.into_string(),
            name: doc.nombre,
        }
    }
}

/// A validated assistant reply.
#[derive(Clone, Debug, PartialEq)]
pub struct AssistantReply {
    pub text: String,
    pub documents: Vec<DocumentRef>,
    pub session_id: Option<String>,
}

/// Why an assistant exchange produced no usable reply.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("assistant returned HTTP {0}")]
    Status(u16),
    #[error("malformed assistant payload: {0}")]
    Malformed(String),
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

impl TryFrom<ChatResponseBody> for AssistantReply {
    type Error = ChatError;

    /// A missing or blank `response` counts as a failed exchange.
    fn try_from(body: ChatResponseBody) -> Result<Self, Self::Error> {
        let text = body
            .response
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ChatError::Malformed("missing `response` field".to_string()))?;
        let documents = body
            .documentos
            .unwrap_or_default()
            .into_iter()
            .map(DocumentRef::from)
            .collect();
        Ok(AssistantReply {
            text,
            documents,
            session_id: body.session_id,
        })
    }
}

/// Classify a raw `/chat` response.
pub fn interpret_chat_response(status: u16, body: &str) -> Result<AssistantReply, ChatError> {
    if !is_success(status) {
        return Err(ChatError::Status(status));
    }
    let parsed: ChatResponseBody =
        serde_json::from_str(body).map_err(|e| ChatError::Malformed(e.to_string()))?;
    AssistantReply::try_from(parsed)
}

/// Generic message shown when the backend gives no usable detail.
pub const REGISTRATION_FALLBACK: &str = "Error en el registro";

/// Why a lead submission failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("registration rejected with HTTP {status}")]
    Rejected { status: u16, detail: Option<String> },
    #[error("draft failed validation")]
    Invalid,
}

impl RegistrationError {
    /// Text shown inside the form: the server's detail verbatim, or a fallback.
    pub fn user_message(&self) -> String {
        match self {
            RegistrationError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            RegistrationError::Transport(_) => {
                "Error al registrar, por favor intente nuevamente".to_string()
            }
            _ => REGISTRATION_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Classify a raw `/pre-registro` response.
pub fn interpret_registration_response(status: u16, body: &str) -> Result<(), RegistrationError> {
    if is_success(status) {
        return Ok(());
    }
    // FastAPI sends a string detail for HTTPException and a list for schema errors.
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        });
    Err(RegistrationError::Rejected { status, detail })
}
