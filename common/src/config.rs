use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Greeting seeded into every new conversation.
pub const GREETING_TEXT: &str =
    "¡Hola! Soy Sara, asesora de la Universidad Bolivariana del Ecuador. ¿En qué puedo ayudarte hoy?";

/// Synthetic follow-up appended after every turn.
pub const FOLLOW_UP_TEXT: &str = "¿Deseas registrarte ahora? [Registro ✍️](#registro)";

/// Replaces the assistant reply whenever the exchange fails.
pub const APOLOGY_TEXT: &str =
    "Lo siento, hubo un error al procesar tu mensaje. Por favor intenta nuevamente.";

/// Link target that opens the registration overlay instead of navigating.
pub const REGISTRATION_ANCHOR: &str = "#registro";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const FOLLOW_UP_DELAY_MS: u64 = 1_000;
pub const OVERLAY_GRACE_MS: u64 = 3_000;

/// Preview image shared by every document tile.
pub const DOCUMENT_THUMBNAIL: &str = "/documento-preview.svg";

/// Endpoints, delays and fixed texts of the chat widget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_base_url: String,
    pub chat_path: String,
    pub documents_path: String,
    pub registration_path: String,
    pub follow_up_delay_ms: u64,
    pub overlay_grace_ms: u64,
    pub registration_anchor: String,
    pub document_thumbnail: String,
    pub greeting: String,
    pub follow_up: String,
    pub apology: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            chat_path: "/chat".to_string(),
            documents_path: "/documentos".to_string(),
            registration_path: "/pre-registro".to_string(),
            follow_up_delay_ms: FOLLOW_UP_DELAY_MS,
            overlay_grace_ms: OVERLAY_GRACE_MS,
            registration_anchor: REGISTRATION_ANCHOR.to_string(),
            document_thumbnail: DOCUMENT_THUMBNAIL.to_string(),
            greeting: GREETING_TEXT.to_string(),
            follow_up: FOLLOW_UP_TEXT.to_string(),
            apology: APOLOGY_TEXT.to_string(),
        }
    }
}

impl ChatConfig {
    /// Default configuration pointed at another backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    pub fn chat_url(&self) -> String {
        self.join(&self.chat_path)
    }

    pub fn documents_base_url(&self) -> String {
        self.join(&self.documents_path)
    }

    pub fn registration_url(&self) -> String {
        self.join(&self.registration_path)
    }

    pub fn follow_up_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_delay_ms)
    }

    pub fn overlay_grace(&self) -> Duration {
        Duration::from_millis(self.overlay_grace_ms)
    }
}
