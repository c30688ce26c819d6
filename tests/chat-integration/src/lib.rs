use std::time::Duration;

use serde_json::{json, Value};

use sara_common::api::{
    interpret_chat_response, interpret_registration_response, AssistantReply, ChatError,
    ChatRequest, RegistrationError,
};
use sara_common::config::ChatConfig;
use sara_common::lifecycle::{AssistantService, Delay};
use sara_common::registration::{RegistrationDraft, RegistrationService};

pub mod harness;

/// Native transport for both backend endpoints, the counterpart of the
/// browser fetch client.
pub struct ReqwestBackend {
    client: reqwest::Client,
    chat_url: String,
    registration_url: String,
}

impl ReqwestBackend {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            chat_url: config.chat_url(),
            registration_url: config.registration_url(),
        }
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<(u16, String), String> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| e.to_string())?;
        Ok((status, text))
    }
}

impl AssistantService for ReqwestBackend {
    async fn send(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError> {
        let (status, text) = self
            .post(&self.chat_url, request)
            .await
            .map_err(ChatError::Transport)?;
        interpret_chat_response(status, &text)
    }
}

impl RegistrationService for ReqwestBackend {
    async fn submit(&self, draft: &RegistrationDraft) -> Result<(), RegistrationError> {
        let (status, text) = self
            .post(&self.registration_url, draft)
            .await
            .map_err(RegistrationError::Transport)?;
        interpret_registration_response(status, &text)
    }
}

pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Config pointed at a mock backend, with short delays so tests stay fast.
pub fn test_config(base_url: &str) -> ChatConfig {
    ChatConfig {
        follow_up_delay_ms: 20,
        overlay_grace_ms: 30,
        ..ChatConfig::with_base_url(base_url)
    }
}

/// A `/chat` body the way the assistant service sends it.
pub fn chat_body(response: &str, documentos: Value, session_id: Option<&str>) -> Value {
    let mut body = json!({ "response": response, "documentos": documentos });
    if let Some(id) = session_id {
        body["session_id"] = json!(id);
    }
    body
}

/// A draft that passes every validation rule.
pub fn valid_draft() -> RegistrationDraft {
    RegistrationDraft {
        nombre: "María Fernanda Loor".to_string(),
        cedula: "0923456781".to_string(),
        correo: "maria.loor@example.com".to_string(),
        celular: "+593987654321".to_string(),
        carrera: "Licenciatura en Psicología".to_string(),
    }
}
