//! WASM HTTP client for the assistant backend.
//!
//! Talks to `POST /chat` and `POST /pre-registro`. The backend base URL is
//! taken from `SARA_API_URL` at compile time, falling back to the local
//! development server.

use std::time::Duration;

use sara_common::api::{
    interpret_chat_response, interpret_registration_response, AssistantReply, ChatError,
    ChatRequest, RegistrationError,
};
use sara_common::config::ChatConfig;
use sara_common::lifecycle::{AssistantService, Delay};
use sara_common::registration::{RegistrationDraft, RegistrationService};

/// Widget configuration with the compile-time backend URL applied.
pub fn chat_config() -> ChatConfig {
    match option_env!("SARA_API_URL").filter(|url| !url.is_empty()) {
        Some(url) => ChatConfig::with_base_url(url),
        None => ChatConfig::default(),
    }
}

/// Browser fetch transport for both endpoints.
#[derive(Clone, Debug)]
pub struct RemoteBackend {
    chat_url: String,
    registration_url: String,
}

impl RemoteBackend {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            chat_url: config.chat_url(),
            registration_url: config.registration_url(),
        }
    }
}

impl AssistantService for RemoteBackend {
    async fn send(&self, request: &ChatRequest) -> Result<AssistantReply, ChatError> {
        let body =
            serde_json::to_string(request).map_err(|e| ChatError::Transport(e.to_string()))?;
        let (status, text) = post_json(&self.chat_url, &body)
            .await
            .map_err(ChatError::Transport)?;
        interpret_chat_response(status, &text)
    }
}

impl RegistrationService for RemoteBackend {
    async fn submit(&self, draft: &RegistrationDraft) -> Result<(), RegistrationError> {
        let body = serde_json::to_string(draft)
            .map_err(|e| RegistrationError::Transport(e.to_string()))?;
        let (status, text) = post_json(&self.registration_url, &body)
            .await
            .map_err(RegistrationError::Transport)?;
        interpret_registration_response(status, &text)
    }
}

/// Browser timers.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooDelay;

impl Delay for GlooDelay {
    async fn sleep(&self, duration: Duration) {
        #[cfg(target_family = "wasm")]
        gloo_timers::future::TimeoutFuture::new(duration.as_millis().min(u32::MAX as u128) as u32)
            .await;
        #[cfg(not(target_family = "wasm"))]
        let _ = duration;
    }
}

// ─── HTTP helpers (WASM) ─────────────────────────────────────────────────────

/// POST a JSON body. Returns the status and raw body; only a failure to
/// reach the server or read the response is an `Err`.
#[cfg(target_family = "wasm")]
async fn post_json(url: &str, body: &str) -> Result<(u16, String), String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let opts = web_sys::RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(web_sys::RequestMode::Cors);
    opts.set_body(&wasm_bindgen::JsValue::from_str(body));

    let request = web_sys::Request::new_with_str_and_init(url, &opts)
        .map_err(|e| format!("Failed to create request: {:?}", e))?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(|e| format!("Failed to set header: {:?}", e))?;

    let window = web_sys::window().ok_or("No window")?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;

    let resp: web_sys::Response = resp_value
        .dyn_into()
        .map_err(|_| "Response is not a Response object".to_string())?;

    let text = JsFuture::from(
        resp.text()
            .map_err(|e| format!("Failed to get text: {:?}", e))?,
    )
    .await
    .map_err(|e| format!("Failed to read body: {:?}", e))?;

    let text_str = text
        .as_string()
        .ok_or("Response body is not a string".to_string())?;

    Ok((resp.status(), text_str))
}

// Non-WASM stub for type checking
#[cfg(not(target_family = "wasm"))]
async fn post_json(_url: &str, _body: &str) -> Result<(u16, String), String> {
    Err("Assistant client only available in WASM".to_string())
}
