//! In-process stand-in for the assistant and registration services.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// One canned HTTP response.
#[derive(Clone, Debug)]
pub struct Scripted {
    pub status: u16,
    pub body: String,
    pub latency: Duration,
}

impl Scripted {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            latency: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            latency: Duration::ZERO,
        }
    }

    pub fn after(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl IntoResponse for Scripted {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Default)]
pub struct MockState {
    chat_replies: Mutex<VecDeque<Scripted>>,
    registration_replies: Mutex<VecDeque<Scripted>>,
    chat_requests: Mutex<Vec<Value>>,
    registrations: Mutex<Vec<Value>>,
}

/// Mock backend listening on an ephemeral local port.
pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        init_tracing();
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/chat", post(chat_handler))
            .route("/pre-registro", post(registration_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr: SocketAddr = listener.local_addr().expect("No local address");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });
        tracing::debug!(%addr, "mock backend listening");

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Queue the next `/chat` response. With an empty queue the service
    /// answers `{"response": "Bienvenido"}`.
    pub async fn script_chat(&self, reply: Scripted) {
        self.state.chat_replies.lock().await.push_back(reply);
    }

    /// Queue the next `/pre-registro` response. Defaults to 200.
    pub async fn script_registration(&self, reply: Scripted) {
        self.state.registration_replies.lock().await.push_back(reply);
    }

    pub async fn chat_requests(&self) -> Vec<Value> {
        self.state.chat_requests.lock().await.clone()
    }

    pub async fn registrations(&self) -> Vec<Value> {
        self.state.registrations.lock().await.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Base URL of a port nobody is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind throwaway listener");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{addr}")
}

pub fn init_tracing() {
    tracing_subscriber::fmt::try_init().ok();
}

async fn chat_handler(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Scripted {
    state.chat_requests.lock().await.push(body);
    let reply = state
        .chat_replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| Scripted::json(200, json!({ "response": "Bienvenido" })));
    if !reply.latency.is_zero() {
        tokio::time::sleep(reply.latency).await;
    }
    reply
}

async fn registration_handler(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Scripted {
    state.registrations.lock().await.push(body);
    state
        .registration_replies
        .lock()
        .await
        .pop_front()
        .unwrap_or_else(|| Scripted::json(200, json!({ "message": "Registro exitoso" })))
}
