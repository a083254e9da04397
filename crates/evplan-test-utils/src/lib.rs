//! Shared test utilities for evplan integration tests.
//!
//! [`MockEndpoint`] is a local stand-in for the generative-language API: an
//! axum server on an ephemeral port that answers every
//! `POST .../models/{model}:generateContent` with a scripted reply and
//! records what it was sent. Point a `GeminiConfig` at
//! [`MockEndpoint::base_url`] to exercise the real HTTP client.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use evplan_store::{EventPlan, Gender};

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with `text` wrapped in a `candidates` envelope.
    Text(String),
    /// The given status with an empty body.
    Status(u16),
    /// The given status with a verbatim body.
    Raw { status: u16, body: String },
}

/// One request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// The prompt text from a `generateContent` body, if it has one.
    pub fn prompt(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(&self.body).ok()?;
        value["contents"][0]["parts"][0]["text"]
            .as_str()
            .map(str::to_owned)
    }
}

#[derive(Debug)]
struct MockState {
    reply: Reply,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<MockState>>;

/// Scripted `generateContent` server. Shuts down when dropped.
pub struct MockEndpoint {
    addr: SocketAddr,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockEndpoint {
    /// Start a mock that answers with `reply`.
    pub async fn start(reply: Reply) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            reply,
            requests: Vec::new(),
        }));

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock endpoint");
        let addr = listener.local_addr().expect("mock endpoint has no address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Start a mock whose reply text is `text`.
    pub async fn with_text(text: impl Into<String>) -> Self {
        Self::start(Reply::Text(text.into())).await
    }

    /// Start a mock that always answers with `status`.
    pub async fn with_status(status: u16) -> Self {
        Self::start(Reply::Status(status)).await
    }

    /// Replace the scripted reply for subsequent requests.
    pub fn set_reply(&self, reply: Reply) {
        self.lock().reply = reply;
    }

    /// Base URL to put in a client config, e.g. `http://127.0.0.1:41234`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock endpoint state poisoned")
    }
}

impl Drop for MockEndpoint {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(State(state): State<Shared>, method: Method, uri: Uri, body: String) -> Response {
    if method != Method::POST || !uri.path().ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let reply = {
        let mut guard = state.lock().expect("mock endpoint state poisoned");
        guard.requests.push(RecordedRequest {
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            body,
        });
        guard.reply.clone()
    };

    match reply {
        Reply::Text(text) => (
            StatusCode::OK,
            [("content-type", "application/json")],
            candidates_envelope(&text),
        )
            .into_response(),
        Reply::Status(code) => status(code).into_response(),
        Reply::Raw { status: code, body } => (status(code), body).into_response(),
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Wrap model text in the `generateContent` response envelope.
pub fn candidates_envelope(text: &str) -> String {
    serde_json::json!({
        "candidates": [ { "content": { "parts": [ { "text": text } ], "role": "model" } } ]
    })
    .to_string()
}

/// Model reply used across tests: the Mia birthday plan, fenced as models
/// often return it.
pub const MIA_REPLY: &str = "```json\n{\"theme_suggestions\":[\"Unicorns\",\"Mermaids\",\"Space\"],\"activities\":[\"Cake\",\"Face paint\",\"Piñata\",\"Dance\"],\"todo_list\":[\"Invites\",\"Balloons\",\"Cake\",\"Music\",\"Cleanup\"],\"gift_ideas\":[\"Doll\",\"Books\",\"Puzzle\",\"Kite\"]}\n```";

/// A fully populated plan for list and rendering tests.
pub fn sample_plan(id: i64) -> EventPlan {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    EventPlan {
        id,
        name: "Mia".to_string(),
        age: "7".to_string(),
        gender: Gender::Female,
        event_type: "Birthday".to_string(),
        created_at: "October 16, 2026".to_string(),
        theme_suggestions: strings(&["Unicorns", "Mermaids", "Space"]),
        activities: strings(&["Cake", "Face paint", "Piñata", "Dance"]),
        todo_list: strings(&["Invites", "Balloons", "Cake", "Music", "Cleanup"]),
        gift_ideas: strings(&["Doll", "Books", "Puzzle", "Kite"]),
    }
}
