//! Shared test utilities for vitafit integration tests.
//!
//! Provides [`FakeBackend`], an in-process HTTP server standing in for the
//! planning backend. Each test starts its own instance on an ephemeral port,
//! scripts the replies it wants per route, and inspects the request bodies
//! that were recorded.
//!
//! Replies are looked up per path: a queued one-shot reply (see
//! [`FakeBackend::enqueue`]) wins over the route's default
//! ([`FakeBackend::respond`]). Unscripted routes answer 404 with a
//! `{"detail": ...}` body.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Payload {
    Json(Value),
    Binary {
        bytes: Vec<u8>,
        content_disposition: Option<String>,
    },
}

/// One scripted HTTP reply.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    payload: Payload,
    delay: Option<Duration>,
}

impl Reply {
    /// `200 OK` with a JSON body.
    pub fn json(body: Value) -> Self {
        Self::status(200, body)
    }

    /// Arbitrary status with a JSON body.
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            payload: Payload::Json(body),
            delay: None,
        }
    }

    /// Error status with a `{"detail": ...}` body.
    pub fn detail(status: u16, detail: Value) -> Self {
        Self::status(status, json!({ "detail": detail }))
    }

    /// `200 OK` with a binary body (a PDF, say) and an optional
    /// `Content-Disposition` header value.
    pub fn binary(bytes: impl Into<Vec<u8>>, content_disposition: Option<&str>) -> Self {
        Self {
            status: 200,
            payload: Payload::Binary {
                bytes: bytes.into(),
                content_disposition: content_disposition.map(str::to_owned),
            },
            delay: None,
        }
    }

    /// Hold the reply back for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn render(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.payload {
            Payload::Json(body) => (status, Json(body)).into_response(),
            Payload::Binary {
                bytes,
                content_disposition,
            } => {
                let mut response = (status, bytes).into_response();
                let headers = response.headers_mut();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
                if let Some(value) = content_disposition.and_then(|v| HeaderValue::from_str(&v).ok()) {
                    headers.insert(CONTENT_DISPOSITION, value);
                }
                response
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub path: String,
    /// Parsed JSON body, or `Value::Null` if the body was not JSON.
    pub body: Value,
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    defaults: HashMap<String, Reply>,
    requests: Vec<Recorded>,
}

/// Handle to the script shared with the router.
#[derive(Debug, Clone, Default)]
pub struct FakeState {
    inner: Arc<Mutex<Script>>,
}

impl FakeState {
    fn lock(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread must not hide the recorded requests.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_reply(&self, path: &str) -> Option<Reply> {
        let mut script = self.lock();
        if let Some(reply) = script.queued.get_mut(path).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        script.defaults.get(path).cloned()
    }
}

async fn handle(State(state): State<FakeState>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_owned();
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    tracing::debug!(%path, "fake backend request");
    state.lock().requests.push(Recorded {
        path: path.clone(),
        body,
    });

    let Some(reply) = state.next_reply(&path) else {
        return Reply::detail(404, json!(format!("no scripted reply for {path}"))).render();
    };
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    reply.render()
}

/// Router answering every path from the script in `state`.
pub fn router(state: FakeState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A running fake backend. The server task is aborted on drop.
pub struct FakeBackend {
    addr: SocketAddr,
    state: FakeState,
    task: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind `127.0.0.1:0` and start serving.
    pub async fn start() -> Self {
        let state = FakeState::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake backend");
        let addr = listener.local_addr().expect("failed to read local addr");

        let app = router(state.clone());
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "fake backend stopped");
            }
        });

        Self { addr, state, task }
    }

    /// Base address to hand to the client under test, e.g.
    /// `http://127.0.0.1:54321`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every request to `path` with `reply` (unless a queued reply
    /// takes precedence).
    pub fn respond(&self, path: &str, reply: Reply) -> &Self {
        self.state.lock().defaults.insert(path.to_owned(), reply);
        self
    }

    /// Answer the next request to `path` with `reply`, once.
    pub fn enqueue(&self, path: &str, reply: Reply) -> &Self {
        self.state
            .lock()
            .queued
            .entry(path.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().requests.clone()
    }

    /// Bodies of the requests received on `path`.
    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.body.clone())
            .collect()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .count()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Canned bodies
// ---------------------------------------------------------------------------

/// A typical `/predict_exercise` success body.
pub fn exercise_plan_body() -> Value {
    json!({
        "exercise_plan": {
            "exercise_type": "Cardio",
            "intensity_level": "Moderate",
            "frequency_per_week": 4,
            "duration_minutes": 45.0,
            "estimated_calorie_burn": 350.5
        }
    })
}

/// A typical `/predict_diet` success body with numeric targets.
pub fn diet_plan_body() -> Value {
    json!({
        "diet_plan": {
            "recommended_calories": 2100.0,
            "protein_grams_per_day": 120.0,
            "carbs_grams_per_day": 250.0,
            "fats_grams_per_day": 70.0
        }
    })
}

/// `/ai/overview` and `/ai/chat` success body.
pub fn chat_body(text: &str) -> Value {
    json!({ "response": text })
}
