//! In-process Responses API stand-in for tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<Mutex<VecDeque<(u16, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn responses_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(RecordedRequest { authorization, body });

    match state.replies.lock().unwrap().pop_front() {
        Some((status, reply)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(reply),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "mock server ran out of replies" })),
        ),
    }
}

pub struct MockResponsesServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockResponsesServer {
    /// Serve `replies` in order, one per POST to `/v1/responses`.
    pub async fn start(replies: Vec<(u16, Value)>) -> Self {
        let state = MockState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/v1/responses", post(responses_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, handle, requests }
    }

    /// Base URL to hand to `ResponsesClient::with_base_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockResponsesServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A successful Responses API reply carrying `text` as its only output.
pub fn text_reply(text: &str, input_tokens: u64, output_tokens: u64) -> Value {
    json!({
        "id": "resp_test",
        "object": "response",
        "status": "completed",
        "output": [
            {
                "type": "reasoning",
                "id": "rs_test",
                "summary": []
            },
            {
                "type": "message",
                "id": "msg_test",
                "role": "assistant",
                "content": [
                    { "type": "output_text", "text": text, "annotations": [] }
                ]
            }
        ],
        "usage": {
            "input_tokens": input_tokens,
            "output_tokens": output_tokens,
            "total_tokens": input_tokens + output_tokens
        }
    })
}
