//! A scripted [`HttpClient`] for tests.
//!
//! Queue one [`Reply`] per expected request; every request pops the next
//! reply and is recorded so tests can assert on what was sent. Every reply
//! yields to the scheduler once before answering, like a real network call,
//! so concurrent callers genuinely interleave.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use warden_transport::{HttpClient, TransportError};

/// What the scripted server does with one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 2xx with a JSON body.
    Json(Value),
    /// Non-2xx with a JSON body.
    Status(u16, Value),
    /// Non-2xx with a raw (non-JSON) body.
    RawStatus(u16, String),
    /// 2xx with a raw body.
    Raw(String),
    /// The server is unreachable.
    Network,
    /// Never answers.
    Hang,
}

/// One request the client received.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Answers requests from a queue of replies.
///
/// An empty queue answers with [`Reply::Network`].
#[derive(Debug, Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Recorded>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client with `replies` queued in order.
    pub fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let client = Self::new();
        for reply in replies {
            client.push(reply);
        }
        client
    }

    /// Queues another reply.
    pub fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns how many requests were received.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&[u8]>) -> Reply {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Recorded {
                method,
                path: path.to_string(),
                body: body.and_then(|b| serde_json::from_slice(b).ok()),
            });
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Reply::Network)
    }

    async fn answer(reply: Reply) -> Result<Vec<u8>, TransportError> {
        tokio::task::yield_now().await;
        match reply {
            Reply::Json(value) => Ok(value.to_string().into_bytes()),
            Reply::Raw(body) => Ok(body.into_bytes()),
            Reply::Status(status, value) => Err(TransportError::Status {
                status,
                body: value.to_string().into_bytes(),
            }),
            Reply::RawStatus(status, body) => Err(TransportError::Status {
                status,
                body: body.into_bytes(),
            }),
            Reply::Network => Err(TransportError::Network("connection refused".into())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

impl HttpClient for ScriptedClient {
    async fn get(&self, path: &str) -> Result<Vec<u8>, TransportError> {
        let reply = self.record("GET", path, None);
        Self::answer(reply).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, TransportError> {
        let reply = self.record("POST", path, body.as_deref());
        Self::answer(reply).await
    }
}
