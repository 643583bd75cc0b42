//! In-process fake editor for tests
//!
//! Listens on a Unix socket in a temp dir and answers `nvim_call_atomic`
//! from a scripted layout.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rmpv::Value;
use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio_util::codec::Framed;

use nvedge_protocol::{Call, Message, RpcCodec, CALL_ATOMIC};

use crate::client::Endpoint;

/// Window numbers the fake reports
#[derive(Debug, Clone)]
pub struct Layout {
    current: u32,
    neighbors: HashMap<char, u32>,
}

impl Layout {
    /// Every direction falls back to `current`
    pub fn single(current: u32) -> Self {
        Self {
            current,
            neighbors: HashMap::new(),
        }
    }

    pub fn with_neighbor(mut self, key: char, window: u32) -> Self {
        self.neighbors.insert(key, window);
        self
    }

    fn answer(&self, call: &Call) -> Option<Value> {
        match call.method.as_str() {
            "nvim_win_get_number" => Some(Value::from(self.current)),
            "nvim_eval" => {
                let expr = call.args.first()?.as_str()?;
                let key = expr.strip_prefix("winnr('")?.strip_suffix("')")?;
                let mut chars = key.chars();
                let (Some(key), None) = (chars.next(), chars.next()) else {
                    return None;
                };
                Some(Value::from(
                    self.neighbors.get(&key).copied().unwrap_or(self.current),
                ))
            }
            _ => None,
        }
    }
}

/// How the fake answers a batch
#[derive(Debug, Clone)]
pub enum Reply {
    Layout(Layout),
    /// Report query `index` as failed
    Reject { index: usize, message: String },
    /// Use this value as the whole atomic result
    Raw(Value),
    /// Fail the request itself
    Error(String),
    /// Close the connection without answering
    Hangup,
}

#[derive(Debug, Clone, Default)]
pub struct Behavior {
    /// Wait this long before answering
    pub delay: Option<Duration>,
    /// Send a notification ahead of the response
    pub notify_first: bool,
}

pub struct FakeEditor {
    _dir: TempDir,
    endpoint: Endpoint,
    batches: Arc<Mutex<Vec<Vec<Call>>>>,
}

impl FakeEditor {
    pub async fn start(reply: Reply) -> Self {
        Self::start_with(reply, Behavior::default()).await
    }

    pub async fn start_with(reply: Reply, behavior: Behavior) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nvim.sock");
        let listener = UnixListener::bind(&path).unwrap();
        let batches = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&batches);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let behavior = behavior.clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    serve(Framed::new(stream, RpcCodec::new()), reply, behavior, recorded).await;
                });
            }
        });

        Self {
            _dir: dir,
            endpoint: Endpoint::Unix(path),
            batches,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Every batch received so far, across connections
    pub fn batches(&self) -> Vec<Vec<Call>> {
        self.batches.lock().unwrap().clone()
    }
}

async fn serve(
    mut framed: Framed<tokio::net::UnixStream, RpcCodec>,
    reply: Reply,
    behavior: Behavior,
    recorded: Arc<Mutex<Vec<Vec<Call>>>>,
) {
    while let Some(Ok(msg)) = framed.next().await {
        let Message::Request {
            msgid,
            method,
            params,
        } = msg
        else {
            continue;
        };

        let calls = if method == CALL_ATOMIC {
            parse_calls(&params)
        } else {
            Vec::new()
        };
        recorded.lock().unwrap().push(calls.clone());

        if matches!(reply, Reply::Hangup) {
            return;
        }
        if behavior.notify_first {
            let note = Message::Notification {
                method: "nvim_error_event".into(),
                params: vec![],
            };
            if framed.send(note).await.is_err() {
                return;
            }
        }
        if let Some(delay) = behavior.delay {
            tokio::time::sleep(delay).await;
        }

        let (error, result) = respond(&reply, &calls);
        let response = Message::Response {
            msgid,
            error,
            result,
        };
        if framed.send(response).await.is_err() {
            return;
        }
    }
}

fn parse_calls(params: &[Value]) -> Vec<Call> {
    let Some(Value::Array(batch)) = params.first() else {
        return Vec::new();
    };

    batch
        .iter()
        .filter_map(|entry| match entry {
            Value::Array(parts) if parts.len() == 2 => {
                let method = parts[0].as_str()?.to_string();
                let args = parts[1].as_array()?.clone();
                Some(Call::new(method, args))
            }
            _ => None,
        })
        .collect()
}

fn respond(reply: &Reply, calls: &[Call]) -> (Value, Value) {
    match reply {
        Reply::Layout(layout) => {
            let mut results = Vec::new();
            for (index, call) in calls.iter().enumerate() {
                match layout.answer(call) {
                    Some(value) => results.push(value),
                    None => return (Value::Nil, rejection(results, index, "unsupported call")),
                }
            }
            (Value::Nil, Value::Array(vec![Value::Array(results), Value::Nil]))
        }
        Reply::Reject { index, message } => (Value::Nil, rejection(Vec::new(), *index, message)),
        Reply::Raw(value) => (Value::Nil, value.clone()),
        Reply::Error(message) => (
            Value::Array(vec![Value::from(0), Value::from(message.as_str())]),
            Value::Nil,
        ),
        Reply::Hangup => (Value::Nil, Value::Nil),
    }
}

fn rejection(results: Vec<Value>, index: usize, message: &str) -> Value {
    Value::Array(vec![
        Value::Array(results),
        Value::Array(vec![
            Value::from(index as u64),
            Value::from(1),
            Value::from(message),
        ]),
    ])
}
