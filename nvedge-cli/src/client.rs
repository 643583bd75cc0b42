//! One-shot msgpack-rpc session with a running editor
//!
//! A session owns exactly one connection. Dropping it closes the socket,
//! which is also what unblocks an abandoned in-flight call.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;

use futures::{SinkExt, StreamExt};
use rmpv::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};
use tokio::time::timeout_at;
use tokio_util::codec::Framed;
use tracing::{debug, trace};
use url::Url;

use nvedge_protocol::{messages::describe_error, AtomicResult, Call, Message, RpcCodec, CALL_ATOMIC};
use nvedge_utils::{NavError, Result};

use crate::supervisor::Deadline;

/// Trait alias for streams that can be used with Framed
pub trait StreamTrait: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> StreamTrait for T {}

/// Where the editor is listening
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket path
    Unix(PathBuf),
    /// `host:port`
    Tcp(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

impl FromStr for Endpoint {
    type Err = NavError;

    /// Accepts `unix:///path`, `tcp://host:port`, a bare path or a bare
    /// `host:port`
    fn from_str(addr: &str) -> Result<Self> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(NavError::usage("missing -addr"));
        }

        if addr.starts_with("tcp://") {
            let url = Url::parse(addr).map_err(|e| {
                NavError::connection(format!("Invalid TCP URL '{}': {}", addr, e))
            })?;

            let host = url
                .host_str()
                .ok_or_else(|| NavError::connection("Missing host in TCP URL"))?;
            let port = url
                .port()
                .ok_or_else(|| NavError::connection("Missing port in TCP URL"))?;

            return Ok(Self::Tcp(format!("{}:{}", host, port)));
        }

        if addr.starts_with("unix://") {
            let url = Url::parse(addr)
                .map_err(|e| NavError::connection(format!("Invalid Unix URL: {}", e)))?;
            return Ok(Self::Unix(PathBuf::from(url.path())));
        }

        // Socket paths never look like host:port, so anything with a
        // separator is a path
        if !addr.contains('/') {
            if let Some((host, port)) = addr.rsplit_once(':') {
                if !host.is_empty() && port.parse::<u16>().is_ok() {
                    return Ok(Self::Tcp(addr.to_string()));
                }
            }
        }

        Ok(Self::Unix(PathBuf::from(addr)))
    }
}

/// Knobs for [`Session::connect`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectOptions {
    /// Bound on the dial; `None` waits as long as the OS does
    pub deadline: Option<Deadline>,
    /// Stat a Unix socket before dialing it
    pub check_exists: bool,
}

/// Connected editor session
pub struct Session {
    framed: Framed<Box<dyn StreamTrait>, RpcCodec>,
    endpoint: Endpoint,
    next_msgid: u32,
}

impl Session {
    /// Open one connection to the editor
    pub async fn connect(endpoint: &Endpoint, options: ConnectOptions) -> Result<Self> {
        if options.check_exists {
            if let Endpoint::Unix(path) = endpoint {
                if tokio::fs::metadata(path).await.is_err() {
                    return Err(NavError::EditorNotRunning { path: path.clone() });
                }
            }
        }

        debug!("connecting to {}", endpoint);
        let stream = dial_within(options.deadline, open_stream(endpoint)).await?;

        Ok(Self {
            framed: Framed::new(stream, RpcCodec::new()),
            endpoint: endpoint.clone(),
            next_msgid: 0,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send one request and wait for its response
    pub async fn request(&mut self, method: &str, params: Vec<Value>) -> Result<Value> {
        let msgid = self.next_msgid;
        self.next_msgid = self.next_msgid.wrapping_add(1);

        self.framed
            .send(Message::request(msgid, method, params))
            .await
            .map_err(|e| NavError::connection(format!("Failed to send: {}", e)))?;

        loop {
            let msg = match self.framed.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(NavError::protocol(e.to_string())),
                None => return Err(NavError::ConnectionClosed),
            };

            match msg {
                Message::Response {
                    msgid: id,
                    error,
                    result,
                } if id == msgid => {
                    if !error.is_nil() {
                        return Err(NavError::batch(format!(
                            "{} failed: {}",
                            method,
                            describe_error(&error)
                        )));
                    }
                    return Ok(result);
                }
                Message::Response { msgid: id, .. } => {
                    trace!("dropping response to unknown msgid {}", id);
                }
                Message::Notification { method, .. } => {
                    trace!("ignoring notification {}", method);
                }
                Message::Request { msgid: id, method, .. } => {
                    debug!("refusing editor request {}", method);
                    let refusal = Message::Response {
                        msgid: id,
                        error: Value::from("nvedge does not serve requests"),
                        result: Value::Nil,
                    };
                    self.framed
                        .send(refusal)
                        .await
                        .map_err(|e| NavError::connection(format!("Failed to send: {}", e)))?;
                }
            }
        }
    }

    /// Evaluate `calls` as one atomic batch in a single round-trip
    ///
    /// Either every call succeeded and one result per call is returned in
    /// order, or the batch fails as a whole.
    pub async fn call_atomic(&mut self, calls: &[Call]) -> Result<Vec<Value>> {
        trace!("sending batch of {} calls", calls.len());
        let batch = Value::Array(calls.iter().map(Call::to_value).collect());
        let result = self.request(CALL_ATOMIC, vec![batch]).await?;

        let atomic = AtomicResult::try_from(result).map_err(|e| NavError::InvalidMessage(e.0))?;
        if let Some(err) = atomic.error {
            return Err(NavError::BatchRejected {
                index: err.index,
                kind: err.kind,
                message: err.message,
            });
        }
        if atomic.results.len() != calls.len() {
            return Err(NavError::batch(format!(
                "expected {} results, got {}",
                calls.len(),
                atomic.results.len()
            )));
        }

        Ok(atomic.results)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        trace!("closing session to {}", self.endpoint);
    }
}

/// Bound a dial by the deadline, reporting expiry as a connection timeout
async fn dial_within<T, F>(deadline: Option<Deadline>, dial: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(deadline) => timeout_at(deadline.at(), dial)
            .await
            .map_err(|_| NavError::ConnectionTimeout {
                millis: deadline.millis(),
            })?,
        None => dial.await,
    }
}

async fn open_stream(endpoint: &Endpoint) -> Result<Box<dyn StreamTrait>> {
    let stream: Box<dyn StreamTrait> = match endpoint {
        Endpoint::Tcp(addr) => {
            let tcp_stream = TcpStream::connect(addr).await.map_err(|e| {
                NavError::connection(format!("Failed to connect to {}: {}", addr, e))
            })?;
            Box::new(tcp_stream)
        }
        Endpoint::Unix(path) => {
            let unix_stream = UnixStream::connect(path).await.map_err(|e| {
                NavError::connection(format!("Failed to connect to {}: {}", path.display(), e))
            })?;
            Box::new(unix_stream)
        }
    };
    Ok(stream)
}
