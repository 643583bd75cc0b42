//! msgpack-rpc message types
//!
//! A message on the wire is a msgpack array whose first element is the
//! message type: 0 for requests, 1 for responses, 2 for notifications.

use rmpv::Value;

const TYPE_REQUEST: u64 = 0;
const TYPE_RESPONSE: u64 = 1;
const TYPE_NOTIFICATION: u64 = 2;

/// A value could not be interpreted as a protocol message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid message: {0}")]
pub struct InvalidMessage(pub String);

impl InvalidMessage {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// One msgpack-rpc message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// `[0, msgid, method, params]`
    Request {
        msgid: u32,
        method: String,
        params: Vec<Value>,
    },

    /// `[1, msgid, error, result]`; `error` is nil on success
    Response {
        msgid: u32,
        error: Value,
        result: Value,
    },

    /// `[2, method, params]`
    Notification { method: String, params: Vec<Value> },
}

impl Message {
    /// Build a request message
    pub fn request(msgid: u32, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self::Request {
            msgid,
            method: method.into(),
            params,
        }
    }

    /// Convert to the array form written on the wire
    pub fn to_value(&self) -> Value {
        match self {
            Self::Request {
                msgid,
                method,
                params,
            } => Value::Array(vec![
                Value::from(TYPE_REQUEST),
                Value::from(*msgid),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
            Self::Response {
                msgid,
                error,
                result,
            } => Value::Array(vec![
                Value::from(TYPE_RESPONSE),
                Value::from(*msgid),
                error.clone(),
                result.clone(),
            ]),
            Self::Notification { method, params } => Value::Array(vec![
                Value::from(TYPE_NOTIFICATION),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
        }
    }
}

impl TryFrom<Value> for Message {
    type Error = InvalidMessage;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Err(InvalidMessage::new("message is not an array"));
        };

        let mut items = items.into_iter();
        let kind = items
            .next()
            .and_then(|v| v.as_u64())
            .ok_or_else(|| InvalidMessage::new("missing message type"))?;

        match (kind, items.len()) {
            (TYPE_REQUEST, 3) => {
                let msgid = take_msgid(&mut items)?;
                let method = take_string(&mut items, "method")?;
                let params = take_array(&mut items, "params")?;
                Ok(Self::Request {
                    msgid,
                    method,
                    params,
                })
            }
            (TYPE_RESPONSE, 3) => {
                let msgid = take_msgid(&mut items)?;
                let error = items.next().unwrap_or(Value::Nil);
                let result = items.next().unwrap_or(Value::Nil);
                Ok(Self::Response {
                    msgid,
                    error,
                    result,
                })
            }
            (TYPE_NOTIFICATION, 2) => {
                let method = take_string(&mut items, "method")?;
                let params = take_array(&mut items, "params")?;
                Ok(Self::Notification { method, params })
            }
            (TYPE_REQUEST | TYPE_RESPONSE | TYPE_NOTIFICATION, n) => Err(InvalidMessage(format!(
                "message type {} with {} fields",
                kind,
                n + 1
            ))),
            (other, _) => Err(InvalidMessage(format!("unknown message type {}", other))),
        }
    }
}

fn take_msgid(items: &mut impl Iterator<Item = Value>) -> Result<u32, InvalidMessage> {
    items
        .next()
        .and_then(|v| v.as_u64())
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| InvalidMessage::new("msgid is not a u32"))
}

fn take_string(
    items: &mut impl Iterator<Item = Value>,
    field: &str,
) -> Result<String, InvalidMessage> {
    match items.next() {
        Some(Value::String(s)) => s
            .into_str()
            .ok_or_else(|| InvalidMessage(format!("{} is not valid UTF-8", field))),
        _ => Err(InvalidMessage(format!("{} is not a string", field))),
    }
}

fn take_array(
    items: &mut impl Iterator<Item = Value>,
    field: &str,
) -> Result<Vec<Value>, InvalidMessage> {
    match items.next() {
        Some(Value::Array(values)) => Ok(values),
        _ => Err(InvalidMessage(format!("{} is not an array", field))),
    }
}

/// One API call inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Value>,
}

impl Call {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// `[method, args]`, the element shape `nvim_call_atomic` expects
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.method.as_str()),
            Value::Array(self.args.clone()),
        ])
    }
}

/// Failure report embedded in an atomic result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicError {
    /// Index of the call that failed
    pub index: usize,
    /// Editor error type (0 = exception, 1 = validation)
    pub kind: i64,
    pub message: String,
}

/// Result of `nvim_call_atomic`: `[results, nil | [index, kind, message]]`
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicResult {
    /// Results of the calls that ran before any failure
    pub results: Vec<Value>,
    pub error: Option<AtomicError>,
}

impl TryFrom<Value> for AtomicResult {
    type Error = InvalidMessage;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Array(items) = value else {
            return Err(InvalidMessage::new("atomic result is not an array"));
        };
        if items.len() != 2 {
            return Err(InvalidMessage(format!(
                "atomic result has {} fields, expected 2",
                items.len()
            )));
        }

        let mut items = items.into_iter();
        let results = take_array(&mut items, "atomic results")?;
        let error = match items.next() {
            None | Some(Value::Nil) => None,
            Some(Value::Array(err)) => Some(parse_atomic_error(err)?),
            Some(_) => return Err(InvalidMessage::new("atomic error is not an array")),
        };

        Ok(Self { results, error })
    }
}

fn parse_atomic_error(err: Vec<Value>) -> Result<AtomicError, InvalidMessage> {
    if err.len() != 3 {
        return Err(InvalidMessage(format!(
            "atomic error has {} fields, expected 3",
            err.len()
        )));
    }

    let index = err[0]
        .as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| InvalidMessage::new("atomic error index is not an integer"))?;
    let kind = err[1]
        .as_i64()
        .ok_or_else(|| InvalidMessage::new("atomic error type is not an integer"))?;
    let message = err[2]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| err[2].to_string());

    Ok(AtomicError {
        index,
        kind,
        message,
    })
}

/// Render a response error value as text
///
/// The editor reports request errors as `[type, message]`.
pub fn describe_error(error: &Value) -> String {
    match error {
        Value::Array(parts) if parts.len() == 2 && parts[1].is_str() => {
            parts[1].as_str().unwrap_or_default().to_string()
        }
        Value::String(s) => s.as_str().unwrap_or_default().to_string(),
        other => other.to_string(),
    }
}
