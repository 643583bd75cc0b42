//! Message codec for msgpack-rpc streams
//!
//! msgpack values are self-delimiting, so frames carry no length prefix.
//! The decoder reads one value at a time and waits for more bytes when the
//! buffer ends in the middle of a value.

use std::io::{self, Cursor};

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::messages::{InvalidMessage, Message};

/// Maximum message size (16 MB)
const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("msgpack decode error: {0}")]
    Decode(String),

    #[error("msgpack encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Invalid(#[from] InvalidMessage),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Codec for msgpack-rpc messages in both directions
///
/// The client uses it to talk to the editor; tests use the same codec to
/// play the editor's side.
#[derive(Debug, Default)]
pub struct RpcCodec;

impl RpcCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for RpcCodec {
    type Item = Message;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut cursor = Cursor::new(&src[..]);
        let value = match rmpv::decode::read_value(&mut cursor) {
            Ok(value) => value,
            Err(e) if is_incomplete(&e) => {
                if src.len() > MAX_MESSAGE_SIZE {
                    return Err(CodecError::MessageTooLarge {
                        size: src.len(),
                        max: MAX_MESSAGE_SIZE,
                    });
                }
                return Ok(None);
            }
            Err(e) => return Err(CodecError::Decode(e.to_string())),
        };
        let consumed = cursor.position() as usize;

        if consumed > MAX_MESSAGE_SIZE {
            return Err(CodecError::MessageTooLarge {
                size: consumed,
                max: MAX_MESSAGE_SIZE,
            });
        }

        src.advance(consumed);
        Ok(Some(Message::try_from(value)?))
    }
}

impl Encoder<Message> for RpcCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut data = Vec::new();
        rmpv::encode::write_value(&mut data, &item.to_value())
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        if data.len() > MAX_MESSAGE_SIZE {
            return Err(CodecError::MessageTooLarge {
                size: data.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        dst.reserve(data.len());
        dst.put_slice(&data);
        Ok(())
    }
}

/// A read that ran off the end of the buffer means the value is incomplete
fn is_incomplete(err: &rmpv::decode::Error) -> bool {
    match err {
        rmpv::decode::Error::InvalidMarkerRead(e) | rmpv::decode::Error::InvalidDataRead(e) => {
            e.kind() == io::ErrorKind::UnexpectedEof
        }
        #[allow(unreachable_patterns)]
        _ => false,
    }
}
