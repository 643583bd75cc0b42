//! nvedge-protocol: msgpack-rpc definitions for talking to neovim
//!
//! This crate defines the message model, the stream codec, and the shape of
//! `nvim_call_atomic` batches used by the nvedge client.

pub mod codec;
pub mod messages;

// Re-export main types at crate root
pub use codec::{CodecError, RpcCodec};
pub use messages::{AtomicError, AtomicResult, Call, InvalidMessage, Message};

/// API method that evaluates a list of calls as one unit
pub const CALL_ATOMIC: &str = "nvim_call_atomic";
