//! Core types and the streaming turn accumulator for the Weft chat client
//!
//! This crate provides the vocabulary shared by the wire-facing and client
//! crates: the error type, message and tool-call types, the normalized
//! mutation instruction set produced by chunk classification, and the
//! accumulator that folds mutations into a finalized message. It performs no
//! I/O of its own.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use accumulator::{resolve_call, TurnAccumulator};
pub use error::{Error, Result};
pub use types::{
    message::{Message, Role},
    request::TurnRequest,
    stream::{CallRef, Mutation, Snapshot},
    tool::{ArgumentsState, ToolCall, ToolCallStatus},
};
