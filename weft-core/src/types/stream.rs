//! Normalized mutation instructions produced by chunk classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::{ToolCall, ToolCallStatus};

/// Identifying information a chunk carries about the call it targets.
///
/// Any combination of fields may be present. A ref with no fields at all is
/// an anonymous continuation and targets the most recently created call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRef {
    /// Wire identifier of the call
    pub id: Option<String>,
    /// Declared tool name
    pub name: Option<String>,
    /// Declared item kind (e.g. `function_call`, `web_search_call`)
    pub kind: Option<String>,
}

impl CallRef {
    /// A ref that names a call by id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// A ref that names a call by tool name
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether the ref carries no identifying information at all
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.kind.is_none()
    }
}

/// One normalized instruction against the turn accumulator.
///
/// The chunk classifier lowers every recognized wire shape into a sequence
/// of these; the accumulator applies them in strict arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append a text fragment to the running content
    AppendContent(String),
    /// Create a tool call (or re-target an existing one with the same identity)
    CreateCall {
        /// Identity of the call being opened
        call: CallRef,
    },
    /// Concatenate an argument fragment onto a call's raw buffer
    AppendArguments {
        /// Which call the fragment belongs to
        target: CallRef,
        /// The fragment text
        text: String,
    },
    /// Replace a call's argument buffer with authoritative full text
    SetArguments {
        /// Which call is being closed
        target: CallRef,
        /// The complete argument text
        arguments: String,
    },
    /// Move a call to a terminal status
    SetStatus {
        /// Which call is affected
        target: CallRef,
        /// The terminal status reported on the wire
        status: ToolCallStatus,
    },
    /// Attach a result payload to a call
    SetResult {
        /// Which call the result belongs to
        target: CallRef,
        /// The result payload as delivered
        result: Value,
    },
    /// Record the stream's correlation token (last write wins)
    SetResponseId(String),
    /// Terminal marker: force a parse attempt on every pending call
    Finish,
}

/// Read-only view of the accumulator after a fully-applied mutation.
///
/// Intended for progressive rendering; never exposes partially-mutated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Content accumulated so far
    pub content: String,
    /// Tool calls in creation order, with their current state
    pub tool_calls: Vec<ToolCall>,
    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,
}
