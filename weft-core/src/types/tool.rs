//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a tool call over its lifetime.
///
/// The only transitions are `Pending -> Completed` and `Pending -> Error`;
/// both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    /// Arguments are still arriving or have not parsed yet
    Pending,
    /// The call is closed with usable arguments
    Completed,
    /// The argument buffer never became valid structured data
    Error,
}

impl ToolCallStatus {
    /// Whether this status admits no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolCallStatus::Completed | ToolCallStatus::Error)
    }
}

/// Parse state of a call's argument buffer.
///
/// Each argument append may opportunistically attempt a parse; this keeps
/// that lifecycle explicit instead of scattering try-parse calls around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentsState {
    /// Fragments are still being concatenated; the buffer has not parsed
    Accumulating,
    /// The buffer parsed as a complete structured value
    Parsed,
    /// The buffer never parsed by stream end; the raw text is the fallback
    Invalid,
}

/// A tool call requested by the model during one stream.
///
/// Owned exclusively by that stream's accumulator: created once, mutated in
/// place, never removed and never shared across streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Wire identifier for this call, when the stream supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the tool being called
    pub name: String,
    /// Declared item kind on the wire (e.g. `function_call`, `web_search_call`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Lifecycle status
    pub status: ToolCallStatus,
    /// Concatenated raw argument text as delivered, preserved verbatim
    pub raw_arguments: String,
    /// Parsed arguments, once the buffer parses as a complete value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_arguments: Option<Value>,
    /// Result payload attached by a done/result chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Parse state of the argument buffer
    pub arguments_state: ArgumentsState,
}

impl ToolCall {
    /// Create a new pending call
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: None,
            status: ToolCallStatus::Pending,
            raw_arguments: String::new(),
            parsed_arguments: None,
            result: None,
            arguments_state: ArgumentsState::Accumulating,
        }
    }

    /// Attempt to parse the raw argument buffer as a complete value.
    ///
    /// On success the parsed value is stored, the buffer state becomes
    /// `Parsed`, and a pending call is completed. On failure nothing
    /// changes; the caller retries on the next append.
    pub fn try_parse_arguments(&mut self) -> bool {
        if self.arguments_state == ArgumentsState::Parsed {
            return true;
        }
        match serde_json::from_str::<Value>(&self.raw_arguments) {
            Ok(value) => {
                self.parsed_arguments = Some(value);
                self.arguments_state = ArgumentsState::Parsed;
                if self.status == ToolCallStatus::Pending {
                    self.status = ToolCallStatus::Completed;
                }
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_terminality() {
        assert!(!ToolCallStatus::Pending.is_terminal());
        assert!(ToolCallStatus::Completed.is_terminal());
        assert!(ToolCallStatus::Error.is_terminal());
    }

    #[test]
    fn test_try_parse_arguments_success() {
        let mut call = ToolCall::pending("search");
        call.raw_arguments = r#"{"q":"cats"}"#.into();

        assert!(call.try_parse_arguments());
        assert_eq!(call.parsed_arguments, Some(json!({"q": "cats"})));
        assert_eq!(call.status, ToolCallStatus::Completed);
        assert_eq!(call.arguments_state, ArgumentsState::Parsed);
    }

    #[test]
    fn test_try_parse_arguments_partial_buffer() {
        let mut call = ToolCall::pending("search");
        call.raw_arguments = r#"{"q":"#.into();

        assert!(!call.try_parse_arguments());
        assert_eq!(call.status, ToolCallStatus::Pending);
        assert_eq!(call.arguments_state, ArgumentsState::Accumulating);
        // The raw text is untouched so the next append can continue
        assert_eq!(call.raw_arguments, r#"{"q":"#);
    }

    #[test]
    fn test_try_parse_keeps_terminal_status() {
        let mut call = ToolCall::pending("search");
        call.status = ToolCallStatus::Error;
        call.raw_arguments = "{}".into();

        assert!(call.try_parse_arguments());
        // A terminal status is never rewritten by a late parse
        assert_eq!(call.status, ToolCallStatus::Error);
    }
}
