//! Turn accumulator: folds mutation instructions into a finalized message
//!
//! Exactly one read loop writes to an accumulator, applying mutations in
//! strict arrival order. That single-writer discipline is what upholds the
//! append-only invariants on content and the tool-call list.

use chrono::Utc;
use tracing::{debug, warn};

use crate::types::message::{Message, Role};
use crate::types::stream::{CallRef, Mutation, Snapshot};
use crate::types::tool::{ArgumentsState, ToolCall, ToolCallStatus};

/// Resolve which existing tool call a ref targets.
///
/// First match wins, in this order:
/// 1. exact id match;
/// 2. exact name match;
/// 3. name equality combined with declared kind equality;
/// 4. substring heuristic: an existing call's name is contained in the
///    incoming kind with its `_call` suffix stripped, or vice versa.
///
/// Anonymous refs are not handled here; they follow the accumulator's
/// most-recently-created-call cursor.
pub fn resolve_call(calls: &[ToolCall], r: &CallRef) -> Option<usize> {
    if let Some(id) = &r.id {
        if let Some(idx) = calls.iter().position(|c| c.id.as_deref() == Some(id)) {
            return Some(idx);
        }
    }
    if let Some(name) = &r.name {
        if let Some(idx) = calls.iter().position(|c| &c.name == name) {
            return Some(idx);
        }
    }
    if let (Some(name), Some(kind)) = (&r.name, &r.kind) {
        if let Some(idx) = calls
            .iter()
            .position(|c| &c.name == name && c.kind.as_deref() == Some(kind))
        {
            return Some(idx);
        }
    }
    if let Some(kind) = &r.kind {
        let stripped = strip_call_suffix(kind);
        if !stripped.is_empty() {
            if let Some(idx) = calls
                .iter()
                .position(|c| stripped.contains(c.name.as_str()) || c.name.contains(stripped))
            {
                return Some(idx);
            }
        }
    }
    None
}

fn strip_call_suffix(kind: &str) -> &str {
    kind.strip_suffix("_call").unwrap_or(kind)
}

/// Accumulates one stream's mutations into a conversational turn.
///
/// Owns the running content, the ordered tool-call list, and the response
/// identifier for a single stream. Never reused across streams.
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    content: String,
    tool_calls: Vec<ToolCall>,
    response_id: Option<String>,
    /// Index of the most recently created call; anonymous argument
    /// continuations target this. Known simplification: assumes no two
    /// calls interleave their anonymous continuations within one stream.
    current_open_call: Option<usize>,
    finalized: Option<Message>,
}

impl TurnAccumulator {
    /// Create a fresh accumulator for one stream
    pub fn new() -> Self {
        Self::default()
    }

    /// The content accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The tool calls created so far, in creation order
    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }

    /// The last response identifier seen on the wire
    pub fn response_id(&self) -> Option<&str> {
        self.response_id.as_deref()
    }

    /// Whether `finalize` has already run
    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    /// Apply one mutation in arrival order.
    ///
    /// Mutations arriving after finalization are dropped; the finalized
    /// message is immutable.
    pub fn apply(&mut self, mutation: Mutation) {
        if self.finalized.is_some() {
            debug!(?mutation, "mutation after finalization dropped");
            return;
        }
        match mutation {
            Mutation::AppendContent(text) => self.content.push_str(&text),
            Mutation::CreateCall { call } => self.create_call(call),
            Mutation::AppendArguments { target, text } => self.append_arguments(&target, &text),
            Mutation::SetArguments { target, arguments } => {
                self.set_arguments(&target, arguments);
            }
            Mutation::SetStatus { target, status } => self.set_status(&target, status),
            Mutation::SetResult { target, result } => {
                if let Some(idx) = self.resolve_target(&target) {
                    self.tool_calls[idx].result = Some(result);
                } else {
                    debug!(?target, "result for unknown call dropped");
                }
            }
            Mutation::SetResponseId(id) => self.set_response_id(id),
            Mutation::Finish => self.finish_pending(),
        }
    }

    /// Read-only view of the state after the last fully-applied mutation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Close the turn and emit the one immutable message.
    ///
    /// Every call still pending gets a last parse attempt: success completes
    /// it, failure marks it `Error` with the raw text preserved as the
    /// fallback value. Idempotent: a second call returns the same message.
    pub fn finalize(&mut self) -> Message {
        if let Some(message) = &self.finalized {
            return message.clone();
        }
        for call in &mut self.tool_calls {
            if call.status != ToolCallStatus::Pending {
                continue;
            }
            if call.raw_arguments.is_empty() || !call.try_parse_arguments() {
                call.status = ToolCallStatus::Error;
                call.arguments_state = ArgumentsState::Invalid;
            }
        }
        let message = Message {
            role: Role::Assistant,
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone(),
            response_id: self.response_id.clone(),
            timestamp: Utc::now(),
        };
        self.finalized = Some(message.clone());
        message
    }

    fn resolve_target(&self, target: &CallRef) -> Option<usize> {
        if target.is_anonymous() {
            self.current_open_call
        } else {
            resolve_call(&self.tool_calls, target)
        }
    }

    fn create_call(&mut self, call: CallRef) {
        if let Some(idx) = resolve_call(&self.tool_calls, &call) {
            // A second create for a known call only fills in missing identity
            let existing = &mut self.tool_calls[idx];
            if existing.id.is_none() {
                existing.id = call.id;
            }
            if existing.kind.is_none() {
                existing.kind = call.kind;
            }
            self.current_open_call = Some(idx);
            return;
        }
        let name = match call
            .name
            .clone()
            .or_else(|| call.kind.as_deref().map(|k| strip_call_suffix(k).to_string()))
        {
            Some(name) if !name.is_empty() => name,
            _ => {
                debug!(?call, "create instruction without a usable name dropped");
                return;
            }
        };
        let mut tool_call = ToolCall::pending(name);
        tool_call.id = call.id;
        tool_call.kind = call.kind;
        self.tool_calls.push(tool_call);
        self.current_open_call = Some(self.tool_calls.len() - 1);
    }

    fn append_arguments(&mut self, target: &CallRef, text: &str) {
        let Some(idx) = self.resolve_target(target) else {
            // A continuation arriving before any call exists is dropped by
            // design; no placeholder call is synthesized.
            debug!("argument fragment with no open call dropped");
            return;
        };
        let call = &mut self.tool_calls[idx];
        call.raw_arguments.push_str(text);
        // Speculative parse: only worth attempting once a closing brace
        // could have arrived.
        if call.raw_arguments.contains('}') {
            call.try_parse_arguments();
        }
    }

    fn set_arguments(&mut self, target: &CallRef, arguments: String) {
        let Some(idx) = self.resolve_target(target) else {
            debug!("final arguments with no open call dropped");
            return;
        };
        let call = &mut self.tool_calls[idx];
        call.raw_arguments = arguments;
        call.try_parse_arguments();
    }

    fn set_status(&mut self, target: &CallRef, status: ToolCallStatus) {
        let Some(idx) = self.resolve_target(target) else {
            debug!(?target, "status for unknown call dropped");
            return;
        };
        let call = &mut self.tool_calls[idx];
        if call.status.is_terminal() {
            return;
        }
        if status == ToolCallStatus::Completed && !call.raw_arguments.is_empty() {
            call.try_parse_arguments();
        }
        call.status = status;
    }

    fn set_response_id(&mut self, id: String) {
        if let Some(existing) = &self.response_id {
            if existing != &id {
                warn!(
                    previous = existing.as_str(),
                    next = id.as_str(),
                    "response id diverged within one stream; keeping the newest"
                );
            }
        }
        self.response_id = Some(id);
    }

    fn finish_pending(&mut self) {
        for call in &mut self.tool_calls {
            if call.status == ToolCallStatus::Pending && !call.raw_arguments.is_empty() {
                call.try_parse_arguments();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn call(name: &str, id: Option<&str>, kind: Option<&str>) -> ToolCall {
        let mut c = ToolCall::pending(name);
        c.id = id.map(String::from);
        c.kind = kind.map(String::from);
        c
    }

    #[test]
    fn test_resolve_prefers_id_over_name() {
        let calls = vec![
            call("search", Some("c1"), None),
            call("lookup", Some("c2"), None),
        ];
        let r = CallRef {
            id: Some("c2".into()),
            name: Some("search".into()),
            kind: None,
        };
        assert_eq!(resolve_call(&calls, &r), Some(1));
    }

    #[test]
    fn test_resolve_by_name() {
        let calls = vec![call("search", Some("c1"), None), call("lookup", None, None)];
        assert_eq!(resolve_call(&calls, &CallRef::by_name("lookup")), Some(1));
    }

    #[test]
    fn test_resolve_by_kind_heuristic() {
        let calls = vec![call("web_search", None, Some("web_search_call"))];
        let r = CallRef {
            id: None,
            name: None,
            kind: Some("web_search_call".into()),
        };
        assert_eq!(resolve_call(&calls, &r), Some(0));

        // Vice versa: the stripped kind is a substring of the call name
        let calls = vec![call("web_search_preview", None, None)];
        let r = CallRef {
            id: None,
            name: None,
            kind: Some("web_search_call".into()),
        };
        assert_eq!(resolve_call(&calls, &r), Some(0));
    }

    #[test]
    fn test_resolve_no_match() {
        let calls = vec![call("search", Some("c1"), None)];
        assert_eq!(resolve_call(&calls, &CallRef::by_id("c9")), None);
        assert_eq!(resolve_call(&calls, &CallRef::by_name("other")), None);
    }

    #[test]
    fn test_content_is_append_only() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::AppendContent("Hello".into()));
        acc.apply(Mutation::AppendContent(" world".into()));
        assert_eq!(acc.content(), "Hello world");
    }

    #[test]
    fn test_create_call_dedups_by_id() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef {
                id: Some("c1".into()),
                name: Some("search".into()),
                kind: None,
            },
        });
        acc.apply(Mutation::CreateCall {
            call: CallRef {
                id: Some("c1".into()),
                name: Some("search".into()),
                kind: Some("function_call".into()),
            },
        });
        assert_eq!(acc.tool_calls().len(), 1);
        // The second create filled in the missing kind
        assert_eq!(acc.tool_calls()[0].kind.as_deref(), Some("function_call"));
    }

    #[test]
    fn test_create_call_derives_name_from_kind() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef {
                id: Some("c1".into()),
                name: None,
                kind: Some("web_search_call".into()),
            },
        });
        assert_eq!(acc.tool_calls()[0].name, "web_search");
    }

    #[test]
    fn test_anonymous_append_targets_latest_call() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("first"),
        });
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("second"),
        });
        acc.apply(Mutation::AppendArguments {
            target: CallRef::default(),
            text: "{\"a\":1}".into(),
        });
        assert_eq!(acc.tool_calls()[0].raw_arguments, "");
        assert_eq!(acc.tool_calls()[1].raw_arguments, "{\"a\":1}");
    }

    #[test]
    fn test_anonymous_append_with_no_calls_is_noop() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::AppendArguments {
            target: CallRef::default(),
            text: "{\"a\":1}".into(),
        });
        assert!(acc.tool_calls().is_empty());
    }

    #[test]
    fn test_speculative_parse_waits_for_closing_brace() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("search"),
        });
        acc.apply(Mutation::AppendArguments {
            target: CallRef::default(),
            text: "{\"q\":".into(),
        });
        assert_eq!(acc.tool_calls()[0].status, ToolCallStatus::Pending);

        acc.apply(Mutation::AppendArguments {
            target: CallRef::default(),
            text: "\"cats\"}".into(),
        });
        let call = &acc.tool_calls()[0];
        assert_eq!(call.status, ToolCallStatus::Completed);
        assert_eq!(call.parsed_arguments, Some(json!({"q": "cats"})));
    }

    #[test]
    fn test_set_status_never_rewrites_terminal() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("search"),
        });
        acc.apply(Mutation::SetStatus {
            target: CallRef::by_name("search"),
            status: ToolCallStatus::Error,
        });
        acc.apply(Mutation::SetStatus {
            target: CallRef::by_name("search"),
            status: ToolCallStatus::Completed,
        });
        assert_eq!(acc.tool_calls()[0].status, ToolCallStatus::Error);
    }

    #[test]
    fn test_result_attaches_to_resolved_call() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef {
                id: Some("c1".into()),
                name: Some("search".into()),
                kind: None,
            },
        });
        acc.apply(Mutation::SetResult {
            target: CallRef::by_id("c1"),
            result: json!([{"filename": "a.txt"}]),
        });
        assert_eq!(
            acc.tool_calls()[0].result,
            Some(json!([{"filename": "a.txt"}]))
        );
    }

    #[test]
    fn test_response_id_last_write_wins() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::SetResponseId("r1".into()));
        acc.apply(Mutation::SetResponseId("r2".into()));
        assert_eq!(acc.response_id(), Some("r2"));
    }

    #[test]
    fn test_finalize_marks_unparsed_calls_as_error() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("search"),
        });
        acc.apply(Mutation::AppendArguments {
            target: CallRef::default(),
            text: "not json {".into(),
        });
        let message = acc.finalize();

        let call = &message.tool_calls[0];
        assert_eq!(call.status, ToolCallStatus::Error);
        assert_eq!(call.arguments_state, ArgumentsState::Invalid);
        // The raw text survives as the fallback value
        assert_eq!(call.raw_arguments, "not json {");
        assert!(call.parsed_arguments.is_none());
    }

    #[test]
    fn test_finalize_completes_parseable_pending_calls() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::CreateCall {
            call: CallRef::by_name("search"),
        });
        // No closing brace seen mid-stream, so the call is still pending
        acc.tool_calls[0].raw_arguments = "null".into();
        let message = acc.finalize();
        assert_eq!(message.tool_calls[0].status, ToolCallStatus::Completed);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::AppendContent("Hello".into()));
        acc.apply(Mutation::SetResponseId("r1".into()));

        let first = acc.finalize();
        let second = acc.finalize();
        assert_eq!(first, second);
        assert_eq!(first.content, "Hello");
        assert_eq!(first.response_id.as_deref(), Some("r1"));
        assert_eq!(first.role, Role::Assistant);
    }

    #[test]
    fn test_mutations_after_finalize_are_dropped() {
        let mut acc = TurnAccumulator::new();
        acc.apply(Mutation::AppendContent("Hello".into()));
        acc.finalize();
        acc.apply(Mutation::AppendContent(" world".into()));
        assert_eq!(acc.content(), "Hello");
        assert_eq!(acc.finalize().content, "Hello");
    }
}
