//! Chunk classification for the streamed response body
//!
//! Each non-empty line of the body is one self-describing JSON object. The
//! backend speaks several incompatible shapes with no schema negotiation, so
//! classification is a closed tagged union with one variant per recognized
//! shape plus [`Chunk::Unknown`]; any future unhandled shape shows up as an
//! explicit `Unknown`, not a silently-ignored branch.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use weft_core::{CallRef, Mutation, ToolCallStatus};

/// The `delta` payload of a `response.chunk` envelope
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeltaEnvelope {
    /// Incremental text content
    #[serde(default)]
    pub content: Option<String>,
    /// A function call being opened or continued
    #[serde(default)]
    pub function_call: Option<FunctionCallDelta>,
    /// Tool calls, each opened or continued independently
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallEntry>>,
    /// Terminal marker for the whole stream
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A partial function call inside a delta envelope
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FunctionCallDelta {
    /// Tool name; present on the chunk that opens the call
    #[serde(default)]
    pub name: Option<String>,
    /// Argument fragment
    #[serde(default)]
    pub arguments: Option<String>,
}

/// One entry of a delta envelope's `tool_calls` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCallEntry {
    /// The wrapped function call fragment
    #[serde(default)]
    pub function: Option<FunctionCallDelta>,
}

/// The `item` payload of an output-item event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutputItem {
    /// Call identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Item kind, e.g. `function_call` or `web_search_call`
    #[serde(rename = "type")]
    pub kind: String,
    /// Tool name
    #[serde(default)]
    pub name: Option<String>,
    /// Alternate tool name spelling
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Inline argument payload
    #[serde(default)]
    pub inputs: Option<Value>,
    /// Terminal status reported for the item
    #[serde(default)]
    pub status: Option<String>,
    /// Result payload attached on completion
    #[serde(default)]
    pub results: Option<Value>,
}

/// A `*result*` envelope, normalized across its historical spellings
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope {
    /// Whatever identifying fields the envelope carried
    pub target: CallRef,
    /// The result payload (first of `result` / `output` / `response`)
    pub payload: Value,
}

/// Every chunk shape the classifier recognizes
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// `object == "response.chunk"` carrying a delta payload
    Delta(DeltaEnvelope),
    /// `type == "response.output_item.added"`
    ItemAdded(OutputItem),
    /// `type == "response.output_item.done"`
    ItemDone(OutputItem),
    /// `type == "response.function_call_arguments.delta"`
    ArgumentsDelta {
        /// The argument fragment
        delta: String,
    },
    /// `type == "response.function_call_arguments.done"`
    ArgumentsDone {
        /// The complete argument text
        arguments: String,
    },
    /// `type == "response.output_text.delta"`
    TextDelta {
        /// The content fragment
        delta: String,
    },
    /// Any `type` containing `result`
    CallResult(ResultEnvelope),
    /// A well-formed object matching no recognized shape
    Unknown {
        /// The discriminator that failed to match, for diagnostics
        label: String,
    },
}

impl Chunk {
    /// Classify one parsed object into a recognized shape
    pub fn classify(value: &Value) -> Chunk {
        if value.get("object").and_then(Value::as_str) == Some("response.chunk") {
            if let Some(delta) = value.get("delta") {
                if let Ok(envelope) = serde_json::from_value(delta.clone()) {
                    return Chunk::Delta(envelope);
                }
            }
            return Chunk::Unknown {
                label: "response.chunk".into(),
            };
        }

        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Chunk::Unknown { label: String::new() };
        };

        match kind {
            "response.output_item.added" | "response.output_item.done" => {
                let item = value
                    .get("item")
                    .cloned()
                    .and_then(|item| serde_json::from_value::<OutputItem>(item).ok());
                match (kind, item) {
                    ("response.output_item.added", Some(item)) => Chunk::ItemAdded(item),
                    ("response.output_item.done", Some(item)) => Chunk::ItemDone(item),
                    _ => Chunk::Unknown { label: kind.into() },
                }
            }
            "response.function_call_arguments.delta" => {
                match value.get("delta").and_then(Value::as_str) {
                    Some(delta) => Chunk::ArgumentsDelta {
                        delta: delta.to_string(),
                    },
                    None => Chunk::Unknown { label: kind.into() },
                }
            }
            "response.function_call_arguments.done" => {
                match value.get("arguments").and_then(Value::as_str) {
                    Some(arguments) => Chunk::ArgumentsDone {
                        arguments: arguments.to_string(),
                    },
                    None => Chunk::Unknown { label: kind.into() },
                }
            }
            "response.output_text.delta" => match value.get("delta").and_then(Value::as_str) {
                Some(delta) => Chunk::TextDelta {
                    delta: delta.to_string(),
                },
                None => Chunk::Unknown { label: kind.into() },
            },
            other if other.contains("result") => {
                let payload = value
                    .get("result")
                    .or_else(|| value.get("output"))
                    .or_else(|| value.get("response"))
                    .cloned();
                match payload {
                    Some(payload) => Chunk::CallResult(ResultEnvelope {
                        target: CallRef {
                            id: string_field(value, "call_id"),
                            name: string_field(value, "tool_name")
                                .or_else(|| string_field(value, "name")),
                            kind: None,
                        },
                        payload,
                    }),
                    None => Chunk::Unknown { label: other.into() },
                }
            }
            other => Chunk::Unknown { label: other.into() },
        }
    }
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(String::from)
}

/// Parses one line at a time into normalized mutation instructions
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkParser;

impl ChunkParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse and classify one complete line.
    ///
    /// Returns `None` for a line that is not a well-formed object; such
    /// lines are skipped and never abort the stream. A recognized chunk
    /// lowers into zero or more mutations, in the order they must apply.
    pub fn parse_line(&self, line: &str) -> Option<Vec<Mutation>> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                debug!(%err, "skipping malformed stream line");
                return None;
            }
        };

        let mut mutations = Vec::new();

        // Any envelope may carry the correlation token, regardless of shape.
        if let Some(id) = string_field(&value, "response_id").or_else(|| string_field(&value, "id"))
        {
            mutations.push(Mutation::SetResponseId(id));
        }

        match Chunk::classify(&value) {
            Chunk::Delta(envelope) => lower_delta(envelope, &mut mutations),
            Chunk::ItemAdded(item) => lower_item_added(item, &mut mutations),
            Chunk::ItemDone(item) => lower_item_done(item, &mut mutations),
            Chunk::ArgumentsDelta { delta } => mutations.push(Mutation::AppendArguments {
                target: CallRef::default(),
                text: delta,
            }),
            Chunk::ArgumentsDone { arguments } => mutations.push(Mutation::SetArguments {
                target: CallRef::default(),
                arguments,
            }),
            Chunk::TextDelta { delta } => mutations.push(Mutation::AppendContent(delta)),
            Chunk::CallResult(envelope) => mutations.push(Mutation::SetResult {
                target: envelope.target,
                result: envelope.payload,
            }),
            Chunk::Unknown { label } => {
                debug!(label = label.as_str(), "ignoring unrecognized stream chunk");
            }
        }

        Some(mutations)
    }
}

fn lower_delta(envelope: DeltaEnvelope, out: &mut Vec<Mutation>) {
    if let Some(content) = envelope.content {
        if !content.is_empty() {
            out.push(Mutation::AppendContent(content));
        }
    }
    if let Some(call) = envelope.function_call {
        lower_function_call_delta(call, out);
    }
    if let Some(entries) = envelope.tool_calls {
        for entry in entries {
            if let Some(call) = entry.function {
                lower_function_call_delta(call, out);
            }
        }
    }
    // Finish applies after any content or arguments in the same chunk.
    if envelope.finish_reason.is_some() {
        out.push(Mutation::Finish);
    }
}

/// A fragment with a name opens a call; one with only arguments continues
/// the call it names, or the most recent call when anonymous.
fn lower_function_call_delta(call: FunctionCallDelta, out: &mut Vec<Mutation>) {
    let name = call.name.filter(|name| !name.is_empty());
    let arguments = call.arguments.unwrap_or_default();

    if let Some(name) = name {
        out.push(Mutation::CreateCall {
            call: CallRef::by_name(name.clone()),
        });
        if !arguments.is_empty() {
            out.push(Mutation::AppendArguments {
                target: CallRef::by_name(name),
                text: arguments,
            });
        }
    } else if !arguments.is_empty() {
        out.push(Mutation::AppendArguments {
            target: CallRef::default(),
            text: arguments,
        });
    }
}

fn item_ref(item: &OutputItem) -> CallRef {
    CallRef {
        id: item.id.clone(),
        name: item.name.clone().or_else(|| item.tool_name.clone()),
        kind: Some(item.kind.clone()),
    }
}

fn item_is_call(item: &OutputItem) -> bool {
    item.kind == "function_call" || item.kind.ends_with("_call")
}

fn inputs_text(inputs: Value) -> String {
    match inputs {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn lower_item_added(item: OutputItem, out: &mut Vec<Mutation>) {
    if !item_is_call(&item) {
        debug!(kind = item.kind.as_str(), "ignoring non-call output item");
        return;
    }
    let target = item_ref(&item);
    out.push(Mutation::CreateCall {
        call: target.clone(),
    });
    if let Some(inputs) = item.inputs {
        let text = inputs_text(inputs);
        if !text.is_empty() {
            out.push(Mutation::AppendArguments { target, text });
        }
    }
}

fn lower_item_done(item: OutputItem, out: &mut Vec<Mutation>) {
    if !item_is_call(&item) {
        debug!(kind = item.kind.as_str(), "ignoring non-call output item");
        return;
    }
    let target = item_ref(&item);
    // A done without a prior added still opens the call; creation dedups.
    out.push(Mutation::CreateCall {
        call: target.clone(),
    });
    if let Some(inputs) = item.inputs {
        let text = inputs_text(inputs);
        if !text.is_empty() {
            out.push(Mutation::SetArguments {
                target: target.clone(),
                arguments: text,
            });
        }
    }
    let status = match item.status.as_deref() {
        Some("error") | Some("failed") => ToolCallStatus::Error,
        _ => ToolCallStatus::Completed,
    };
    out.push(Mutation::SetStatus {
        target: target.clone(),
        status,
    });
    if let Some(results) = item.results {
        out.push(Mutation::SetResult {
            target,
            result: results,
        });
    }
}
