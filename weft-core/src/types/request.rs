//! Outbound request types

use serde::{Deserialize, Serialize};

/// A single conversational turn request.
///
/// Carries the prompt and, for follow-up turns, the response identifier of
/// the previous turn so the backend can thread the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRequest {
    /// The user's prompt
    pub prompt: String,
    /// Response identifier of the prior turn, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
}

impl TurnRequest {
    /// Create a request for a fresh conversation
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            previous_response_id: None,
        }
    }

    /// Thread this request onto a prior response
    pub fn with_previous_response(mut self, id: impl Into<String>) -> Self {
        self.previous_response_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_omits_absent_id() {
        let req = TurnRequest::new("hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"prompt": "hello"}));

        let req = TurnRequest::new("and then?").with_previous_response("r1");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["previous_response_id"], "r1");
    }
}
