use serde::{Deserialize, Serialize};

use crate::config::{build_prompt, COMPLETION_MODEL};

// -- Request body for an OpenAI-compatible chat completion endpoint --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatCompletionRequest {
    /// Single user message asking for a simple explanation of `text`
    pub fn explain(text: &str) -> Self {
        Self {
            model: COMPLETION_MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(text),
            }],
        }
    }
}

/// Pull `choices[0].message.content` out of a completion reply.
///
/// Any structural gap (no choices, no message, non-string or empty content)
/// yields `None`.
pub fn first_choice_content(body: &serde_json::Value) -> Option<&str> {
    body.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .filter(|content| !content.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatCompletionRequest::explain("lifetimes")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "llama3-70b-8192",
                "messages": [{
                    "role": "user",
                    "content": "Explain this in simple terms:\n\n\"lifetimes\"",
                }],
            })
        );
    }

    #[test]
    fn test_extracts_first_choice() {
        let body = json!({
            "choices": [
                {"message": {"role": "assistant", "content": "first"}},
                {"message": {"role": "assistant", "content": "second"}},
            ]
        });
        assert_eq!(first_choice_content(&body), Some("first"));
    }

    #[test]
    fn test_structural_gaps_yield_none() {
        for body in [
            json!({}),
            json!(null),
            json!({"choices": []}),
            json!({"choices": "nope"}),
            json!({"choices": [{}]}),
            json!({"choices": [{"message": {}}]}),
            json!({"choices": [{"message": {"content": 42}}]}),
            json!({"choices": [{"message": {"content": ""}}]}),
            json!({"error": {"message": "invalid api key"}}),
        ] {
            assert_eq!(first_choice_content(&body), None, "body: {}", body);
        }
    }
}
