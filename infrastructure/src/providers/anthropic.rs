//! Anthropic Messages API adapter for [`CompletionProvider`].
//!
//! Cache markers set by the engine are forwarded as
//! `cache_control: {"type": "ephemeral"}` on the marked system block, tool
//! definition and content block.

use async_trait::async_trait;
use prismatic_application::ports::completion_provider::{
    CompletionProvider, CompletionRequest, ProviderError,
};
use prismatic_domain::util::truncate_str;
use prismatic_domain::{ContentBlock, StopReason, TurnResult, Usage};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

/// Connection settings for the Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    /// Model used when the request does not name one.
    pub default_model: String,
    pub timeout: Option<Duration>,
}

pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Other(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }
}

/// Raw (non-JSON) error bodies are cut to this many bytes.
const MAX_ERROR_BODY: usize = 500;

/// Build the JSON body of a Messages API call.
pub fn request_body(request: &CompletionRequest, default_model: &str) -> Value {
    let params = &request.params;
    let mut body = json!({
        "model": params.model.as_deref().unwrap_or(default_model),
        "max_tokens": params.max_tokens,
        "messages": request.messages.iter().map(|m| m.as_ref()).collect::<Vec<_>>(),
    });

    if !request.system.is_empty() {
        let system: Vec<Value> = request
            .system
            .iter()
            .map(|block| {
                let mut value = json!({"type": "text", "text": block.text});
                if let Some(marker) = block.cache_control {
                    value["cache_control"] = json!(marker);
                }
                value
            })
            .collect();
        body["system"] = Value::Array(system);
    }
    if !request.tools.is_empty() {
        body["tools"] = json!(request.tools.iter().map(|t| t.as_ref()).collect::<Vec<_>>());
    }
    if !params.stop_sequences.is_empty() {
        body["stop_sequences"] = json!(params.stop_sequences);
    }
    body
}

/// Map a non-success HTTP response to a classified error.
pub fn classify_error(status: u16, body: &str) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error_type = parsed
        .as_ref()
        .and_then(|v| v["error"]["type"].as_str())
        .unwrap_or_default()
        .to_string();
    let message = parsed
        .as_ref()
        .and_then(|v| v["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| truncate_str(body.trim(), MAX_ERROR_BODY).to_string());

    match (status, error_type.as_str()) {
        (429, _) | (_, "rate_limit_error") => ProviderError::RateLimited(message),
        (529, _) | (_, "overloaded_error") => ProviderError::Overloaded(message),
        (503, _) => ProviderError::Unavailable(message),
        (_, "invalid_request_error") => ProviderError::InvalidRequest(message),
        _ => ProviderError::Api { status, message },
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    content: Vec<WireBlock>,
    stop_reason: Option<String>,
    model: Option<String>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUsage {
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

/// Parse a successful Messages API response body.
pub fn parse_response(body: &str) -> Result<TurnResult, ProviderError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let content = wire
        .content
        .into_iter()
        .filter_map(|block| match block {
            WireBlock::Text { text } => Some(ContentBlock::text(text)),
            WireBlock::ToolUse { id, name, input } => Some(ContentBlock::tool_use(id, name, input)),
            WireBlock::Unsupported => None,
        })
        .collect();

    Ok(TurnResult {
        content,
        stop_reason: wire
            .stop_reason
            .as_deref()
            .map(StopReason::from_wire)
            .unwrap_or(StopReason::EndTurn),
        usage: Usage {
            input_tokens: wire.usage.input_tokens,
            output_tokens: wire.usage.output_tokens,
            cache_creation_input_tokens: wire.usage.cache_creation_input_tokens.unwrap_or(0),
            cache_read_input_tokens: wire.usage.cache_read_input_tokens.unwrap_or(0),
        },
        model: wire.model,
    })
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<TurnResult, ProviderError> {
        let body = request_body(request, &self.config.default_model);
        debug!(
            "POST {} ({} messages, {} tools)",
            self.endpoint(),
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &text));
        }
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prismatic_domain::{
        CacheControl, GenerationParams, Message, SystemBlock, ToolDefinition, annotate_messages,
        annotate_system, annotate_tools,
    };
    use std::sync::Arc;

    #[test]
    fn test_request_body_carries_cache_markers() {
        let request = CompletionRequest {
            system: annotate_system(&[SystemBlock::new("You review code.")]),
            messages: annotate_messages(&[Arc::new(Message::user("diff"))]),
            tools: annotate_tools(&[Arc::new(ToolDefinition::new("read_file", "Read"))]),
            params: GenerationParams::default().with_stop_sequences(vec!["END".to_string()]),
        };

        let body = request_body(&request, "claude-test");

        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["max_tokens"], 4000);
        assert_eq!(body["system"][0]["type"], "text");
        assert_eq!(body["system"][0]["cache_control"]["type"], "ephemeral");
        assert_eq!(body["tools"][0]["name"], "read_file");
        assert_eq!(body["tools"][0]["cache_control"]["type"], "ephemeral");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(
            body["messages"][0]["content"][0]["cache_control"],
            json!(CacheControl::Ephemeral)
        );
        assert_eq!(body["stop_sequences"][0], "END");
    }

    #[test]
    fn test_request_body_omits_empty_sections() {
        let request = CompletionRequest {
            system: Vec::new(),
            messages: vec![Arc::new(Message::user("hi"))],
            tools: Vec::new(),
            params: GenerationParams::default().with_model("claude-override"),
        };

        let body = request_body(&request, "claude-test");

        assert_eq!(body["model"], "claude-override");
        assert!(body.get("system").is_none());
        assert!(body.get("tools").is_none());
        assert!(body.get("stop_sequences").is_none());
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(classify_error(429, ""), ProviderError::RateLimited(_)));
        assert!(matches!(classify_error(529, ""), ProviderError::Overloaded(_)));
        assert!(matches!(classify_error(503, "down"), ProviderError::Unavailable(_)));

        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(
            classify_error(500, body),
            ProviderError::Overloaded("Overloaded".to_string())
        );

        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(
            classify_error(401, body),
            ProviderError::Api {
                status: 401,
                message: "invalid x-api-key".to_string()
            }
        );

        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"prompt is too long"}}"#;
        assert!(!classify_error(400, body).is_transient());
    }

    #[test]
    fn test_parse_tool_use_response() {
        let body = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-7-sonnet-20250219",
            "content": [
                {"type": "thinking", "thinking": "...", "signature": "x"},
                {"type": "text", "text": "Let me look."},
                {"type": "tool_use", "id": "toolu_01", "name": "read_file", "input": {"path": "src/lib.rs"}}
            ],
            "stop_reason": "tool_use",
            "usage": {
                "input_tokens": 120,
                "output_tokens": 30,
                "cache_creation_input_tokens": 100,
                "cache_read_input_tokens": 0
            }
        }"#;

        let turn = parse_response(body).unwrap();

        assert_eq!(turn.stop_reason, StopReason::ToolUse);
        assert_eq!(turn.content.len(), 2);
        let (id, name, input) = turn.tool_uses().next().unwrap();
        assert_eq!((id, name), ("toolu_01", "read_file"));
        assert_eq!(input["path"], "src/lib.rs");
        assert_eq!(turn.usage.cache_creation_input_tokens, 100);
        assert_eq!(turn.model.as_deref(), Some("claude-3-7-sonnet-20250219"));
    }

    #[test]
    fn test_parse_minimal_response() {
        let turn = parse_response(
            r#"{"content":[{"type":"text","text":"ok"}],"stop_reason":"end_turn","usage":{"input_tokens":1,"output_tokens":1}}"#,
        )
        .unwrap();

        assert_eq!(turn.last_text(), Some("ok"));
        assert_eq!(turn.usage.cache_read_input_tokens, 0);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(
            parse_response("<html>"),
            Err(ProviderError::Decode(_))
        ));
    }
}
