//! Reply parser for Gemini `generateContent` responses
//!
//! Turns a raw response body into a `ModelReply` and picks the single tool
//! call a routing cycle acts on.

use log::warn;
use serde_json::Value;

use super::client::LlmError;
use super::types::{ModelReply, ToolCall, Usage};

/// Parse a raw `generateContent` response body.
///
/// Only the first candidate is read. Text parts are joined with newlines and
/// every `functionCall` part is collected in order.
pub fn parse_reply(body: &Value) -> Result<ModelReply, LlmError> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| {
            let reason = body
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
                .unwrap_or("no candidates");
            LlmError::InvalidResponse(format!("response contained no candidates ({})", reason))
        })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();

    if let Some(parts) = candidate.pointer("/content/parts").and_then(|p| p.as_array()) {
        for part in parts {
            if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(t);
            } else if let Some(call) = part.get("functionCall").and_then(parse_function_call) {
                tool_calls.push(call);
            }
        }
    }

    let usage = body.get("usageMetadata").map(parse_usage).unwrap_or_default();

    Ok(ModelReply {
        text,
        tool_calls,
        usage,
    })
}

/// Parse a `functionCall` object.
///
/// Missing `args` become an empty object; anything else is passed through as-is.
fn parse_function_call(call: &Value) -> Option<ToolCall> {
    let name = call.get("name").and_then(|n| n.as_str())?.to_string();
    let args = call
        .get("args")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));
    Some(ToolCall { name, args })
}

fn parse_usage(usage: &Value) -> Usage {
    Usage {
        input_tokens: usage.get("promptTokenCount").and_then(|v| v.as_u64()).unwrap_or(0),
        output_tokens: usage.get("candidatesTokenCount").and_then(|v| v.as_u64()).unwrap_or(0),
    }
}

/// The tool call a routing cycle acts on.
///
/// Only one call per user message is supported. Extra calls are dropped and logged.
pub fn first_tool_call(reply: &ModelReply) -> Option<&ToolCall> {
    if reply.tool_calls.len() > 1 {
        let dropped: Vec<&str> = reply.tool_calls[1..].iter().map(|c| c.name.as_str()).collect();
        warn!(
            "Model requested {} tool calls; honoring only '{}', dropping {:?}",
            reply.tool_calls.len(),
            reply.tool_calls[0].name,
            dropped
        );
    }
    reply.tool_calls.first()
}
