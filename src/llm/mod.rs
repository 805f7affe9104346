//! LLM Client Layer - Gemini API integration with function calling
//!
//! This module provides:
//! - Turn and reply types for model communication
//! - ModelClient trait for API abstraction
//! - GeminiClient implementation
//! - Reply parsing and single tool call selection

pub mod client;
pub mod gemini;
pub mod reply_parser;
pub mod types;

pub use client::{LlmError, MockModelClient, ModelClient};
pub use gemini::{GeminiClient, GeminiConfig};
pub use reply_parser::{first_tool_call, parse_reply};
pub use types::{CompletionRequest, ModelReply, Role, ToolCall, ToolDefinition, Turn, TurnPart, Usage};
