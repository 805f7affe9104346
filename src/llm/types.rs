//! LLM types for the model capability
//!
//! A conversation is a list of turns. Each turn carries one or more parts:
//! plain text, a function call requested by the model, or the result of a
//! function call sent back by us.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a turn in the model's context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub args: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// One piece of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPart {
    Text(String),
    FunctionCall(ToolCall),
    FunctionResponse { name: String, result: String },
}

/// A single turn in the model's context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    /// Create a user text turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![TurnPart::Text(text.into())],
        }
    }

    /// Create a turn carrying a tool result back to the model
    pub fn tool_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![TurnPart::FunctionResponse {
                name: name.into(),
                result: result.into(),
            }],
        }
    }

    /// Create a model turn from raw parts
    pub fn model(parts: Vec<TurnPart>) -> Self {
        Self {
            role: Role::Model,
            parts,
        }
    }
}

/// Tool definition as declared to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Convert to a Gemini `functionDeclarations` entry
    pub fn to_gemini_declaration(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": self.parameters
        })
    }
}

/// Everything the model needs for one call
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub system_instruction: String,
    /// Turns already exchanged, oldest first
    pub history: Vec<Turn>,
    /// The turn being sent now
    pub turn: Option<Turn>,
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turn = Some(turn);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// History followed by the new turn
    pub fn contents(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter().chain(self.turn.iter())
    }
}

/// What came back from the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

impl ModelReply {
    /// A plain text answer
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A reply requesting a single function call
    pub fn tool_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_calls: vec![ToolCall::new(name, args)],
            ..Default::default()
        }
    }

    /// The model turn to record in history.
    ///
    /// Only the first function call is kept, matching the single call that gets
    /// answered with a function response.
    pub fn to_turn(&self) -> Turn {
        let mut parts = Vec::new();
        if !self.text.is_empty() {
            parts.push(TurnPart::Text(self.text.clone()));
        }
        if let Some(call) = self.tool_calls.first() {
            parts.push(TurnPart::FunctionCall(call.clone()));
        }
        Turn::model(parts)
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Accumulate usage from another instance
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}
