//! Conversation session with the model
//!
//! Owns the model-context turn history. A turn is recorded only once the
//! model has replied to it, so a failed send leaves the history untouched.

use crate::llm::{CompletionRequest, LlmError, ModelClient, ModelReply, ToolDefinition, Turn};

/// Model-facing conversation state for one chat
#[derive(Debug, Clone)]
pub struct ConversationSession {
    system_instruction: String,
    tools: Vec<ToolDefinition>,
    history: Vec<Turn>,
}

impl ConversationSession {
    pub fn new(system_instruction: impl Into<String>, tools: Vec<ToolDefinition>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            tools,
            history: Vec::new(),
        }
    }

    /// Send `turn` with the full history and record both sides on success
    pub async fn send(&mut self, client: &dyn ModelClient, turn: Turn) -> Result<ModelReply, LlmError> {
        let request = CompletionRequest::new(self.system_instruction.clone())
            .with_history(self.history.clone())
            .with_turn(turn.clone())
            .with_tools(self.tools.clone());

        let reply = client.complete(request).await?;

        self.history.push(turn);
        self.history.push(reply.to_turn());
        Ok(reply)
    }

    /// Marker for `rollback`
    pub fn checkpoint(&self) -> usize {
        self.history.len()
    }

    /// Drop every turn recorded after `checkpoint`
    pub fn rollback(&mut self, checkpoint: usize) {
        self.history.truncate(checkpoint);
    }

    /// Forget all turns; instruction and tools are kept
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }
}
