//! User-visible conversation messages
//!
//! The log mirrors the exchange for display. It does not feed the model's
//! context; that lives in the coordinator session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use crate::id::generate_message_id;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Which part of the system answered an assistant message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Responder {
    /// Answered directly without a domain agent
    Coordinator,
    Agent(Agent),
}

impl Responder {
    pub fn label(&self) -> &'static str {
        match self {
            Responder::Coordinator => "Coordinator",
            Responder::Agent(agent) => agent.label(),
        }
    }
}

impl From<Option<Agent>> for Responder {
    fn from(agent: Option<Agent>) -> Self {
        agent.map(Responder::Agent).unwrap_or(Responder::Coordinator)
    }
}

/// A single immutable entry in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub responder: Option<Responder>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role: MessageRole::User,
            content: content.into(),
            responder: None,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant message tagged with its responder
    pub fn assistant(content: impl Into<String>, responder: Responder) -> Self {
        Self {
            id: generate_message_id(),
            role: MessageRole::Assistant,
            content: content.into(),
            responder: Some(responder),
            created_at: Utc::now(),
        }
    }
}

/// Append-only, ordered log of messages for one chat
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
