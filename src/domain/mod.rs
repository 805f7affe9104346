//! Domain types for MedCore
//!
//! This module contains the core domain types:
//! - Agent: The closed set of hospital subsystems reachable as tools
//! - Activity: What an observer should light up while a request is routed
//! - Message / ConversationLog: The user-visible chat history

pub mod agent;
pub mod message;

pub use agent::{Activity, Agent};
pub use message::{ConversationLog, Message, MessageRole, Responder};
