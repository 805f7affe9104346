//! MedCore - a hospital system coordinator
//!
//! User messages are sent to a language model that can call one of four
//! mocked hospital subsystems. The coordinator runs the tool call, feeds the
//! result back for a natural-language summary, and broadcasts which agent is
//! active while it works.

pub mod coordinator;
pub mod domain;
pub mod error;
pub mod id;
pub mod llm;
pub mod tools;

pub use coordinator::{ActivityNotifier, Coordinator, RouteOutcome};
pub use domain::{Activity, Agent};
pub use error::{CoordinatorError, Result};
