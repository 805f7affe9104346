//! Coordinator - routes chat messages to hospital agents via the model
//!
//! - `router`: the routing cycle and its state machine
//! - `session`: model-context turn history
//! - `activity`: live "which agent is working" broadcast

mod activity;
mod router;
mod session;

pub use activity::{ActivityNotifier, DEFAULT_RESET_DELAY};
pub use router::{
    APOLOGY_TEXT, Coordinator, DIRECT_FALLBACK_TEXT, NOT_INITIALIZED_TEXT, RouteOutcome, RoutingState,
    SYSTEM_INSTRUCTION, TOOL_FALLBACK_TEXT,
};
pub use session::ConversationSession;
