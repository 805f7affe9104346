//! Coordinator routing cycle
//!
//! One user message in, one displayable answer out. The cycle is an explicit
//! state machine:
//!
//! ```text
//! AwaitingModelResponse -> ToolRequested -> AwaitingToolResult -> AwaitingFinalResponse -> Complete
//!                       \------------------------------------------------------------> Complete
//! ```
//!
//! Failures at either model round-trip end the cycle with a fixed apology.
//! Nothing is retried and nothing propagates to the caller.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use super::activity::{ActivityNotifier, DEFAULT_RESET_DELAY};
use super::session::ConversationSession;
use crate::domain::{Activity, Agent, ConversationLog, Message, Responder};
use crate::error::{CoordinatorError, Result};
use crate::llm::{GeminiClient, GeminiConfig, ModelClient, ModelReply, ToolCall, Turn, Usage, first_tool_call};
use crate::tools::{DomainExecutor, MockDomainExecutor, ToolCatalog};

/// Instruction given to the model for every session
pub const SYSTEM_INSTRUCTION: &str = r#"You are the 'Koordinator_Sistem_Rumah_Sakit' (Hospital System Coordinator).
Your goal is to receive user requests and ROUTE them to the correct sub-agent using the provided tools.

Rules:
1. Always analyze the user's intent carefully.
2. You MUST call exactly one of the 4 provided tools/functions to handle the request. Do not answer directly without calling a tool if the request falls into a category.
3. If the user greets you or needs clarification, answer directly: introduce yourself as the Hospital Coordinator and ask how you can help.
4. After the tool executes, you will receive the result. Summarize it professionally for the user."#;

/// Returned when a model round-trip fails
pub const APOLOGY_TEXT: &str = "Sorry, I encountered an error processing your request.";

/// Returned when no model client could be initialized
pub const NOT_INITIALIZED_TEXT: &str = "System Error: AI not initialized. Check API Key.";

/// Used when the model summarizes a tool result with no text
pub const TOOL_FALLBACK_TEXT: &str = "Processed request successfully.";

/// Used when the model answers directly with no text
pub const DIRECT_FALLBACK_TEXT: &str = "I didn't understand that.";

/// Result of one routing cycle. Always displayable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub text: String,
    /// Domain agent whose tool ran during the cycle
    pub invoked_tool: Option<Agent>,
}

impl RouteOutcome {
    fn failure(text: &str) -> Self {
        Self {
            text: text.to_string(),
            invoked_tool: None,
        }
    }
}

/// States of a single routing cycle
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingState {
    /// User text is about to be sent
    AwaitingModelResponse { user_text: String },
    /// Model asked for a tool. Only catalog names light up their agent; any other name
    /// leaves the activity at `Coordinating`.
    ToolRequested { call: ToolCall },
    /// Tool call accepted; `agent` is `None` when the name is outside the catalog
    AwaitingToolResult { call: ToolCall, agent: Option<Agent> },
    /// Tool result is about to be sent back
    AwaitingFinalResponse {
        tool_name: String,
        agent: Option<Agent>,
        result: String,
    },
    Complete(RouteOutcome),
}

impl RoutingState {
    pub fn start(user_text: impl Into<String>) -> Self {
        RoutingState::AwaitingModelResponse {
            user_text: user_text.into(),
        }
    }

    /// Decide what follows the model's reply to the user text
    pub fn after_first_reply(reply: &ModelReply) -> Self {
        match first_tool_call(reply) {
            Some(call) => RoutingState::ToolRequested { call: call.clone() },
            None => RoutingState::Complete(RouteOutcome {
                text: non_empty_or(&reply.text, DIRECT_FALLBACK_TEXT),
                invoked_tool: None,
            }),
        }
    }

    /// The model's summary of a tool result ends the cycle
    pub fn after_final_reply(reply: &ModelReply, agent: Option<Agent>) -> Self {
        RoutingState::Complete(RouteOutcome {
            text: non_empty_or(&reply.text, TOOL_FALLBACK_TEXT),
            invoked_tool: agent,
        })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RoutingState::Complete(_))
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

/// Routes user messages to the hospital agents through the model
pub struct Coordinator {
    client: Option<Arc<dyn ModelClient>>,
    /// Kept so a missing client can be retried on the next message
    llm_config: Option<GeminiConfig>,
    session: Option<ConversationSession>,
    catalog: ToolCatalog,
    executor: Arc<dyn DomainExecutor>,
    notifier: Arc<ActivityNotifier>,
    reset_delay: Duration,
    log: ConversationLog,
    usage: Usage,
}

impl Coordinator {
    /// Create a coordinator around an existing model client
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        let mut coordinator = Self::base(Some(client), None);
        coordinator.open_session();
        coordinator
    }

    /// Create a coordinator backed by Gemini.
    ///
    /// A missing credential is logged, not returned: the coordinator is still
    /// built and answers every message with the not-initialized text.
    pub fn from_config(config: GeminiConfig) -> Self {
        let client = match build_client(&config) {
            Ok(client) => {
                info!("Model client initialized: {}", client.model());
                Some(client)
            }
            Err(e) => {
                error!("{}", e);
                None
            }
        };

        let mut coordinator = Self::base(client, Some(config));
        if coordinator.client.is_some() {
            coordinator.open_session();
        }
        coordinator
    }

    /// A coordinator with no model client and no way to build one
    pub fn uninitialized() -> Self {
        Self::base(None, None)
    }

    fn base(client: Option<Arc<dyn ModelClient>>, llm_config: Option<GeminiConfig>) -> Self {
        Self {
            client,
            llm_config,
            session: None,
            catalog: ToolCatalog::hospital(),
            executor: Arc::new(MockDomainExecutor::new()),
            notifier: Arc::new(ActivityNotifier::new()),
            reset_delay: DEFAULT_RESET_DELAY,
            log: ConversationLog::new(),
            usage: Usage::default(),
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn DomainExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<ActivityNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// How long the last activity stays visible after a cycle
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn notifier(&self) -> Arc<ActivityNotifier> {
        self.notifier.clone()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    /// User-visible history
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Tokens used across all cycles so far
    pub fn usage(&self) -> Usage {
        self.usage
    }

    /// Append the coordinator's opening message to the log
    pub fn greet(&mut self, greeting: impl Into<String>) {
        self.log.push(Message::assistant(greeting, Responder::Coordinator));
    }

    /// Start over: empty model context and a fresh log
    pub fn new_conversation(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear();
        }
        self.log = ConversationLog::new();
        info!("Conversation reset");
    }

    /// Record the user message, route it, record the answer
    pub async fn submit(&mut self, text: &str) -> RouteOutcome {
        self.log.push(Message::user(text));
        let outcome = self.route(text).await;
        self.log.push(Message::assistant(
            outcome.text.clone(),
            Responder::from(outcome.invoked_tool),
        ));
        outcome
    }

    /// Run one routing cycle. Always resolves with a displayable answer.
    pub async fn route(&mut self, user_text: &str) -> RouteOutcome {
        info!("Routing message ({} chars)", user_text.len());
        self.notifier.set(Activity::Coordinating);

        let outcome = match self.ensure_session() {
            Some((client, session)) => self.run_cycle(client.as_ref(), session, user_text).await,
            None => RouteOutcome::failure(NOT_INITIALIZED_TEXT),
        };

        self.notifier.reset_after(self.reset_delay);
        info!("Cycle complete (tool: {:?})", outcome.invoked_tool);
        outcome
    }

    /// Hand out the client and the session, building either if missing
    fn ensure_session(&mut self) -> Option<(Arc<dyn ModelClient>, ConversationSession)> {
        if self.client.is_none() {
            let config = self.llm_config.as_ref()?;
            match build_client(config) {
                Ok(client) => self.client = Some(client),
                Err(e) => {
                    error!("{}", e);
                    return None;
                }
            }
        }

        let client = self.client.clone()?;
        if self.session.is_none() {
            self.open_session();
        }
        let session = self.session.take()?;
        Some((client, session))
    }

    fn open_session(&mut self) {
        self.session = Some(ConversationSession::new(SYSTEM_INSTRUCTION, self.catalog.definitions()));
    }

    async fn run_cycle(
        &mut self,
        client: &dyn ModelClient,
        mut session: ConversationSession,
        user_text: &str,
    ) -> RouteOutcome {
        let checkpoint = session.checkpoint();
        let mut state = RoutingState::start(user_text);

        let outcome = loop {
            state = match self.step(client, &mut session, state).await {
                Ok(RoutingState::Complete(outcome)) => break outcome,
                Ok(next) => next,
                Err(e) => {
                    error!("Routing cycle failed: {}", e);
                    session.rollback(checkpoint);
                    break RouteOutcome::failure(APOLOGY_TEXT);
                }
            };
        };

        self.session = Some(session);
        outcome
    }

    /// Advance the cycle by one state
    async fn step(
        &mut self,
        client: &dyn ModelClient,
        session: &mut ConversationSession,
        state: RoutingState,
    ) -> Result<RoutingState> {
        let next = match state {
            RoutingState::AwaitingModelResponse { user_text } => {
                let reply = session.send(client, Turn::user(user_text)).await?;
                self.usage.add(&reply.usage);
                RoutingState::after_first_reply(&reply)
            }
            RoutingState::ToolRequested { call } => {
                info!("Model requested tool '{}'", call.name);
                let agent = Agent::from_wire_name(&call.name);
                match agent {
                    Some(agent) => self.notifier.set(Activity::Tool(agent)),
                    None => warn!("Tool '{}' is not in the catalog", call.name),
                }
                RoutingState::AwaitingToolResult { call, agent }
            }
            RoutingState::AwaitingToolResult { call, agent } => {
                let result = self.executor.execute(&call.name, &call.args);
                RoutingState::AwaitingFinalResponse {
                    tool_name: call.name,
                    agent,
                    result,
                }
            }
            RoutingState::AwaitingFinalResponse {
                tool_name,
                agent,
                result,
            } => {
                let reply = session.send(client, Turn::tool_result(tool_name, result)).await?;
                self.usage.add(&reply.usage);
                RoutingState::after_final_reply(&reply, agent)
            }
            complete @ RoutingState::Complete(_) => complete,
        };
        Ok(next)
    }
}

fn build_client(config: &GeminiConfig) -> Result<Arc<dyn ModelClient>> {
    let client = GeminiClient::new(config.clone())
        .map_err(|e| CoordinatorError::Initialization(format!("Model client not initialized: {}", e)))?;
    Ok(Arc::new(client))
}
