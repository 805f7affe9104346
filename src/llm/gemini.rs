//! Gemini API client implementation
//!
//! This module implements the ModelClient trait for the Google Gemini
//! `generateContent` endpoint with function calling.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use super::client::{LlmError, ModelClient};
use super::reply_parser::parse_reply;
use super::types::{CompletionRequest, ModelReply, Role, Turn, TurnPart};

/// Gemini API base URL
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Variable checked when the configured one is unset
const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Configuration for the Gemini client
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub model: String,
    pub api_key_env: String,
    pub timeout: Duration,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(60),
            max_output_tokens: None,
        }
    }
}

impl GeminiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Gemini API client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// Reads the key from `config.api_key_env`, then from `API_KEY`
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let api_key = find_api_key(&config.api_key_env, |name| std::env::var(name).ok()).ok_or_else(|| {
            LlmError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            }
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: GeminiConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_URL, self.config.model)
    }

    /// Build the request body for the Gemini API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let contents: Vec<Value> = request.contents().map(turn_to_content).collect();

        let mut body = json!({ "contents": contents });

        if !request.system_instruction.is_empty() {
            body["systemInstruction"] = json!({
                "parts": [{ "text": request.system_instruction }]
            });
        }

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request.tools.iter().map(|t| t.to_gemini_declaration()).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        if let Some(max) = self.config.max_output_tokens {
            body["generationConfig"] = json!({ "maxOutputTokens": max });
        }

        body
    }

    /// Send a request to the Gemini API
    async fn send_request(&self, body: Value) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: truncate(&error_body, MAX_ERROR_BODY),
            });
        }

        Ok(response.json().await?)
    }
}

/// First non-blank value of `env_var`, then of `API_KEY`
fn find_api_key(env_var: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    [env_var, FALLBACK_API_KEY_ENV]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.trim().is_empty())
}

/// Convert one turn to a Gemini `contents` entry
fn turn_to_content(turn: &Turn) -> Value {
    let parts: Vec<Value> = turn
        .parts
        .iter()
        .map(|part| match part {
            TurnPart::Text(text) => json!({ "text": text }),
            TurnPart::FunctionCall(call) => json!({
                "functionCall": { "name": call.name, "args": call.args }
            }),
            TurnPart::FunctionResponse { name, result } => json!({
                "functionResponse": { "name": name, "response": { "result": result } }
            }),
        })
        .collect();

    json!({
        "role": match turn.role {
            Role::User => "user",
            Role::Model => "model",
        },
        "parts": parts
    })
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<ModelReply, LlmError> {
        let body = self.build_request(&request);
        debug!("Sending {} turns to {}", request.contents().count(), self.config.model);
        let response = self.send_request(body).await?;
        parse_reply(&response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ToolCall, ToolDefinition};

    fn test_client() -> GeminiClient {
        GeminiClient::with_api_key("test-key".to_string(), GeminiConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.max_output_tokens.is_none());
    }

    #[test]
    fn test_config_with_model() {
        let config = GeminiConfig::with_model("gemini-2.0-flash");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
    }

    #[test]
    fn test_client_without_api_key() {
        let config = GeminiConfig {
            api_key_env: "MEDCORE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        if std::env::var(FALLBACK_API_KEY_ENV).is_ok() {
            return;
        }
        let result = GeminiClient::new(config);
        assert!(matches!(result, Err(LlmError::MissingApiKey { env_var }) if env_var == "MEDCORE_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = test_client();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_build_request_basic() {
        let client = test_client();
        let request = CompletionRequest::new("You are the coordinator").with_turn(Turn::user("Hi"));

        let body = client.build_request(&request);

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are the coordinator");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
        assert!(body.get("tools").is_none());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_build_request_with_tools() {
        let client = test_client();
        let tool = ToolDefinition::new(
            "MedicalRecords",
            "Retrieves patient history",
            json!({"type": "OBJECT", "properties": {}, "required": []}),
        );
        let request = CompletionRequest::new("sys")
            .with_turn(Turn::user("Show records for P-1"))
            .with_tools(vec![tool]);

        let body = client.build_request(&request);

        assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "MedicalRecords");
    }

    #[test]
    fn test_build_request_tool_round_trip_turns() {
        let client = test_client();
        let call = ToolCall::new("BillingAndPayments", json!({"patientId": "P-7", "action": "check_balance"}));
        let request = CompletionRequest::new("sys")
            .with_history(vec![
                Turn::user("What's my balance?"),
                Turn::model(vec![TurnPart::FunctionCall(call)]),
            ])
            .with_turn(Turn::tool_result("BillingAndPayments", "SUCCESS"));

        let body = client.build_request(&request);
        let contents = body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "BillingAndPayments");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["patientId"], "P-7");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["name"], "BillingAndPayments");
        assert_eq!(contents[2]["parts"][0]["functionResponse"]["response"]["result"], "SUCCESS");
    }

    #[test]
    fn test_build_request_max_output_tokens() {
        let config = GeminiConfig {
            max_output_tokens: Some(512),
            ..Default::default()
        };
        let client = GeminiClient::with_api_key("k".to_string(), config).unwrap();
        let body = client.build_request(&CompletionRequest::new("sys"));
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 200), "short");
        let long = "x".repeat(250);
        let cut = truncate(&long, 200);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: Vec<(String, String)> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    #[test]
    fn test_find_api_key_prefers_configured_var() {
        let lookup = env_of(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "fallback")]);
        assert_eq!(find_api_key("GEMINI_API_KEY", lookup).as_deref(), Some("primary"));
    }

    #[test]
    fn test_find_api_key_blank_primary_falls_back() {
        let lookup = env_of(&[("GEMINI_API_KEY", ""), ("API_KEY", "real-key")]);
        assert_eq!(find_api_key("GEMINI_API_KEY", lookup).as_deref(), Some("real-key"));

        let lookup = env_of(&[("GEMINI_API_KEY", "   "), ("API_KEY", "real-key")]);
        assert_eq!(find_api_key("GEMINI_API_KEY", lookup).as_deref(), Some("real-key"));
    }

    #[test]
    fn test_find_api_key_all_blank() {
        let lookup = env_of(&[("GEMINI_API_KEY", ""), ("API_KEY", " ")]);
        assert!(find_api_key("GEMINI_API_KEY", lookup).is_none());
        assert!(find_api_key("GEMINI_API_KEY", env_of(&[])).is_none());
    }

    #[test]
    fn test_debug_impl_hides_key() {
        let client = test_client();
        let debug_str = format!("{:?}", client);
        assert!(debug_str.contains("GeminiClient"));
        assert!(debug_str.contains(DEFAULT_MODEL));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GeminiClient>();
    }
}
