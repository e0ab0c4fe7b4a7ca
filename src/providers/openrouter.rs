//! OpenRouter provider implementation using the `/api/v1/chat/completions` API.

use serde::{Deserialize, Serialize};

use crate::credentials::Credential;

use super::{check_http_response, CompletionProvider, CompletionRequest, ProviderError, Role};

/// Default completion endpoint.
pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1/chat/completions";

// Fixed sampling parameters, applied identically on every call.
const MAX_RESPONSE_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.8;
const TOP_P: f64 = 0.9;
const FREQUENCY_PENALTY: f64 = 0.1;
const PRESENCE_PENALTY: f64 = 0.1;

/// App identification headers sent with every request.
const REFERER: &str = "https://github.com/pycckuu/rapport";
const APP_TITLE: &str = "Rapport";

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// OpenRouter chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Maximum completion tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Nucleus-sampling threshold.
    pub top_p: f64,
    /// Frequency penalty.
    pub frequency_penalty: f64,
    /// Presence penalty.
    pub presence_penalty: f64,
}

/// A message in chat-completions wire format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Role (`system`, `user`, `assistant`).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// OpenRouter chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message for this choice.
    pub message: ChatChoiceMessage,
}

/// Assistant message within a choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    /// Text content; absent on malformed replies.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build an OpenRouter API request from a completion request.
#[doc(hidden)]
pub fn build_request(model: &str, request: &CompletionRequest) -> ChatRequest {
    let mut messages: Vec<ChatMessage> = Vec::new();

    messages.push(ChatMessage {
        role: Role::System.as_str().to_owned(),
        content: request.system.clone(),
    });

    for msg in &request.messages {
        messages.push(ChatMessage {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        });
    }

    ChatRequest {
        model: model.to_owned(),
        messages,
        max_tokens: MAX_RESPONSE_TOKENS,
        temperature: TEMPERATURE,
        top_p: TOP_P,
        frequency_penalty: FREQUENCY_PENALTY,
        presence_penalty: PRESENCE_PENALTY,
    }
}

/// Extract the trimmed reply text from a response body.
///
/// # Errors
///
/// Returns `ProviderError::Parse` when the body cannot be deserialized or
/// `choices[0].message.content` is missing.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| ProviderError::Parse("missing choices[0].message.content".to_owned()))?;

    Ok(content.trim().to_owned())
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// OpenRouter chat completions API provider.
pub struct OpenRouterProvider {
    endpoint: String,
    model: String,
    credential: Credential,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider instance.
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            credential,
            client: reqwest::Client::new(),
        }
    }
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let api_request = build_request(&self.model, &request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header(
                "authorization",
                format!("Bearer {}", self.credential.expose()),
            )
            .header("http-referer", REFERER)
            .header("x-title", APP_TITLE)
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
