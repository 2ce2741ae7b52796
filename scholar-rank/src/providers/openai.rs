//! OpenAI-compatible chat completions adapter.
//!
//! Serves as both the scoring oracle and the query-expansion text generator.
//! Any provider exposing `POST {base}/chat/completions` works (OpenAI,
//! DeepSeek, local servers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RerankConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::provider::{ScoringOracle, TextGenerator};

const SCORING_TEMPERATURE: f32 = 0.1;
const SCORING_MAX_TOKENS: u32 = 1500;
const EXPANSION_TEMPERATURE: f32 = 0.7;
const EXPANSION_MAX_TOKENS: u32 = 500;

/// Chat completions client.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &RerankConfig) -> Result<Self> {
        Ok(Self::with_client(
            http::build_client(config)?,
            &config.oracle_base_url,
            config.oracle_api_key.clone(),
            &config.oracle_model,
        ))
    }

    /// Build a client around an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.to_owned(),
        }
    }

    /// Send one single-turn chat request and return the assistant text.
    async fn chat(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| http::transport_error("oracle", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "oracle returned HTTP {}",
                status.as_u16()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| http::transport_error("oracle", e))?;

        parse_chat_response(&text)
    }
}

#[async_trait]
impl ScoringOracle for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(prompt, SCORING_TEMPERATURE, SCORING_MAX_TOKENS).await
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.chat(prompt, EXPANSION_TEMPERATURE, EXPANSION_MAX_TOKENS)
            .await
    }
}

/// Extract the first choice's text from a chat completions reply.
pub(crate) fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("invalid chat completions response: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| SearchError::Parse("chat completions response has no content".into()))
}
