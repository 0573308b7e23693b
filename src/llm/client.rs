//! Async LLM client for agent decisions
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports both Anthropic and OpenAI-compatible APIs (DeepSeek, etc).
//! Agents hand it an assembled prompt and get back a structured action;
//! it also scores memory importance and synthesizes reflections.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, Tick};
use crate::llm::decision::{DecisionMaker, TokenSink, DEFAULT_IMPORTANCE};
use crate::llm::parser::parse_action;
use crate::simulation::action::Action;

const IMPORTANCE_SYSTEM: &str = "You rate the importance of observations made by a simulated agent. \
Respond with a single integer from 1 (mundane, routine) to 10 (critical, life-changing). \
No other text.";

const REFLECTION_SYSTEM: &str = "You distill an agent's recent observations into higher-level insights. \
Respond with a JSON array of up to 3 short insight strings. No other text.";

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| SimError::Llm("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "claude-3-haiku-20240307".into());

        Ok(Self::new(api_key, api_url, model))
    }

    /// Send a completion request to the LLM
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SimError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimError::Llm(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| SimError::Llm(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| SimError::Llm("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| SimError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SimError::Llm(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| SimError::Llm(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| SimError::Llm("Empty response".into()))
    }
}

#[async_trait]
impl DecisionMaker for LlmClient {
    async fn decide(
        &self,
        agent_id: &AgentId,
        tick: Tick,
        prompt: &str,
        tokens: Option<TokenSink>,
    ) -> Result<Action> {
        let text = self
            .complete("You are an agent in a simulated office. Decide your next action.", prompt)
            .await?;
        // The HTTP API is not streamed; forward the whole response as one token
        // so observers still see output arrive before the action lands.
        if let Some(sink) = tokens {
            let _ = sink.send(text.clone());
        }
        parse_action(&text, agent_id, tick)
    }

    async fn score_importance(&self, text: &str) -> u8 {
        let response = match self.complete(IMPORTANCE_SYSTEM, text).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "importance scoring failed, using default");
                return DEFAULT_IMPORTANCE;
            }
        };
        response
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=10).contains(n))
            .unwrap_or(DEFAULT_IMPORTANCE)
    }

    async fn synthesize_reflections(&self, prompt: &str) -> Vec<String> {
        let response = match self.complete(REFLECTION_SYSTEM, prompt).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "reflection synthesis failed");
                return Vec::new();
            }
        };
        if let Some(start) = response.find('[') {
            if let Some(end) = response.rfind(']') {
                if let Ok(insights) = serde_json::from_str::<Vec<String>>(&response[start..=end]) {
                    return insights.into_iter().take(3).collect();
                }
            }
        }
        // Fall back to treating each non-empty line as an insight
        response
            .lines()
            .map(|l| l.trim_start_matches(['-', '*', ' ']).trim().to_string())
            .filter(|l| !l.is_empty())
            .take(3)
            .collect()
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
