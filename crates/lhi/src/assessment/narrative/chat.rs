use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompt::{build_prompt, parse_sections, SYSTEM_PROMPT};
use super::{NarrativeError, NarrativeGenerator};
use crate::assessment::report::AiAnalysis;
use crate::assessment::scoring::AssessmentResult;
use crate::config::NarrativeConfig;

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 1500;

/// Narrator backed by an OpenAI-compatible chat completions endpoint (DeepSeek by default).
pub struct ChatCompletionNarrator {
    api_key: SecretString,
    api_base: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionNarrator")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletionNarrator {
    pub fn new(config: &NarrativeConfig) -> Result<Self, NarrativeError> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()))
            .ok_or(NarrativeError::MissingApiKey)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        Ok(Self {
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    fn build_request(&self, result: &AssessmentResult) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(result),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionNarrator {
    async fn analyze(&self, result: &AssessmentResult) -> Result<AiAnalysis, NarrativeError> {
        let started = Instant::now();
        let url = format!("{}/chat/completions", self.api_base);
        let request = self.build_request(result);

        debug!(model = %self.model, "requesting assessment narrative");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| NarrativeError::Transport(err.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(NarrativeError::EmptyResponse)?;

        info!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "assessment narrative generated"
        );

        Ok(parse_sections(&content))
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
