//! Chat-completion clients for `OpenAI` and Ollama

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatMessage;
use super::CompletionModel;
use super::GenerationParams;
use crate::config::ProviderKind;
use crate::errors::RagbotError;
use crate::errors::Result;

/// Client for a chat-completion provider
pub struct LlmService {
    provider: ProviderKind,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl LlmService {
    /// Create the LLM client described by the app config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = config.provider_kind(config.llm_endpoint());
        Self::with_provider(
            provider,
            config.llm_model().to_string(),
            config.llm_endpoint().to_string(),
            (provider == ProviderKind::OpenAI).then(|| config.llm_key().to_string()),
            config.provider_timeout(),
        )
    }

    pub fn with_provider(
        provider: ProviderKind,
        model: String,
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagbotError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Generate a reply to a single prompt
    pub async fn generate_with_params(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String> {
        self.complete(&[ChatMessage::user(prompt)], params).await
    }

    async fn complete_openai(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| RagbotError::Config("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_tokens: Option<u32>,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat completions API: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagbotError::Completion(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagbotError::Completion(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagbotError::Completion(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RagbotError::Completion("No choices in completion response".to_string()))
    }

    async fn complete_ollama(
        &self,
        messages: &[ChatMessage],
        params: GenerationParams,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
            #[serde(skip_serializing_if = "Option::is_none")]
            num_predict: Option<u32>,
        }

        #[derive(Serialize)]
        struct OllamaChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaChatResponse {
            message: Option<ChatMessage>,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {}", url);

        let request = OllamaChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagbotError::Completion(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagbotError::Completion(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| RagbotError::Completion(format!("Failed to parse response: {e}")))?;

        result
            .message
            .map(|message| message.content)
            .ok_or_else(|| RagbotError::Completion("No message in Ollama response".to_string()))
    }
}

#[async_trait]
impl CompletionModel for LlmService {
    async fn complete(&self, messages: &[ChatMessage], params: GenerationParams) -> Result<String> {
        match self.provider {
            ProviderKind::OpenAI => self.complete_openai(messages, params).await,
            ProviderKind::Ollama => self.complete_ollama(messages, params).await,
        }
    }
}
