// ============================================================================
// File: src/llm_client.rs
// Gemini API client for LLM interactions
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::models::{GenerateContentRequest, GenerateContentResponse, ListModelsResponse, ModelInfo};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to language model failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error for model '{model}': HTTP {status}\nResponse: {body}")]
    Api {
        model: String,
        status: u16,
        body: String,
    },

    #[error("failed to parse response from model '{model}': {message}")]
    Parse { model: String, message: String },

    #[error("model '{model}' returned no text ({reason})")]
    EmptyResponse { model: String, reason: String },
}

/// Plain text-in, text-out access to a language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: Self::normalize_model_name(model),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Every model visible to the API key, across all result pages
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", "100")]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            let response_text = self.checked_body(response).await?;
            let page: ListModelsResponse =
                serde_json::from_str(&response_text).map_err(|e| LlmError::Parse {
                    model: self.model.clone(),
                    message: e.to_string(),
                })?;

            models.extend(page.models);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }

    async fn checked_body(&self, response: reqwest::Response) -> Result<String, LlmError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                model: self.model.clone(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn normalize_model_name(model: &str) -> String {
        let model = model.trim();
        if model.starts_with("models/") || model.starts_with("tunedModels/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest::from_prompt(prompt);

        debug!(model = %self.model, prompt_chars = prompt.len(), "calling generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let response_text = self.checked_body(response).await?;
        let response_data: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| LlmError::Parse {
                model: self.model.clone(),
                message: format!("{}\nRaw response: {}", e, response_text),
            })?;

        match response_data.text() {
            Some(text) => Ok(text),
            None => Err(LlmError::EmptyResponse {
                model: self.model.clone(),
                reason: response_data
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .or_else(|| {
                        response_data
                            .candidates
                            .first()
                            .and_then(|c| c.finish_reason.clone())
                    })
                    .unwrap_or_else(|| "no candidates".to_string()),
            }),
        }
    }
}
