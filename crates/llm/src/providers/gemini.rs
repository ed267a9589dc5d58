use async_trait::async_trait;
use tracing::debug;

use crate::provider::{CompletionProvider, LlmError};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full request URL. The API key rides in the query string, so this value
    /// must not be logged.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            self.api_key,
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        debug!(model = %self.model, turns = request.contents.len(), "Gemini request");

        // reqwest errors carry the URL; strip it so the key never reaches logs.
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::HttpError(e.without_url()))?;

        if !status.is_success() {
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))
    }
}
