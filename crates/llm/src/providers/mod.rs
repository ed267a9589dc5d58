pub mod gemini;

use quibly_core::GeminiConfig;

use crate::provider::LlmError;

/// Create the Gemini provider from config.
pub fn create_provider(config: &GeminiConfig) -> Result<gemini::GeminiProvider, LlmError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| LlmError::NotConfigured(e.to_string()))?;
    Ok(gemini::GeminiProvider::new(
        api_key.to_string(),
        config.model.clone(),
        config.base_url.clone(),
    ))
}
