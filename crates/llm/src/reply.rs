use tracing::{debug, warn};

use crate::provider::{CompletionProvider, LlmError};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// Reply used when the response is well-formed but carries no answer text.
pub const NO_ANSWER_FALLBACK: &str = "Sorry, I couldn't understand that.";

/// Reply used when the request itself failed.
pub const ERROR_FALLBACK: &str = "Something went wrong. Please try again later.";

/// Turn a completion result into the text shown as the assistant's reply.
/// Never fails: every error becomes [`ERROR_FALLBACK`].
pub fn resolve_reply(result: Result<GenerateContentResponse, LlmError>) -> String {
    match result {
        Ok(response) => match response.first_text() {
            Some(text) => text.to_string(),
            None => {
                debug!("Response had no candidate text");
                NO_ANSWER_FALLBACK.to_string()
            }
        },
        Err(e) => {
            warn!(error = %e, "Completion request failed");
            ERROR_FALLBACK.to_string()
        }
    }
}

/// Issue exactly one request and resolve it to reply text.
pub async fn send(provider: &dyn CompletionProvider, request: &GenerateContentRequest) -> String {
    resolve_reply(provider.generate(request).await)
}
