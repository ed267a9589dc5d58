pub mod format;
pub mod provider;
pub mod providers;
pub mod reply;
pub mod types;

pub use format::{format_request, DOCUMENT_CONTEXT_LABEL};
pub use provider::{CompletionProvider, LlmError};
pub use providers::create_provider;
pub use providers::gemini::GeminiProvider;
pub use reply::{resolve_reply, send, ERROR_FALLBACK, NO_ANSWER_FALLBACK};
pub use types::{GenerateContentRequest, GenerateContentResponse, GenerationConfig};
