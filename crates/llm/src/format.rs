use quibly_core::{Message, Role};

use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part, TurnRole};

/// Separator and label placed between the newest turn and the document text.
pub const DOCUMENT_CONTEXT_LABEL: &str = "\n\n[PDF Content]:\n";

/// Build the upstream request from the full history.
///
/// Every message becomes one single-part turn. A non-blank document context
/// is appended to the last turn only. The whole history is sent each time.
pub fn format_request(
    messages: &[Message],
    document_context: Option<&str>,
    generation_config: Option<GenerationConfig>,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = messages
        .iter()
        .map(|m| Content {
            role: match m.role() {
                Role::User => TurnRole::User,
                Role::Assistant => TurnRole::Model,
            },
            parts: vec![Part {
                text: m.content().to_string(),
            }],
        })
        .collect();

    if let Some(context) = document_context.filter(|c| !c.trim().is_empty()) {
        if let Some(part) = contents.last_mut().and_then(|c| c.parts.first_mut()) {
            part.text.push_str(DOCUMENT_CONTEXT_LABEL);
            part.text.push_str(context);
        }
    }

    GenerateContentRequest {
        contents,
        generation_config,
    }
}
