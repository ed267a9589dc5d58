use std::path::Path;

use quibly_core::{ChatState, Message, PendingDocument, SendRejected};
use quibly_ingest::{
    extract_document, read_upload, DocumentUpload, ExtractionError, LopdfBackend, PdfBackend,
};
use quibly_llm::{format_request, send, CompletionProvider, GenerationConfig};
use tracing::{debug, info, warn};

/// Result of a send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The user message and the assistant reply were both appended.
    Replied(Message),
    /// Nothing was appended and no request was made.
    Ignored(SendRejected),
}

/// What a successful upload put in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub file_name: String,
    pub page_count: usize,
    pub total_chars: usize,
}

/// One chat: the conversation state plus the collaborators that feed it.
pub struct ChatSession {
    state: ChatState,
    provider: Box<dyn CompletionProvider>,
    backend: Box<dyn PdfBackend>,
    generation_config: Option<GenerationConfig>,
}

impl ChatSession {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self {
            state: ChatState::new(),
            provider,
            backend: Box::new(LopdfBackend),
            generation_config: None,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn PdfBackend>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_generation_config(mut self, config: Option<GenerationConfig>) -> Self {
        self.generation_config = config;
        self
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn messages(&self) -> &[Message] {
        self.state.messages()
    }

    pub fn pending_document(&self) -> Option<&PendingDocument> {
        self.state.pending_document()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Whether [`ChatSession::send_message`] would act on `input`.
    pub fn check_submission(&self, input: &str) -> Result<(), SendRejected> {
        self.state.check_submission(input)
    }

    /// Send one user message and append the assistant's reply.
    ///
    /// Blank input and submissions made while a reply is pending are ignored.
    /// Upstream failures never surface as errors: they become a fallback
    /// assistant message and the session returns to idle.
    pub async fn send_message(&mut self, input: &str) -> SendOutcome {
        if let Err(rejected) = self.check_submission(input) {
            debug!(reason = %rejected, "Submission ignored");
            return SendOutcome::Ignored(rejected);
        }

        self.state = std::mem::take(&mut self.state).submit(input);

        let request = format_request(
            self.state.messages(),
            self.state.pending_context(),
            self.generation_config,
        );
        let reply = send(self.provider.as_ref(), &request).await;

        self.state = std::mem::take(&mut self.state).complete(reply);
        match self.state.messages().last() {
            Some(message) => SendOutcome::Replied(message.clone()),
            None => unreachable!("complete() always appends a message"),
        }
    }

    /// Extract text from `upload` and make it the pending document.
    ///
    /// On any error the session is left exactly as it was, including a
    /// previously loaded document.
    pub async fn upload_document(
        &mut self,
        upload: &DocumentUpload,
    ) -> Result<UploadSummary, ExtractionError> {
        let extracted = match extract_document(upload, self.backend.as_ref()).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(file = %upload.file_name, error = %e, "Document not loaded");
                return Err(e);
            }
        };

        let summary = UploadSummary {
            file_name: extracted.file_name.clone(),
            page_count: extracted.page_count(),
            total_chars: extracted.total_chars(),
        };
        info!(
            file = %summary.file_name,
            pages = summary.page_count,
            chars = summary.total_chars,
            "Document loaded"
        );

        self.state = std::mem::take(&mut self.state).attach_document(extracted.into_pending());
        Ok(summary)
    }

    /// Read a file from disk and upload it.
    pub async fn upload_path(&mut self, path: &Path) -> Result<UploadSummary, ExtractionError> {
        let upload = read_upload(path).await?;
        self.upload_document(&upload).await
    }
}
