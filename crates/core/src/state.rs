//! Application state for one chat session.
//!
//! Every transition consumes the current [`ChatState`] and returns the next
//! one, so callers never observe a half-applied change.

use serde::{Deserialize, Serialize};

use crate::conversation::Conversation;
use crate::message::Message;

/// Text extracted from the most recently loaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDocument {
    /// Display name of the source file.
    pub file_name: String,
    /// Page-labelled text, sent along with the next message.
    pub text: String,
}

/// Whether a completion request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SendPhase {
    #[default]
    Idle,
    Sending,
}

/// Why a submission was not turned into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendRejected {
    #[error("message is empty")]
    EmptyInput,
    #[error("a reply is still pending")]
    Busy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    conversation: Conversation,
    pending_document: Option<PendingDocument>,
    phase: SendPhase,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn pending_document(&self) -> Option<&PendingDocument> {
        self.pending_document.as_ref()
    }

    /// Pending document text, if any.
    pub fn pending_context(&self) -> Option<&str> {
        self.pending_document.as_ref().map(|d| d.text.as_str())
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SendPhase::Sending
    }

    /// Check whether `input` would be accepted by [`ChatState::submit`].
    pub fn check_submission(&self, input: &str) -> Result<(), SendRejected> {
        if input.trim().is_empty() {
            return Err(SendRejected::EmptyInput);
        }
        if self.is_loading() {
            return Err(SendRejected::Busy);
        }
        Ok(())
    }

    /// Idle → Sending: append the user's message as typed.
    ///
    /// Callers gate this with [`ChatState::check_submission`].
    pub fn submit(self, content: impl Into<String>) -> Self {
        let id = self.conversation.next_id();
        Self {
            conversation: self.conversation.append(Message::user(id, content)),
            phase: SendPhase::Sending,
            ..self
        }
    }

    /// Sending → Idle: append the assistant's reply (or fallback text).
    pub fn complete(self, reply: impl Into<String>) -> Self {
        let id = self.conversation.next_id();
        Self {
            conversation: self.conversation.append(Message::assistant(id, reply)),
            phase: SendPhase::Idle,
            ..self
        }
    }

    /// Replace the pending document wholesale.
    pub fn attach_document(self, document: PendingDocument) -> Self {
        Self {
            pending_document: Some(document),
            ..self
        }
    }
}
