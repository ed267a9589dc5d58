use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageId};

/// Append-only conversation history. Insertion order is conversation order.
///
/// Roles are not required to alternate: an error reply can follow another
/// assistant message, and nothing here rejects it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the store with `message` appended.
    pub fn append(mut self, message: Message) -> Self {
        debug_assert!(
            self.last().map_or(true, |last| last.id() < message.id()),
            "message ids must increase with insertion order"
        );
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Id for the next message, derived from the wall clock.
    pub fn next_id(&self) -> MessageId {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_id_at(now_ms)
    }

    /// Id for the next message at `now_ms`; never reuses or goes below the
    /// last id in the store.
    pub fn next_id_at(&self, now_ms: u64) -> MessageId {
        match self.last() {
            Some(last) if last.id().0 >= now_ms => MessageId(last.id().0 + 1),
            _ => MessageId(now_ms),
        }
    }
}
