pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod state;

pub use config::{Config, GeminiConfig};
pub use conversation::Conversation;
pub use error::*;
pub use message::*;
pub use state::{ChatState, PendingDocument, SendPhase, SendRejected};
