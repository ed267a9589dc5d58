pub mod session;

pub use session::{ChatSession, SendOutcome, UploadSummary};
