use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuiblyError {
    #[error("Configuration error: {0}")]
    Config(String),
}
