use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    #[error("Zone not found: {0}")]
    UnknownZone(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Control channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
