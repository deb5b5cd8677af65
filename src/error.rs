use thiserror::Error;

use crate::tokenizer::Capability;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{tokenizer} does not support {capability}")]
    UnsupportedOperation {
        capability: Capability,
        tokenizer: &'static str,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TokenizerError {
    /// Build a [`TokenizerError::UnsupportedOperation`] for `tokenizer`.
    pub fn unsupported(capability: Capability, tokenizer: &'static str) -> Self {
        TokenizerError::UnsupportedOperation {
            capability,
            tokenizer,
        }
    }
}
