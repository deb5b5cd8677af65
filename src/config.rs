//! Tokenizer configuration: casing, accent handling, word length limit and the
//! special-token strings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TokenizerError;

/// Default upper bound on the characters in a single wordpiece input word.
pub const DEFAULT_MAX_CHARS_PER_WORD: usize = 200;

/// The five reserved BERT token strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokens {
    pub classifier: String,
    pub mask: String,
    pub pad: String,
    pub separator: String,
    pub unknown: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            classifier: "[CLS]".to_string(),
            mask: "[MASK]".to_string(),
            pad: "[PAD]".to_string(),
            separator: "[SEP]".to_string(),
            unknown: "[UNK]".to_string(),
        }
    }
}

impl SpecialTokens {
    /// The tokens in split order: classifier, mask, pad, separator, unknown.
    pub fn as_array(&self) -> [&str; 5] {
        [
            self.classifier.as_str(),
            self.mask.as_str(),
            self.pad.as_str(),
            self.separator.as_str(),
            self.unknown.as_str(),
        ]
    }

    pub fn contains(&self, token: &str) -> bool {
        self.as_array().contains(&token)
    }
}

/// Full BERT tokenizer configuration.
///
/// Every field has a default, so a JSON config only needs the keys it
/// overrides:
///
/// ```json
/// { "lowercase": false, "special_tokens": { "unknown": "<unk>" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Lowercase every token that is not a special token.
    pub lowercase: bool,
    /// Remove nonspacing marks after NFD decomposition.
    pub strip_accents: bool,
    /// Words longer than this (in characters) become the unknown token.
    pub max_chars_per_word: usize,
    pub special_tokens: SpecialTokens,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            strip_accents: false,
            max_chars_per_word: DEFAULT_MAX_CHARS_PER_WORD,
            special_tokens: SpecialTokens::default(),
        }
    }
}

impl TokenizerConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, TokenizerError> {
        let config: TokenizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TokenizerError> {
        if self.max_chars_per_word == 0 {
            return Err(TokenizerError::Configuration(
                "max_chars_per_word must be greater than zero".to_string(),
            ));
        }
        for token in self.special_tokens.as_array() {
            if token.trim().is_empty() {
                return Err(TokenizerError::Configuration(
                    "special tokens must be non-empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
