//! Token <-> ID vocabulary for BERT-family tokenizers.
//!
//! A [`Vocabulary`] owns both directions of the mapping. The inverse map is
//! built in the same pass as the forward map, so the two never disagree.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::TokenizerError;

/// Immutable token <-> ID table.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    /// Token string -> token ID lookup.
    token_to_id: HashMap<String, u32>,
    /// Token ID -> token string (for decoding). Sparse mappings are allowed.
    id_to_token: HashMap<u32, String>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered token list. Each token's ID is its
    /// position in `tokens`.
    ///
    /// Fails with [`TokenizerError::Configuration`] if a token appears twice.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self, TokenizerError> {
        let mut token_to_id = HashMap::with_capacity(tokens.len());
        let mut id_to_token = HashMap::with_capacity(tokens.len());

        for (i, token) in tokens.into_iter().enumerate() {
            let id = u32::try_from(i).map_err(|_| {
                TokenizerError::Configuration(format!(
                    "vocabulary has more than {} entries",
                    u32::MAX
                ))
            })?;
            if let Some(previous) = token_to_id.insert(token.clone(), id) {
                return Err(TokenizerError::Configuration(format!(
                    "duplicate vocabulary token '{}' at IDs {} and {}",
                    token, previous, id
                )));
            }
            id_to_token.insert(id, token);
        }

        debug!(vocab_size = token_to_id.len(), "vocabulary built from token list");

        Ok(Self {
            token_to_id,
            id_to_token,
        })
    }

    /// Build a vocabulary from a prebuilt token -> ID mapping.
    ///
    /// Fails with [`TokenizerError::Configuration`] if two tokens share an ID,
    /// since the inverse mapping would be ambiguous.
    pub fn from_map(token_to_id: HashMap<String, u32>) -> Result<Self, TokenizerError> {
        let mut id_to_token = HashMap::with_capacity(token_to_id.len());

        for (token, &id) in &token_to_id {
            if let Some(other) = id_to_token.insert(id, token.clone()) {
                return Err(TokenizerError::Configuration(format!(
                    "vocabulary ID {} is assigned to both '{}' and '{}'",
                    id, other, token
                )));
            }
        }

        debug!(vocab_size = token_to_id.len(), "vocabulary built from mapping");

        Ok(Self {
            token_to_id,
            id_to_token,
        })
    }

    /// Parse `vocab.txt` content: one token per line, ID = line number.
    pub fn from_vocab_text(vocab_text: &str) -> Result<Self, TokenizerError> {
        let tokens: Vec<String> = vocab_text.lines().map(|l| l.to_string()).collect();
        Self::from_tokens(tokens)
    }

    /// Read and parse a `vocab.txt` file.
    pub fn from_file(path: &Path) -> Result<Self, TokenizerError> {
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading vocabulary file");
        Self::from_vocab_text(&text)
    }

    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }
}
