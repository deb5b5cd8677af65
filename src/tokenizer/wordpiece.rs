//! WordPiece subword tokenizer for BERT-family vocabularies.
//!
//! Splits pre-tokenized words into known subwords using greedy
//! longest-match-first:
//!
//! 1. Words longer than `max_chars_per_word` characters become the unknown token.
//! 2. From the current start position, try the longest remaining substring
//!    first and shrink one character at a time until a vocabulary entry
//!    matches. Pieces after the first are looked up with the `##`
//!    continuation prefix.
//! 3. If some position has no match at all (not even one character), the
//!    whole word becomes a single unknown token.
//!
//! For example, with a vocabulary holding `un`, `##aff` and `##able`,
//! `"unaffable"` becomes `["un", "##aff", "##able"]`.

use std::sync::Arc;

use tracing::trace;

use super::{Capability, Tokenizer};
use crate::config::DEFAULT_MAX_CHARS_PER_WORD;
use crate::error::TokenizerError;
use crate::vocab::Vocabulary;

/// The continuation prefix for WordPiece subwords.
pub const CONTINUATION_PREFIX: &str = "##";

/// Greedy longest-match-first subword tokenizer.
#[derive(Debug, Clone)]
pub struct WordpieceTokenizer {
    vocab: Arc<Vocabulary>,
    unknown_token: String,
    max_chars_per_word: usize,
}

impl WordpieceTokenizer {
    /// Create a tokenizer bound to `vocab` with the default word length limit.
    pub fn new(vocab: Arc<Vocabulary>, unknown_token: impl Into<String>) -> Self {
        Self {
            vocab,
            unknown_token: unknown_token.into(),
            max_chars_per_word: DEFAULT_MAX_CHARS_PER_WORD,
        }
    }

    pub fn with_max_chars_per_word(mut self, max_chars_per_word: usize) -> Self {
        self.max_chars_per_word = max_chars_per_word;
        self
    }

    pub fn max_chars_per_word(&self) -> usize {
        self.max_chars_per_word
    }

    /// Apply WordPiece subword tokenization to a single word, appending the
    /// pieces (or one unknown token) to `output`.
    fn tokenize_word(&self, word: &str, output: &mut Vec<String>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return;
        }
        if chars.len() > self.max_chars_per_word {
            output.push(self.unknown_token.clone());
            return;
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = chars.len();
            let mut matched = None;

            while start < end {
                let substr: String = chars[start..end].iter().collect();
                let candidate = if start > 0 {
                    format!("{}{}", CONTINUATION_PREFIX, substr)
                } else {
                    substr
                };

                if self.vocab.contains(&candidate) {
                    matched = Some(candidate);
                    break;
                }

                end -= 1;
            }

            match matched {
                Some(piece) => {
                    pieces.push(piece);
                    start = end;
                }
                None => {
                    // No known subword starts here; the whole word is unknown.
                    output.push(self.unknown_token.clone());
                    return;
                }
            }
        }

        output.extend(pieces);
    }
}

impl Tokenizer for WordpieceTokenizer {
    fn name(&self) -> &'static str {
        "WordpieceTokenizer"
    }

    fn supports(&self, capability: Capability) -> bool {
        matches!(capability, Capability::Tokenize | Capability::UnknownToken)
    }

    /// Tokenize one word, or several words separated by single spaces. Each
    /// space-delimited word is processed independently.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        let mut output = Vec::new();
        for word in text.trim().split(' ') {
            self.tokenize_word(word, &mut output);
        }
        trace!(bytes = text.len(), pieces = output.len(), "wordpiece tokenize");
        Ok(output)
    }

    fn unknown_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.unknown_token.as_str())
    }
}
