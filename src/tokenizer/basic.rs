//! Basic BERT tokenizer: text cleanup, whitespace split and punctuation split.
//!
//! The algorithm:
//!
//! 1. Drops NUL, U+FFFD and control characters.
//! 2. Splits on the ASCII space character.
//! 3. Lowercases (and optionally strips accents from) each word that is not
//!    listed in `never_split`.
//! 4. Splits every remaining word around Unicode punctuation, each punctuation
//!    character becoming its own token.
//!
//! Words listed in `never_split` skip steps 3 and 4 and are emitted whole.

use std::collections::HashSet;

use tracing::trace;
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

use super::Tokenizer;
use crate::error::TokenizerError;

/// Whitespace and punctuation tokenizer run ahead of wordpiece.
#[derive(Debug, Clone)]
pub struct BasicTokenizer {
    lowercase: bool,
    strip_accents: bool,
    /// Tokens exempt from lowercasing and punctuation splitting.
    never_split: HashSet<String>,
}

impl Default for BasicTokenizer {
    fn default() -> Self {
        Self::new(true, Vec::<String>::new())
    }
}

impl BasicTokenizer {
    pub fn new<I, S>(lowercase: bool, never_split: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lowercase,
            strip_accents: false,
            never_split: never_split.into_iter().map(Into::into).collect(),
        }
    }

    /// Enable NFD decomposition followed by removal of nonspacing marks.
    pub fn with_strip_accents(mut self, strip_accents: bool) -> Self {
        self.strip_accents = strip_accents;
        self
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    fn is_never_split(&self, word: &str) -> bool {
        self.never_split.contains(word)
    }

    /// Apply casing and accent normalization to one whitespace-delimited word.
    fn normalize(&self, word: &str) -> String {
        let word = if self.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };

        if self.strip_accents {
            word.nfd()
                .filter(|c| get_general_category(*c) != GeneralCategory::NonspacingMark)
                .collect()
        } else {
            word
        }
    }

    /// Split `word` around punctuation, appending the pieces to `output`.
    fn split_on_punctuation(&self, word: &str, output: &mut Vec<String>) {
        if self.is_never_split(word) {
            output.push(word.to_string());
            return;
        }

        let mut current = String::new();
        for ch in word.chars() {
            if is_punctuation(ch) {
                if !current.is_empty() {
                    output.push(std::mem::take(&mut current));
                }
                output.push(ch.to_string());
            } else {
                current.push(ch);
            }
        }

        if !current.is_empty() {
            output.push(current);
        }
    }
}

impl Tokenizer for BasicTokenizer {
    fn name(&self) -> &'static str {
        "BasicTokenizer"
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        if text.is_empty() {
            return Err(TokenizerError::InvalidArgument(
                "text to tokenize must not be empty".to_string(),
            ));
        }

        let cleaned = clean_text(text);
        let mut tokens = Vec::new();

        for word in cleaned.split(' ') {
            if word.is_empty() {
                continue;
            }
            if self.is_never_split(word) {
                tokens.push(word.to_string());
                continue;
            }
            let normalized = self.normalize(word);
            self.split_on_punctuation(&normalized, &mut tokens);
        }

        trace!(bytes = text.len(), tokens = tokens.len(), "basic tokenize");
        Ok(tokens)
    }
}

// ---------------------------------------------------------------------------
// Character classification helpers
// ---------------------------------------------------------------------------

/// Remove NUL, the replacement character and control characters.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| !(c == '\0' || c == '\u{FFFD}' || c.is_control()))
        .collect()
}

/// Check if a character is in Unicode General Category "P" (Punctuation).
///
/// Symbols (`$`, `+`, `<`, `^`, `|`, ...) are category S and are not split off.
fn is_punctuation(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}
