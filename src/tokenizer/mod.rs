//! Tokenizer capability contract and batch utilities.
//!
//! This module defines the [`Tokenizer`] trait implemented by [`BasicTokenizer`],
//! [`WordpieceTokenizer`] and [`BertTokenizer`]. The three variants share one
//! interface but support different subsets of it: an operation a variant does
//! not implement fails with [`TokenizerError::UnsupportedOperation`] instead of
//! returning an empty result. [`Tokenizer::supports`] answers the same question
//! without making the call.

pub mod basic;
pub mod bert;
pub mod wordpiece;

use std::fmt;

pub use basic::BasicTokenizer;
pub use bert::BertTokenizer;
pub use wordpiece::WordpieceTokenizer;

use crate::error::TokenizerError;

/// One operation of the [`Tokenizer`] contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Tokenize,
    Encode,
    Decode,
    Detokenize,
    BeginningToken,
    EndToken,
    ClassifierToken,
    MaskToken,
    PadToken,
    SeparatorToken,
    UnknownToken,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::Tokenize,
        Capability::Encode,
        Capability::Decode,
        Capability::Detokenize,
        Capability::BeginningToken,
        Capability::EndToken,
        Capability::ClassifierToken,
        Capability::MaskToken,
        Capability::PadToken,
        Capability::SeparatorToken,
        Capability::UnknownToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Tokenize => "tokenize",
            Capability::Encode => "encode",
            Capability::Decode => "decode",
            Capability::Detokenize => "detokenize",
            Capability::BeginningToken => "beginning token",
            Capability::EndToken => "end token",
            Capability::ClassifierToken => "classifier token",
            Capability::MaskToken => "mask token",
            Capability::PadToken => "pad token",
            Capability::SeparatorToken => "separator token",
            Capability::UnknownToken => "unknown token",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tokenizer that splits text into tokens and, depending on the variant,
/// maps tokens to vocabulary IDs and back.
///
/// All implementations must be thread-safe (`Send + Sync`). Every operation
/// reads only construction-time state, so one instance can be shared across
/// threads without locking.
pub trait Tokenizer: Send + Sync {
    /// Variant name reported in [`TokenizerError::UnsupportedOperation`].
    fn name(&self) -> &'static str;

    /// Whether this variant implements `capability`.
    ///
    /// The default reports only [`Capability::Tokenize`].
    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::Tokenize
    }

    /// Split text into an ordered sequence of tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError>;

    /// Map tokens to their vocabulary IDs.
    fn encode(&self, _tokens: &[String]) -> Result<Vec<u32>, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::Encode, self.name()))
    }

    /// Map vocabulary IDs back to tokens.
    fn decode(&self, _ids: &[u32]) -> Result<Vec<String>, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::Decode, self.name()))
    }

    /// Join tokens back into a plain string.
    fn detokenize(&self, _tokens: &[String]) -> Result<String, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::Detokenize, self.name()))
    }

    /// Beginning-of-sequence token.
    fn beginning_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::BeginningToken, self.name()))
    }

    /// End-of-sequence token.
    fn end_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::EndToken, self.name()))
    }

    /// Classifier token.
    fn classifier_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::ClassifierToken, self.name()))
    }

    /// Mask token for masked language modeling.
    fn mask_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::MaskToken, self.name()))
    }

    /// Pad token for batching.
    fn pad_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::PadToken, self.name()))
    }

    /// Separator token between sentences.
    fn separator_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::SeparatorToken, self.name()))
    }

    /// Token substituted for out-of-vocabulary words.
    fn unknown_token(&self) -> Result<&str, TokenizerError> {
        Err(TokenizerError::unsupported(Capability::UnknownToken, self.name()))
    }
}

/// Tokenize and encode a batch of texts using the given tokenizer.
///
/// Each text is processed independently. Returns one `Vec<u32>` per input text,
/// or the first error encountered.
pub fn encode_batch(
    tokenizer: &dyn Tokenizer,
    texts: &[&str],
) -> Result<Vec<Vec<u32>>, TokenizerError> {
    texts
        .iter()
        .map(|text| {
            let tokens = tokenizer.tokenize(text)?;
            tokenizer.encode(&tokens)
        })
        .collect()
}
