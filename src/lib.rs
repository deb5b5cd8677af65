pub mod cli;
pub mod config;
pub mod error;
pub mod tokenizer;
pub mod vocab;

pub use config::{SpecialTokens, TokenizerConfig};
pub use error::TokenizerError;
pub use tokenizer::{
    encode_batch, BasicTokenizer, BertTokenizer, Capability, Tokenizer, WordpieceTokenizer,
};
pub use vocab::Vocabulary;
