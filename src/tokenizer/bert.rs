//! Full BERT tokenizer: special-token aware splitting, basic tokenization,
//! wordpiece, and the token <-> ID mapping.
//!
//! Text flows through three stages:
//!
//! 1. The text is cut around every occurrence of each special token, one pass
//!    per token, so special tokens survive as standalone segments.
//! 2. Every other segment goes through [`BasicTokenizer`] with the special
//!    tokens as its never-split set.
//! 3. Every basic token goes through [`WordpieceTokenizer`].
//!
//! `[CLS]` and `[SEP]` are never inserted automatically; callers that need
//! them add them to the token sequence themselves.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::basic::BasicTokenizer;
use super::wordpiece::{WordpieceTokenizer, CONTINUATION_PREFIX};
use super::{Capability, Tokenizer};
use crate::config::{SpecialTokens, TokenizerConfig};
use crate::error::TokenizerError;
use crate::vocab::Vocabulary;

/// BERT tokenizer bound to one vocabulary and one set of special tokens.
#[derive(Debug, Clone)]
pub struct BertTokenizer {
    vocab: Arc<Vocabulary>,
    special_tokens: SpecialTokens,
    basic: BasicTokenizer,
    wordpiece: WordpieceTokenizer,
}

impl BertTokenizer {
    /// Create a tokenizer from a vocabulary and a configuration.
    ///
    /// The unknown token does not have to be in the vocabulary, but
    /// [`encode`](Tokenizer::encode) fails on out-of-vocabulary tokens when it
    /// is missing.
    pub fn new(vocab: Vocabulary, config: TokenizerConfig) -> Result<Self, TokenizerError> {
        config.validate()?;

        let vocab = Arc::new(vocab);
        let special_tokens = config.special_tokens;

        if !vocab.contains(&special_tokens.unknown) {
            warn!(
                unknown_token = %special_tokens.unknown,
                "unknown token is not in the vocabulary; encoding out-of-vocabulary tokens will fail"
            );
        }

        let basic = BasicTokenizer::new(config.lowercase, special_tokens.as_array())
            .with_strip_accents(config.strip_accents);
        let wordpiece = WordpieceTokenizer::new(Arc::clone(&vocab), special_tokens.unknown.clone())
            .with_max_chars_per_word(config.max_chars_per_word);

        debug!(
            vocab_size = vocab.len(),
            lowercase = config.lowercase,
            strip_accents = config.strip_accents,
            max_chars_per_word = config.max_chars_per_word,
            "BERT tokenizer initialized"
        );

        Ok(Self {
            vocab,
            special_tokens,
            basic,
            wordpiece,
        })
    }

    /// Create a tokenizer from an ordered token list (ID = position).
    pub fn from_tokens(
        tokens: Vec<String>,
        config: TokenizerConfig,
    ) -> Result<Self, TokenizerError> {
        Self::new(Vocabulary::from_tokens(tokens)?, config)
    }

    /// Create a tokenizer from a prebuilt token -> ID mapping.
    pub fn from_map(
        token_to_id: HashMap<String, u32>,
        config: TokenizerConfig,
    ) -> Result<Self, TokenizerError> {
        Self::new(Vocabulary::from_map(token_to_id)?, config)
    }

    /// Create a tokenizer from a `vocab.txt` file (one token per line).
    pub fn from_vocab_file(path: &Path, config: TokenizerConfig) -> Result<Self, TokenizerError> {
        Self::new(Vocabulary::from_file(path)?, config)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn special_tokens(&self) -> &SpecialTokens {
        &self.special_tokens
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Tokenize `text` and encode the tokens in one step.
    pub fn encode_text(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
        let tokens = self.tokenize(text)?;
        self.encode(&tokens)
    }

    /// Decode IDs and detokenize the result into a plain string.
    pub fn decode_text(&self, ids: &[u32]) -> Result<String, TokenizerError> {
        let tokens = self.decode(ids)?;
        self.detokenize(&tokens)
    }

    fn unknown_id(&self) -> Result<u32, TokenizerError> {
        self.vocab
            .token_to_id(&self.special_tokens.unknown)
            .ok_or_else(|| {
                TokenizerError::Configuration(format!(
                    "unknown token '{}' is not in the vocabulary",
                    self.special_tokens.unknown
                ))
            })
    }

    /// Cut `text` into segments so that every special token occurrence is a
    /// segment of its own. One pass per special token; a segment that already
    /// equals a special token is never split again.
    fn split_on_special_tokens(&self, text: &str) -> Vec<String> {
        let mut pending = vec![text.to_string()];

        for token in self.special_tokens.as_array() {
            let mut next = Vec::with_capacity(pending.len());
            for segment in pending {
                if self.special_tokens.contains(&segment) {
                    next.push(segment);
                } else {
                    split_on_token(&segment, token, &mut next);
                }
            }
            pending = next;
        }

        pending
    }
}

/// Split `text` on every occurrence of `token`, keeping the token itself
/// between the pieces. Pieces are trimmed and dropped when empty.
fn split_on_token(text: &str, token: &str, output: &mut Vec<String>) {
    for (i, piece) in text.split(token).enumerate() {
        if i > 0 {
            output.push(token.to_string());
        }
        let piece = piece.trim();
        if !piece.is_empty() {
            output.push(piece.to_string());
        }
    }
}

impl Tokenizer for BertTokenizer {
    fn name(&self) -> &'static str {
        "BertTokenizer"
    }

    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::BeginningToken | Capability::EndToken)
    }

    /// Empty or whitespace-only text yields no tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut tokens = Vec::new();
        for segment in self.split_on_special_tokens(text) {
            if self.special_tokens.contains(&segment) {
                tokens.push(segment);
                continue;
            }
            for word in self.basic.tokenize(&segment)? {
                tokens.extend(self.wordpiece.tokenize(&word)?);
            }
        }

        trace!(bytes = text.len(), tokens = tokens.len(), "BERT tokenize");
        Ok(tokens)
    }

    /// Tokens missing from the vocabulary map to the unknown token's ID.
    fn encode(&self, tokens: &[String]) -> Result<Vec<u32>, TokenizerError> {
        tokens
            .iter()
            .map(|token| match self.vocab.token_to_id(token) {
                Some(id) => Ok(id),
                None => self.unknown_id(),
            })
            .collect()
    }

    /// IDs missing from the vocabulary decode to the unknown token text.
    fn decode(&self, ids: &[u32]) -> Result<Vec<String>, TokenizerError> {
        Ok(ids
            .iter()
            .map(|&id| {
                self.vocab
                    .id_to_token(id)
                    .unwrap_or(self.special_tokens.unknown.as_str())
                    .to_string()
            })
            .collect())
    }

    /// Join with spaces and glue `##` continuations onto the preceding piece.
    /// Original spacing and casing are not restored.
    fn detokenize(&self, tokens: &[String]) -> Result<String, TokenizerError> {
        let joined = tokens.join(" ");
        let marker = format!(" {}", CONTINUATION_PREFIX);
        Ok(joined.replace(&marker, "").trim().to_string())
    }

    fn classifier_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.special_tokens.classifier.as_str())
    }

    fn mask_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.special_tokens.mask.as_str())
    }

    fn pad_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.special_tokens.pad.as_str())
    }

    fn separator_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.special_tokens.separator.as_str())
    }

    fn unknown_token(&self) -> Result<&str, TokenizerError> {
        Ok(self.special_tokens.unknown.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // -----------------------------------------------------------------------
    // Helper: build a test vocabulary
    // -----------------------------------------------------------------------

    /// Token layout:
    ///    0: [PAD]   1: [UNK]   2: [CLS]   3: [SEP]   4: [MASK]
    ///    5: hello   6: world   7: ,       8: .       9: !
    ///   10: un     11: ##aff  12: ##able 13: the    14: cat
    ///   15: sat    16: Hello  17: '      18: s      19: #
    pub(super) fn make_test_vocab() -> Vec<String> {
        [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "hello", "world", ",", ".", "!", "un",
            "##aff", "##able", "the", "cat", "sat", "Hello", "'", "s", "#",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub(super) fn make_tokenizer() -> BertTokenizer {
        BertTokenizer::from_tokens(make_test_vocab(), TokenizerConfig::default()).unwrap()
    }

    fn make_tokenizer_with(config: TokenizerConfig) -> BertTokenizer {
        BertTokenizer::from_tokens(make_test_vocab(), config).unwrap()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Tokenize
    // -----------------------------------------------------------------------

    #[test]
    fn test_tokenize_basic_sentence() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("Hello, World!").unwrap(),
            vec!["hello", ",", "world", "!"]
        );
    }

    #[test]
    fn test_tokenize_wordpiece_expansion() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("the unaffable cat").unwrap(),
            vec!["the", "un", "##aff", "##able", "cat"]
        );
    }

    #[test]
    fn test_tokenize_unknown_word() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("the dog sat").unwrap(),
            vec!["the", "[UNK]", "sat"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        let tok = make_tokenizer();
        assert!(tok.tokenize("").unwrap().is_empty());
        assert!(tok.tokenize("   ").unwrap().is_empty());
        assert!(tok.tokenize(" \t\n ").unwrap().is_empty());
    }

    #[test]
    fn test_hello_comma_world_scenario() {
        let map: HashMap<String, u32> = [
            ("[CLS]", 0),
            ("hello", 1),
            ("world", 2),
            ("[SEP]", 3),
            ("[UNK]", 4),
            (",", 5),
        ]
        .into_iter()
        .map(|(t, i)| (t.to_string(), i))
        .collect();
        let tok = BertTokenizer::from_map(map, TokenizerConfig::default()).unwrap();

        let tokens = tok.tokenize("hello , world").unwrap();
        assert_eq!(tokens, vec!["hello", ",", "world"]);
        assert_eq!(tok.encode(&tokens).unwrap(), vec![1, 5, 2]);
    }

    #[test]
    fn test_tokenize_cased() {
        let tok = make_tokenizer_with(TokenizerConfig {
            lowercase: false,
            ..Default::default()
        });
        assert_eq!(
            tok.tokenize("Hello hello HELLO").unwrap(),
            vec!["Hello", "hello", "[UNK]"]
        );
    }

    #[test]
    fn test_tokenize_strip_accents() {
        let tok = make_tokenizer_with(TokenizerConfig {
            strip_accents: true,
            ..Default::default()
        });
        assert_eq!(tok.tokenize("Héllo wörld").unwrap(), vec!["hello", "world"]);
    }

    #[test]
    fn test_tokenize_max_chars_per_word() {
        let tok = make_tokenizer_with(TokenizerConfig {
            max_chars_per_word: 4,
            ..Default::default()
        });
        assert_eq!(tok.tokenize("hello the").unwrap(), vec!["[UNK]", "the"]);
    }

    #[test]
    fn test_tokenize_very_long_word() {
        let tok = make_tokenizer();
        let text = format!("the {} cat", "a".repeat(250));
        assert_eq!(tok.tokenize(&text).unwrap(), vec!["the", "[UNK]", "cat"]);
    }

    // -----------------------------------------------------------------------
    // Special tokens
    // -----------------------------------------------------------------------

    #[test]
    fn test_special_tokens_leading_and_trailing() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("[CLS] hello world [SEP]").unwrap(),
            vec!["[CLS]", "hello", "world", "[SEP]"]
        );
    }

    #[test]
    fn test_special_token_attached_to_words() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("hello[SEP]world.").unwrap(),
            vec!["hello", "[SEP]", "world", "."]
        );
    }

    #[test]
    fn test_adjacent_special_tokens() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("[SEP][SEP] [CLS]").unwrap(),
            vec!["[SEP]", "[SEP]", "[CLS]"]
        );
    }

    #[test]
    fn test_special_token_not_lowercased() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.tokenize("The [MASK] sat.").unwrap(),
            vec!["the", "[MASK]", "sat", "."]
        );
    }

    #[test]
    fn test_lowercase_spelling_is_not_special() {
        let tok = make_tokenizer();
        let tokens = tok.tokenize("[mask]").unwrap();
        assert!(!tokens.contains(&"[MASK]".to_string()));
        assert_eq!(tokens, vec!["[UNK]", "[UNK]", "[UNK]"]);
    }

    #[test]
    fn test_every_special_token_survives() {
        let tok = make_tokenizer();
        let tokens = tok
            .tokenize("[CLS] a[MASK]b [PAD],[SEP]! [UNK]")
            .unwrap();
        assert_eq!(
            tokens,
            vec!["[CLS]", "[UNK]", "[MASK]", "[UNK]", "[PAD]", ",", "[SEP]", "!", "[UNK]"]
        );
    }

    #[test]
    fn test_special_token_segment_not_resplit() {
        // The pad token is a substring of the classifier token. The classifier
        // pass runs first; the resulting "[CLS]" segment must not be cut again
        // by the pad pass.
        let mut config = TokenizerConfig::default();
        config.special_tokens.pad = "CLS".to_string();
        let tok = make_tokenizer_with(config);

        assert_eq!(
            tok.tokenize("hello [CLS] world").unwrap(),
            vec!["hello", "[CLS]", "world"]
        );
        assert_eq!(
            tok.tokenize("hello CLS world").unwrap(),
            vec!["hello", "CLS", "world"]
        );
    }

    #[test]
    fn test_custom_special_tokens() {
        let mut config = TokenizerConfig::default();
        config.special_tokens.unknown = "<unk>".to_string();
        config.special_tokens.mask = "<mask>".to_string();
        let mut vocab = make_test_vocab();
        vocab.push("<unk>".to_string()); // 20
        vocab.push("<mask>".to_string()); // 21
        let tok = BertTokenizer::from_tokens(vocab, config).unwrap();

        let tokens = tok.tokenize("the <mask> zzz").unwrap();
        assert_eq!(tokens, vec!["the", "<mask>", "<unk>"]);
        assert_eq!(tok.encode(&tokens).unwrap(), vec![13, 21, 20]);
        assert_eq!(tok.unknown_token().unwrap(), "<unk>");
    }

    #[test]
    fn test_split_on_token_drops_blank_pieces() {
        let mut output = Vec::new();
        split_on_token("  [SEP]  a  [SEP]", "[SEP]", &mut output);
        assert_eq!(output, vec!["[SEP]", "a", "[SEP]"]);
    }

    #[test]
    fn test_split_on_token_without_occurrence() {
        let mut output = Vec::new();
        split_on_token(" hello world ", "[SEP]", &mut output);
        assert_eq!(output, vec!["hello world"]);
    }

    // -----------------------------------------------------------------------
    // Encode / decode
    // -----------------------------------------------------------------------

    #[test]
    fn test_encode_known_tokens() {
        let tok = make_tokenizer();
        let ids = tok.encode(&strings(&["[CLS]", "hello", "world", "[SEP]"])).unwrap();
        assert_eq!(ids, vec![2, 5, 6, 3]);
    }

    #[test]
    fn test_encode_unknown_token_falls_back() {
        let tok = make_tokenizer();
        let ids = tok.encode(&strings(&["hello", "zebra", "HELLO"])).unwrap();
        assert_eq!(ids, vec![5, 1, 1]);
    }

    #[test]
    fn test_encode_empty() {
        let tok = make_tokenizer();
        assert!(tok.encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_encode_without_unknown_in_vocab() {
        let tok = BertTokenizer::from_tokens(strings(&["hello", "world"]), Default::default())
            .unwrap();
        // Known tokens still encode.
        assert_eq!(tok.encode(&strings(&["world"])).unwrap(), vec![1]);
        // Out-of-vocabulary tokens need the unknown token.
        match tok.encode(&strings(&["hello", "zebra"])) {
            Err(TokenizerError::Configuration(msg)) => assert!(msg.contains("[UNK]")),
            other => panic!("expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_encode_text() {
        let tok = make_tokenizer();
        assert_eq!(tok.encode_text("Hello, world!").unwrap(), vec![5, 7, 6, 9]);
        assert!(tok.encode_text("  ").unwrap().is_empty());
    }

    #[test]
    fn test_decode_known_ids() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.decode(&[2, 10, 11, 12, 3]).unwrap(),
            vec!["[CLS]", "un", "##aff", "##able", "[SEP]"]
        );
    }

    #[test]
    fn test_decode_out_of_range_is_unknown() {
        let tok = make_tokenizer();
        assert_eq!(
            tok.decode(&[5, 999, u32::MAX]).unwrap(),
            vec!["hello", "[UNK]", "[UNK]"]
        );
    }

    #[test]
    fn test_decode_sparse_vocabulary_gap() {
        let map: HashMap<String, u32> = [("[UNK]", 0), ("far", 50)]
            .into_iter()
            .map(|(t, i)| (t.to_string(), i))
            .collect();
        let tok = BertTokenizer::from_map(map, Default::default()).unwrap();
        assert_eq!(tok.decode(&[50, 25]).unwrap(), vec!["far", "[UNK]"]);
    }

    // -----------------------------------------------------------------------
    // Detokenize
    // -----------------------------------------------------------------------

    #[test]
    fn test_detokenize_joins_continuations() {
        let tok = make_tokenizer();
        let text = tok
            .detokenize(&strings(&["the", "un", "##aff", "##able", "cat", "."]))
            .unwrap();
        assert_eq!(text, "the unaffable cat .");
    }

    #[test]
    fn test_detokenize_empty() {
        let tok = make_tokenizer();
        assert_eq!(tok.detokenize(&[]).unwrap(), "");
    }

    #[test]
    fn test_detokenize_leading_continuation() {
        let tok = make_tokenizer();
        // No preceding space, so the marker stays.
        assert_eq!(tok.detokenize(&strings(&["##ing", "x"])).unwrap(), "##ing x");
    }

    #[test]
    fn test_decode_text() {
        let tok = make_tokenizer();
        assert_eq!(tok.decode_text(&[13, 10, 11, 12, 14]).unwrap(), "the unaffable cat");
    }

    // -----------------------------------------------------------------------
    // Accessors and construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_special_token_accessors() {
        let tok = make_tokenizer();
        assert_eq!(tok.classifier_token().unwrap(), "[CLS]");
        assert_eq!(tok.mask_token().unwrap(), "[MASK]");
        assert_eq!(tok.pad_token().unwrap(), "[PAD]");
        assert_eq!(tok.separator_token().unwrap(), "[SEP]");
        assert_eq!(tok.unknown_token().unwrap(), "[UNK]");
    }

    #[test]
    fn test_beginning_and_end_tokens_unsupported() {
        let tok = make_tokenizer();
        assert!(matches!(
            tok.beginning_token(),
            Err(TokenizerError::UnsupportedOperation {
                capability: Capability::BeginningToken,
                tokenizer: "BertTokenizer",
            })
        ));
        assert!(matches!(
            tok.end_token(),
            Err(TokenizerError::UnsupportedOperation {
                capability: Capability::EndToken,
                ..
            })
        ));
        assert!(!tok.supports(Capability::BeginningToken));
        assert!(tok.supports(Capability::Detokenize));
    }

    #[test]
    fn test_from_map_matches_from_tokens() {
        let from_tokens = make_tokenizer();
        let map: HashMap<String, u32> = make_test_vocab()
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i as u32))
            .collect();
        let from_map = BertTokenizer::from_map(map, Default::default()).unwrap();

        let text = "Hello [SEP] the unaffable cat's!";
        assert_eq!(
            from_tokens.encode_text(text).unwrap(),
            from_map.encode_text(text).unwrap()
        );
    }

    #[test]
    fn test_from_vocab_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for token in make_test_vocab() {
            writeln!(file, "{}", token).unwrap();
        }

        let tok = BertTokenizer::from_vocab_file(file.path(), Default::default()).unwrap();
        assert_eq!(tok.vocab_size(), 20);
        assert_eq!(tok.encode_text("hello world").unwrap(), vec![5, 6]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = BertTokenizer::from_tokens(
            make_test_vocab(),
            TokenizerConfig {
                max_chars_per_word: 0,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(TokenizerError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_vocab_rejected() {
        let result = BertTokenizer::from_tokens(strings(&["a", "a"]), Default::default());
        assert!(matches!(result, Err(TokenizerError::Configuration(_))));
    }

    #[test]
    fn test_shared_across_threads() {
        let tok = Arc::new(make_tokenizer());
        let expected = tok.encode_text("the unaffable cat sat").unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let tok = Arc::clone(&tok);
                let expected = expected.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(tok.encode_text("the unaffable cat sat").unwrap(), expected);
                    }
                });
            }
        });
    }
}
