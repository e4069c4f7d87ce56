//! Token counting using tiktoken

pub mod encoding;

use std::sync::Arc;

use rtok_core::{Error, Result};
use tiktoken_rs::CoreBPE;

pub use encoding::{Encoding, EncodingMatch, MatchKind, resolve_encoding, resolve_model};

/// Anything that can turn text into a token count
pub trait Tokenizer: Send + Sync {
    /// Encoding name reported alongside counts
    fn encoding_name(&self) -> &str;

    /// Count tokens in `text`. An error only affects the text being counted.
    fn count(&self, text: &str) -> Result<usize>;
}

/// tiktoken BPE tokenizer for one encoding
#[derive(Clone)]
pub struct BpeTokenizer {
    encoding: Encoding,
    bpe: Arc<CoreBPE>,
}

impl BpeTokenizer {
    /// Load the BPE table for `encoding`
    pub fn new(encoding: Encoding) -> Result<Self> {
        let bpe = match encoding {
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::P50kEdit => tiktoken_rs::p50k_edit(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        }
        .map_err(|e| Error::Tokenizer(format!("Failed to load {encoding}: {e}")))?;

        Ok(Self {
            encoding,
            bpe: Arc::new(bpe),
        })
    }
}

impl Tokenizer for BpeTokenizer {
    fn encoding_name(&self) -> &str {
        self.encoding.name()
    }

    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }
}
