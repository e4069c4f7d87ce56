//! Model name to BPE encoding lookup

use std::fmt;

use tiktoken_rs::tokenizer::{Tokenizer as ModelTokenizer, get_tokenizer};

/// BPE tables shipped with tiktoken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// GPT-4o and later
    O200kBase,
    /// GPT-4 / GPT-3.5-turbo; also the fallback for unknown models
    Cl100kBase,
    P50kBase,
    P50kEdit,
    /// GPT-2 and the original GPT-3 models
    R50kBase,
}

impl Encoding {
    pub const DEFAULT: Encoding = Encoding::Cl100kBase;

    pub fn name(&self) -> &'static str {
        match self {
            Self::O200kBase => "o200k_base",
            Self::Cl100kBase => "cl100k_base",
            Self::P50kBase => "p50k_base",
            Self::P50kEdit => "p50k_edit",
            Self::R50kBase => "r50k_base",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ModelTokenizer> for Encoding {
    fn from(tokenizer: ModelTokenizer) -> Self {
        match tokenizer {
            ModelTokenizer::O200kBase => Self::O200kBase,
            ModelTokenizer::Cl100kBase => Self::Cl100kBase,
            ModelTokenizer::P50kBase => Self::P50kBase,
            ModelTokenizer::P50kEdit => Self::P50kEdit,
            // gpt2 and r50k_base share one table
            ModelTokenizer::R50kBase | ModelTokenizer::Gpt2 => Self::R50kBase,
        }
    }
}

/// How a model name was mapped to its encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// tiktoken knows the model
    Exact,
    /// Non-OpenAI model approximated with a close OpenAI encoding
    Approximate,
    /// Unrecognized name
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingMatch {
    pub encoding: Encoding,
    pub kind: MatchKind,
}

// No public tokenizer for these families; cl100k_base is the closest stand-in
const APPROXIMATE_PREFIXES: &[&str] = &["claude-", "anthropic-", "gemini-"];

/// Map a model name to its encoding, reporting how the match was made.
///
/// tiktoken's own model table is consulted first; only names it does not
/// know fall through to the approximate families and then the default.
pub fn resolve_model(model: &str) -> EncodingMatch {
    let key = model.trim().to_ascii_lowercase();

    if let Some(tokenizer) = get_tokenizer(&key) {
        return EncodingMatch {
            encoding: tokenizer.into(),
            kind: MatchKind::Exact,
        };
    }

    let kind = if APPROXIMATE_PREFIXES.iter().any(|p| key.starts_with(p)) {
        MatchKind::Approximate
    } else {
        MatchKind::Fallback
    };

    EncodingMatch {
        encoding: Encoding::DEFAULT,
        kind,
    }
}

/// Map a model name to its encoding; unknown names get `cl100k_base`
pub fn resolve_encoding(model: &str) -> Encoding {
    resolve_model(model).encoding
}
