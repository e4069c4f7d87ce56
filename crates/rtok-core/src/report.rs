use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a file contributed nothing to the total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Over the size ceiling during traversal
    Large,
    Empty,
    Unreadable,
    /// NUL bytes or invalid UTF-8
    Binary,
    /// The tokenizer rejected the content
    Tokenizer,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Large => "large",
            Self::Empty => "empty",
            Self::Unreadable => "unreadable",
            Self::Binary => "binary",
            Self::Tokenizer => "tokenizer",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    #[serde(default)]
    pub large: usize,
    #[serde(default)]
    pub empty: usize,
    #[serde(default)]
    pub unreadable: usize,
    #[serde(default)]
    pub binary: usize,
    #[serde(default)]
    pub tokenizer: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        self.add(reason, 1);
    }

    pub fn add(&mut self, reason: SkipReason, n: usize) {
        let slot = match reason {
            SkipReason::Large => &mut self.large,
            SkipReason::Empty => &mut self.empty,
            SkipReason::Unreadable => &mut self.unreadable,
            SkipReason::Binary => &mut self.binary,
            SkipReason::Tokenizer => &mut self.tokenizer,
        };
        *slot += n;
    }

    pub fn total(&self) -> usize {
        self.large + self.empty + self.unreadable + self.binary + self.tokenizer
    }

    /// Non-zero counters in a stable order, for display
    pub fn nonzero(&self) -> Vec<(SkipReason, usize)> {
        [
            (SkipReason::Large, self.large),
            (SkipReason::Empty, self.empty),
            (SkipReason::Unreadable, self.unreadable),
            (SkipReason::Binary, self.binary),
            (SkipReason::Tokenizer, self.tokenizer),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

/// Result of measuring one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountReport {
    pub total_tokens: usize,
    pub file_count: usize,
    #[serde(default)]
    pub skipped: SkipCounts,
    /// Token totals keyed by lowercased extension (with leading dot)
    #[serde(default)]
    pub ext_totals: BTreeMap<String, usize>,
    pub encoding: String,
    pub model: String,
    /// Set when the report was served from cache; never persisted as true
    #[serde(default, skip_serializing)]
    pub cached: bool,
}

impl CountReport {
    pub fn new(model: impl Into<String>, encoding: impl Into<String>) -> Self {
        Self {
            total_tokens: 0,
            file_count: 0,
            skipped: SkipCounts::default(),
            ext_totals: BTreeMap::new(),
            encoding: encoding.into(),
            model: model.into(),
            cached: false,
        }
    }

    pub fn average_per_file(&self) -> usize {
        if self.file_count == 0 {
            0
        } else {
            self.total_tokens / self.file_count
        }
    }

    /// Extensions ordered by token total, largest first
    pub fn top_extensions(&self, n: usize) -> Vec<(&str, usize)> {
        let mut totals: Vec<(&str, usize)> = self
            .ext_totals
            .iter()
            .map(|(ext, tokens)| (ext.as_str(), *tokens))
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        totals.truncate(n);
        totals
    }
}
