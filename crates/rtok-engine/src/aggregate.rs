//! Per-file counting and summation
//!
//! Every file yields a [`FileOutcome`]; the total is a fold over outcomes,
//! so a file that can't be read or tokenized adds zero instead of failing
//! the run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rtok_core::{SkipCounts, SkipReason};
use rtok_tokens::Tokenizer;
use tracing::debug;

/// Bytes inspected for NUL when deciding if content is binary
const BINARY_SNIFF_LEN: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Counted { tokens: usize },
    Skipped { reason: SkipReason },
}

/// Sum of outcomes over a set of files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub total_tokens: usize,
    pub file_count: usize,
    pub skipped: SkipCounts,
    pub ext_totals: BTreeMap<String, usize>,
}

impl Aggregate {
    pub fn add(&mut self, path: &Path, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Counted { tokens } => {
                self.total_tokens += tokens;
                self.file_count += 1;
                *self.ext_totals.entry(extension_key(path)).or_default() += tokens;
            }
            FileOutcome::Skipped { reason } => self.skipped.record(reason),
        }
    }
}

/// Classify already-read file content
pub fn classify(bytes: &[u8], tokenizer: &dyn Tokenizer) -> FileOutcome {
    if bytes.is_empty() {
        return FileOutcome::Skipped {
            reason: SkipReason::Empty,
        };
    }

    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return FileOutcome::Skipped {
            reason: SkipReason::Binary,
        };
    }

    let Ok(text) = std::str::from_utf8(bytes) else {
        return FileOutcome::Skipped {
            reason: SkipReason::Binary,
        };
    };

    match tokenizer.count(text) {
        Ok(tokens) => FileOutcome::Counted { tokens },
        Err(_) => FileOutcome::Skipped {
            reason: SkipReason::Tokenizer,
        },
    }
}

pub async fn count_file(path: &Path, tokenizer: &dyn Tokenizer) -> FileOutcome {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let outcome = classify(&bytes, tokenizer);
            if let FileOutcome::Skipped { reason } = outcome {
                debug!("Skipped {} ({})", path.display(), reason);
            }
            outcome
        }
        Err(e) => {
            debug!("Skipped {} (unreadable: {})", path.display(), e);
            FileOutcome::Skipped {
                reason: SkipReason::Unreadable,
            }
        }
    }
}

/// Read and count every path; empty input sums to zero
pub async fn aggregate(paths: &[PathBuf], tokenizer: &dyn Tokenizer) -> Aggregate {
    let mut total = Aggregate::default();
    for path in paths {
        let outcome = count_file(path, tokenizer).await;
        total.add(path, outcome);
    }
    total
}

fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtok_core::{Error, Result};

    /// One token per whitespace-separated word
    struct WordTokenizer;

    impl Tokenizer for WordTokenizer {
        fn encoding_name(&self) -> &str {
            "words"
        }

        fn count(&self, text: &str) -> Result<usize> {
            Ok(text.split_whitespace().count())
        }
    }

    /// Fails on any text containing "boom"
    struct FragileTokenizer;

    impl Tokenizer for FragileTokenizer {
        fn encoding_name(&self) -> &str {
            "fragile"
        }

        fn count(&self, text: &str) -> Result<usize> {
            if text.contains("boom") {
                Err(Error::Tokenizer("unsupported sequence".to_string()))
            } else {
                Ok(text.split_whitespace().count())
            }
        }
    }

    #[test]
    fn test_classify() {
        let t = WordTokenizer;
        assert_eq!(classify(b"a b c", &t), FileOutcome::Counted { tokens: 3 });
        assert_eq!(
            classify(b"", &t),
            FileOutcome::Skipped {
                reason: SkipReason::Empty
            }
        );
        assert_eq!(
            classify(b"ELF\x00\x01", &t),
            FileOutcome::Skipped {
                reason: SkipReason::Binary
            }
        );
        assert_eq!(
            classify(b"caf\xe9", &t),
            FileOutcome::Skipped {
                reason: SkipReason::Binary
            }
        );
    }

    #[tokio::test]
    async fn test_empty_input() {
        let total = aggregate(&[], &WordTokenizer).await;
        assert_eq!(total.total_tokens, 0);
        assert_eq!(total.file_count, 0);
        assert_eq!(total.skipped.total(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_contributes_zero() {
        let dir = tempfile::tempdir().unwrap();
        let valid = dir.path().join("valid.md");
        std::fs::write(&valid, "one two three").unwrap();
        let missing = dir.path().join("vanished.md");

        let total = aggregate(&[missing, valid], &WordTokenizer).await;

        assert_eq!(total.total_tokens, 3);
        assert_eq!(total.file_count, 1);
        assert_eq!(total.skipped.unreadable, 1);
    }

    #[tokio::test]
    async fn test_tokenizer_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.py");
        let good = dir.path().join("good.py");
        std::fs::write(&bad, "boom goes here").unwrap();
        std::fs::write(&good, "fine words").unwrap();

        let total = aggregate(&[bad, good], &FragileTokenizer).await;

        assert_eq!(total.total_tokens, 2);
        assert_eq!(total.skipped.tokenizer, 1);
    }

    #[tokio::test]
    async fn test_extension_totals() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("a.py", "one two"),
            ("b.PY", "three"),
            ("README", "four five six"),
            ("c.md", "seven"),
        ];
        let mut paths = Vec::new();
        for (name, content) in files {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            paths.push(path);
        }

        let total = aggregate(&paths, &WordTokenizer).await;

        assert_eq!(total.total_tokens, 7);
        assert_eq!(total.file_count, 4);
        assert_eq!(total.ext_totals[".py"], 3);
        assert_eq!(total.ext_totals[".md"], 1);
        assert_eq!(total.ext_totals["unknown"], 3);
    }
}
