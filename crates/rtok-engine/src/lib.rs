pub mod aggregate;

use std::sync::Arc;

use anyhow::Result;
use rtok_core::{CountReport, SkipReason, Target};
use rtok_sources::Discovery;
use rtok_storage::{CacheEntry, ResultCache};
use rtok_tokens::Tokenizer;
use tracing::{debug, warn};

pub use aggregate::{Aggregate, FileOutcome, aggregate, classify, count_file};

/// Measures one target: cache lookup, then discovery and counting on a miss
pub struct Counter {
    model: String,
    tokenizer: Arc<dyn Tokenizer>,
    discovery: Discovery,
    cache: Option<ResultCache>,
}

impl Counter {
    pub fn new(model: impl Into<String>, tokenizer: Arc<dyn Tokenizer>, discovery: Discovery) -> Self {
        Self {
            model: model.into(),
            tokenizer,
            discovery,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub async fn count(&self, target: &Target) -> Result<CountReport> {
        let key = target.cache_key();

        if let Some(report) = self.cached(&key) {
            debug!("Cache hit for {}", key);
            return Ok(report);
        }

        let report = self.measure(target).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&key, report.total_tokens, Some(report.clone())) {
                warn!("Failed to write token cache: {}", e);
            }
        }

        Ok(report)
    }

    /// Discover and count, ignoring the cache
    pub async fn measure(&self, target: &Target) -> Result<CountReport> {
        let (paths, oversized) = match target {
            // An explicitly named file is counted whatever its extension or size
            Target::File(path) => (vec![path.clone()], 0),
            Target::Directory(_) => {
                let set = self.discovery.discover(target).await?;
                (set.paths, set.oversized)
            }
        };

        let total = aggregate(&paths, self.tokenizer.as_ref()).await;

        let mut report = CountReport::new(&self.model, self.tokenizer.encoding_name());
        report.total_tokens = total.total_tokens;
        report.file_count = total.file_count;
        report.skipped = total.skipped;
        report.skipped.add(SkipReason::Large, oversized);
        report.ext_totals = total.ext_totals;

        debug!(
            "Counted {} tokens in {} files under {}",
            report.total_tokens,
            report.file_count,
            target.path().display()
        );
        Ok(report)
    }

    fn cached(&self, key: &str) -> Option<CountReport> {
        let entry = self.cache.as_ref()?.lookup(key)?;
        self.report_from_entry(entry)
    }

    /// Entries counted with a different encoding don't answer this run
    fn report_from_entry(&self, entry: CacheEntry) -> Option<CountReport> {
        let encoding = self.tokenizer.encoding_name();

        let mut report = match entry.report {
            Some(report) if report.encoding != encoding => {
                debug!(
                    "Cached count used {}, need {}; recounting",
                    report.encoding, encoding
                );
                return None;
            }
            Some(report) => report,
            None => CountReport::new(&self.model, encoding),
        };

        report.total_tokens = entry.count;
        report.model = self.model.clone();
        report.cached = true;
        Some(report)
    }
}
