//! Time-expiring result cache keyed by absolute target path

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rtok_core::CountReport;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Clock, CacheStore, Result};

pub type CacheMap = BTreeMap<String, CacheEntry>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub count: usize,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    /// Full breakdown of the run that produced `count`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<CountReport>,
}

pub struct ResultCache {
    store: Box<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    max_entries: usize,
}

impl ResultCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
    pub const DEFAULT_MAX_ENTRIES: usize = 10;

    pub fn new(store: Box<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Self::DEFAULT_TTL,
            max_entries: Self::DEFAULT_MAX_ENTRIES,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cap on stored entries; 0 disables trimming
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Fresh entry for `key`, if any. Unreadable or corrupt storage is a miss.
    pub fn lookup(&self, key: &str) -> Option<CacheEntry> {
        let entries = match self.store.load() {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cache unreadable, treating as empty: {}", e);
                return None;
            }
        };

        let entry = entries.get(key)?;
        let age = self.clock.now() - entry.timestamp;
        if age < 0.0 {
            debug!("Cache entry for {} is stamped {:.1}s in the future", key, -age);
            None
        } else if age < self.ttl.as_secs_f64() {
            Some(entry.clone())
        } else {
            debug!("Cache entry for {} expired ({:.1}s old)", key, age);
            None
        }
    }

    /// Upsert `count` for `key` stamped with the current time, then write back
    /// the whole map. Unreadable existing storage is replaced.
    pub fn store(&self, key: &str, count: usize, report: Option<CountReport>) -> Result<()> {
        let mut entries = self.store.load().unwrap_or_else(|e| {
            debug!("Replacing unreadable cache: {}", e);
            CacheMap::new()
        });

        entries.insert(
            key.to_string(),
            CacheEntry {
                count,
                timestamp: self.clock.now(),
                report,
            },
        );

        if self.max_entries > 0 && entries.len() > self.max_entries {
            trim_oldest(&mut entries, self.max_entries);
        }

        self.store.save(&entries)
    }
}

fn trim_oldest(entries: &mut CacheMap, keep: usize) {
    let mut by_age: Vec<(String, f64)> = entries
        .iter()
        .map(|(key, entry)| (key.clone(), entry.timestamp))
        .collect();
    by_age.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (key, _) in by_age.into_iter().skip(keep) {
        entries.remove(&key);
    }
}
