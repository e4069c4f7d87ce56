//! Storage layer for repo-tokens
//!
//! This crate provides:
//! - The result cache (time-expiring count per target)
//! - Cache backends: a shared JSON file and an in-memory map
//! - Clocks, so expiry can be driven deterministically

pub mod cache;
pub mod clock;
pub mod error;
pub mod store;

pub use cache::{CacheEntry, CacheMap, ResultCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, StorageError};
pub use store::{CacheStore, JsonFileStore, MemoryStore};
