//! Core domain models for repo-tokens
//!
//! This crate contains:
//! - The measured target (file or directory)
//! - Count reports and per-file skip reasons
//! - Compact token formatting shared by every output mode

pub mod error;
pub mod format;
pub mod report;
pub mod target;

pub use error::{Error, Result};
pub use format::{format_thousands, format_tokens};
pub use report::{CountReport, SkipCounts, SkipReason};
pub use target::Target;
