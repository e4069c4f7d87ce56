pub mod discovery;
pub mod exclude;
pub mod filter;
pub mod git;
pub mod source;
pub mod walk;

pub use discovery::{CandidateSet, Discovery};
pub use exclude::ExcludeList;
pub use filter::{FileFilter, Verdict};
pub use git::GitIndexSource;
pub use source::{FileSource, SourceOptions, select_source};
pub use walk::WalkSource;
