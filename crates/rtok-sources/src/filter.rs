//! Extension, size and exclude filtering for discovered files

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::exclude::ExcludeList;

/// Outcome of checking one path against a [`FileFilter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    WrongExtension,
    TooLarge,
    Excluded,
    /// Missing, unreadable metadata, or not a regular file
    NotAFile,
}

#[derive(Debug, Clone)]
pub struct FileFilter {
    extensions: HashSet<String>,
    max_file_size: u64,
    exclude: ExcludeList,
}

impl FileFilter {
    /// `extensions` may be given with or without the leading dot
    pub fn new<S: AsRef<str>>(extensions: &[S], max_file_size: u64) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .collect(),
            max_file_size,
            exclude: ExcludeList::default(),
        }
    }

    pub fn with_exclude(mut self, exclude: ExcludeList) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn allows_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(e))
    }

    /// Check `path` (absolute) found under `root`. Cheap checks run first so
    /// metadata is only read for files that could be kept.
    pub fn check(&self, root: &Path, path: &Path) -> Verdict {
        if !self.allows_extension(path) {
            return Verdict::WrongExtension;
        }

        if !self.exclude.is_empty() {
            let relative = path.strip_prefix(root).unwrap_or(path);
            let relative = relative.to_string_lossy();
            if let Some(pattern) = self.exclude.matching_pattern(&relative) {
                debug!("Excluding {} (matches {})", relative, pattern);
                return Verdict::Excluded;
            }
        }

        match std::fs::metadata(path) {
            Ok(meta) if !meta.is_file() => Verdict::NotAFile,
            Ok(meta) if meta.len() > self.max_file_size => Verdict::TooLarge,
            Ok(_) => Verdict::Accept,
            Err(_) => Verdict::NotAFile,
        }
    }
}
