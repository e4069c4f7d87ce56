use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rtok_core::{Error, Result};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::source::FileSource;

/// Recursive filesystem walk, used when there is no git index
pub struct WalkSource {
    ignore_dirs: Vec<String>,
}

impl WalkSource {
    pub const NAME: &'static str = "walk";

    pub fn new(ignore_dirs: Vec<String>) -> Self {
        Self { ignore_dirs }
    }

    fn walk(root: &Path, ignore_dirs: &[String]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped(e, ignore_dirs))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_file() || file_type.is_symlink() {
                files.push(entry.into_path());
            }
        }

        files
    }
}

#[async_trait]
impl FileSource for WalkSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = root.to_path_buf();
        let ignore_dirs = self.ignore_dirs.clone();

        tokio::task::spawn_blocking(move || Self::walk(&root, &ignore_dirs))
            .await
            .map_err(|e| Error::Other(e.into()))
    }
}

/// Hidden entries, and directories on the ignore list
fn is_skipped(entry: &DirEntry, ignore_dirs: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && ignore_dirs.iter().any(|d| *d == name)
}
