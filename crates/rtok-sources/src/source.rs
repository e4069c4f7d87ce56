//! File listing strategies

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rtok_config::DiscoveryConfig;
use rtok_core::Result;
use tracing::debug;

use crate::git::GitIndexSource;
use crate::walk::WalkSource;

/// Options for discovering files under a directory
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Allowed extensions, without the leading dot
    pub extensions: Vec<String>,
    pub max_file_size: u64,
    /// Directory names the filesystem walk never enters
    pub ignore_dirs: Vec<String>,
    /// Globs matched against root-relative paths
    pub exclude: Vec<String>,
    pub git_timeout: Duration,
}

impl From<&DiscoveryConfig> for SourceOptions {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            max_file_size: config.max_file_size,
            ignore_dirs: config.ignore_dirs.clone(),
            exclude: config.exclude.clone(),
            git_timeout: Duration::from_secs(config.git_timeout_secs),
        }
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self::from(&DiscoveryConfig::default())
    }
}

/// Lists candidate files under a directory, before any filtering
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Absolute paths of files under `root`, in listing order
    async fn list(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Pick the listing strategy for `root`: the git index when `git` is
/// installed and `root` is inside a work tree, otherwise a filesystem walk.
pub async fn select_source(root: &Path, options: &SourceOptions) -> Arc<dyn FileSource> {
    if GitIndexSource::probe(root, options.git_timeout).await {
        debug!("Using git index for {}", root.display());
        Arc::new(GitIndexSource::new(options.git_timeout))
    } else {
        debug!("Using filesystem walk for {}", root.display());
        Arc::new(WalkSource::new(options.ignore_dirs.clone()))
    }
}
