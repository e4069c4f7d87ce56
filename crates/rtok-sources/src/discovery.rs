//! Candidate file discovery for a target

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rtok_core::{Error, Result, Target};
use tracing::{debug, warn};

use crate::exclude::ExcludeList;
use crate::filter::{FileFilter, Verdict};
use crate::source::{FileSource, SourceOptions, select_source};
use crate::walk::WalkSource;

/// Files selected for counting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub paths: Vec<PathBuf>,
    /// Files dropped for exceeding the size ceiling
    pub oversized: usize,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

pub struct Discovery {
    options: SourceOptions,
    filter: FileFilter,
    source: Option<Arc<dyn FileSource>>,
}

impl Discovery {
    pub fn new(options: SourceOptions) -> Self {
        let filter = FileFilter::new(&options.extensions, options.max_file_size)
            .with_exclude(ExcludeList::new(&options.exclude));
        Self {
            options,
            filter,
            source: None,
        }
    }

    /// Always list with `source` instead of probing for one
    pub fn with_source(mut self, source: Arc<dyn FileSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Filtered candidate files for `target`.
    ///
    /// A file target yields itself if it passes the filter. A directory is
    /// listed once with the selected strategy; if that listing fails the
    /// filesystem walk is used instead.
    pub async fn discover(&self, target: &Target) -> Result<CandidateSet> {
        match target {
            Target::File(path) => {
                let root = path.parent().unwrap_or(path);
                Ok(self.retain(root, vec![path.clone()]))
            }
            Target::Directory(root) => {
                let listed = self.list(root).await?;
                let total = listed.len();

                let filter = self.filter.clone();
                let root_owned = root.clone();
                let set = tokio::task::spawn_blocking(move || {
                    retain_with(&filter, &root_owned, listed)
                })
                .await
                .map_err(|e| Error::Other(e.into()))?;

                debug!(
                    "Discovered {} of {} listed files under {} ({} oversized)",
                    set.len(),
                    total,
                    root.display(),
                    set.oversized
                );
                Ok(set)
            }
        }
    }

    async fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let source = match &self.source {
            Some(source) => source.clone(),
            None => select_source(root, &self.options).await,
        };

        match source.list(root).await {
            Ok(paths) => Ok(paths),
            Err(e) if source.name() != WalkSource::NAME => {
                warn!(
                    "{} listing failed ({}), falling back to filesystem walk",
                    source.name(),
                    e
                );
                WalkSource::new(self.options.ignore_dirs.clone())
                    .list(root)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    fn retain(&self, root: &Path, paths: Vec<PathBuf>) -> CandidateSet {
        retain_with(&self.filter, root, paths)
    }
}

fn retain_with(filter: &FileFilter, root: &Path, paths: Vec<PathBuf>) -> CandidateSet {
    let mut set = CandidateSet::default();

    for path in paths {
        match filter.check(root, &path) {
            Verdict::Accept => set.paths.push(path),
            Verdict::TooLarge => {
                debug!("Skipping large file {}", path.display());
                set.oversized += 1;
            }
            Verdict::WrongExtension | Verdict::Excluded | Verdict::NotAFile => {}
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MIB: usize = 1024 * 1024;

    /// Lists a fixed set of names, counting calls
    struct FixedSource {
        names: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FileSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.names.iter().map(|n| root.join(n)).collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl FileSource for FailingSource {
        fn name(&self) -> &'static str {
            "git"
        }

        async fn list(&self, _root: &Path) -> Result<Vec<PathBuf>> {
            Err(Error::Other(anyhow::anyhow!("git ls-files timed out")))
        }
    }

    fn write(root: &Path, relative: &str, content: &[u8]) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn walk_discovery() -> Discovery {
        Discovery::new(SourceOptions::default())
            .with_source(Arc::new(WalkSource::new(SourceOptions::default().ignore_dirs)))
    }

    #[tokio::test]
    async fn test_keeps_only_allowed_files() {
        let dir = tempfile::tempdir().unwrap();
        // N = 4 allowed
        write(dir.path(), "a.py", b"print(1)");
        write(dir.path(), "src/b.ts", b"let b = 2;");
        write(dir.path(), "docs/c.mdx", b"# C");
        write(dir.path(), "conf/d.yml", b"d: 4");
        // M = 3 disallowed or oversized
        write(dir.path(), "b.bin", b"\x00\x01");
        write(dir.path(), "Makefile", b"all:");
        write(dir.path(), "big.json", &vec![b' '; MIB + 1]);

        let target = Target::resolve(dir.path()).unwrap();
        let set = walk_discovery().discover(&target).await.unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.oversized, 1);
        for path in &set.paths {
            let name = path.file_name().unwrap().to_string_lossy();
            assert!(!["b.bin", "Makefile", "big.json"].contains(&name.as_ref()));
        }
    }

    #[tokio::test]
    async fn test_size_boundary_in_traversal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "exact.md", &vec![b'a'; MIB]);
        write(dir.path(), "over.md", &vec![b'a'; MIB + 1]);

        let target = Target::resolve(dir.path()).unwrap();
        let set = walk_discovery().discover(&target).await.unwrap();

        assert_eq!(set.len(), 1);
        assert!(set.paths[0].ends_with("exact.md"));
        assert_eq!(set.oversized, 1);
    }

    #[tokio::test]
    async fn test_file_target() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "main.py", b"x = 1");
        write(dir.path(), "data.csv", b"a,b");

        let discovery = walk_discovery();

        let allowed = Target::resolve(dir.path().join("main.py")).unwrap();
        assert_eq!(discovery.discover(&allowed).await.unwrap().len(), 1);

        let disallowed = Target::resolve(dir.path().join("data.csv")).unwrap();
        assert!(discovery.discover(&disallowed).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listed_but_missing_files_dropped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "kept.py", b"x");

        let source = Arc::new(FixedSource {
            names: vec!["kept.py", "deleted.py", "notes.txt"],
            calls: AtomicUsize::new(0),
        });
        let discovery = Discovery::new(SourceOptions::default()).with_source(source.clone());

        let target = Target::resolve(dir.path()).unwrap();
        let set = discovery.discover(&target).await.unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_listing_falls_back_to_walk() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", b"x");
        write(dir.path(), "lib/b.py", b"y");

        let discovery =
            Discovery::new(SourceOptions::default()).with_source(Arc::new(FailingSource));

        let target = Target::resolve(dir.path()).unwrap();
        assert_eq!(discovery.discover(&target).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exclude_patterns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/app.js", b"x");
        write(dir.path(), "src/app.min.js", b"x");

        let options = SourceOptions {
            exclude: vec!["**/*.min.js".to_string()],
            ..SourceOptions::default()
        };
        let discovery =
            Discovery::new(options).with_source(Arc::new(WalkSource::new(Vec::new())));

        let target = Target::resolve(dir.path()).unwrap();
        let set = discovery.discover(&target).await.unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.paths[0].ends_with("src/app.js"));
    }
}
