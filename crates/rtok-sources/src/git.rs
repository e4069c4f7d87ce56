use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use rtok_core::{Error, Result};
use tokio::process::Command;

use crate::source::FileSource;

/// Lists files tracked in the git index (`git ls-files`)
pub struct GitIndexSource {
    timeout: Duration,
}

impl GitIndexSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// True when `git` is installed and `root` is inside a work tree
    pub async fn probe(root: &Path, timeout: Duration) -> bool {
        if which::which("git").is_err() {
            return false;
        }

        match run_git(root, &["rev-parse", "--is-inside-work-tree"], timeout).await {
            Ok(output) => output.status.success() && output.stdout.trim_ascii() == b"true",
            Err(_) => false,
        }
    }
}

#[async_trait]
impl FileSource for GitIndexSource {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let output = run_git(root, &["ls-files", "-z"], self.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Other(anyhow::anyhow!(
                "git ls-files failed: {}",
                stderr.trim()
            )));
        }

        Ok(parse_ls_files(&output.stdout)
            .into_iter()
            .map(|relative| root.join(relative))
            .collect())
    }
}

/// Run git in `dir`, killing it if it outlives `timeout`
async fn run_git(dir: &Path, args: &[&str], timeout: Duration) -> Result<Output> {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir).kill_on_drop(true);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(output) => output
            .map_err(|e| Error::Other(anyhow::anyhow!("Failed to run git {}: {}", args.join(" "), e))),
        Err(_) => Err(Error::Other(anyhow::anyhow!(
            "git {} timed out after {:?}",
            args.join(" "),
            timeout
        ))),
    }
}

/// Split NUL-separated `git ls-files -z` output
fn parse_ls_files(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|&b| b == 0)
        .filter(|entry| !entry.is_empty())
        .map(|entry| String::from_utf8_lossy(entry).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn git_available() -> bool {
        which::which("git").is_ok()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_parse_ls_files() {
        assert!(parse_ls_files(b"").is_empty());
        assert_eq!(
            parse_ls_files(b"src/main.py\0docs/with space.md\0"),
            vec!["src/main.py".to_string(), "docs/with space.md".to_string()]
        );
    }

    #[tokio::test]
    async fn test_probe_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        // tempdirs can live under a repo on some machines; only check when clean
        let inside = GitIndexSource::probe(dir.path(), Duration::from_secs(5)).await;
        if git_available() && !inside {
            let source = GitIndexSource::new(Duration::from_secs(5));
            assert!(source.list(dir.path()).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_lists_tracked_files_only() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src").join("app.ts"), "let x = 1;").unwrap();
        std::fs::write(dir.path().join("untracked.py"), "print(1)").unwrap();
        git(dir.path(), &["add", "src/app.ts"]);

        assert!(GitIndexSource::probe(dir.path(), Duration::from_secs(5)).await);

        let source = GitIndexSource::new(Duration::from_secs(5));
        let files = source.list(dir.path()).await.unwrap();
        assert_eq!(files, vec![dir.path().join("src").join("app.ts")]);
    }
}
