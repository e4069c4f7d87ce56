use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for repo-tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model used when `--model` is not given
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Overrides `~/.cache/repo-tokens-cache.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extensions to count, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Files larger than this (bytes) are skipped during traversal
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Directory names never descended into by the filesystem walk
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Glob patterns matched against paths relative to the target
    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default = "default_git_timeout_secs")]
    pub git_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            cache: CacheConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            path: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            max_file_size: default_max_file_size(),
            ignore_dirs: default_ignore_dirs(),
            exclude: Vec::new(),
            git_timeout_secs: default_git_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_max_entries() -> usize {
    10
}

fn default_max_file_size() -> u64 {
    1024 * 1024
}

fn default_git_timeout_secs() -> u64 {
    5
}

fn default_extensions() -> Vec<String> {
    [
        "js", "jsx", "ts", "tsx", "py", "md", "mdx", "json", "yaml", "yml", "java",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ignore_dirs() -> Vec<String> {
    [
        "node_modules",
        "__pycache__",
        "dist",
        "build",
        "coverage",
        "venv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Load config from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "repo-tokens", "repo-tokens")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolved cache file location, `None` when no home directory is known
    pub fn cache_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.cache.path {
            return Some(path.clone());
        }
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".cache").join("repo-tokens-cache.json"))
    }
}
