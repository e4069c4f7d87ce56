use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "repo-tokens")]
#[command(about = "Count tokens in a repository or a file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a directory (recursive) or a single file
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Tokenizer selection by model name (default from config: gpt-4o)
    #[arg(long)]
    pub model: Option<String>,

    /// Simple output (just the compact token count)
    #[arg(long, group = "format")]
    pub simple: bool,

    /// Output formatted for a shell status line
    #[arg(long, group = "format")]
    pub status_line: bool,

    /// Colorful human-readable summary
    #[arg(long, group = "format")]
    pub pretty: bool,

    /// Full report as JSON
    #[arg(long, group = "format")]
    pub json: bool,

    /// Skip the result cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Config file (default: platform config dir)
    #[arg(long, env = "REPO_TOKENS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// How the report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Full,
    Simple,
    StatusLine,
    Pretty,
    Json,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.simple {
            OutputMode::Simple
        } else if self.status_line {
            OutputMode::StatusLine
        } else if self.pretty {
            OutputMode::Pretty
        } else if self.json {
            OutputMode::Json
        } else {
            OutputMode::Full
        }
    }
}
