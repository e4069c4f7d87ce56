use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Path '{}' does not exist", .0.display())]
    TargetNotFound(PathBuf),

    #[error("Path '{}' is neither a file nor a directory", .0.display())]
    UnsupportedTarget(PathBuf),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
