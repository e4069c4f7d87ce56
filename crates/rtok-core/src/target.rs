use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// The file or directory being measured, always held as an absolute path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
}

impl Target {
    /// Resolve a user-supplied path into an absolute target
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let absolute = std::fs::canonicalize(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::TargetNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        let metadata = std::fs::metadata(&absolute)?;
        if metadata.is_file() {
            Ok(Self::File(absolute))
        } else if metadata.is_dir() {
            Ok(Self::Directory(absolute))
        } else {
            Err(Error::UnsupportedTarget(absolute))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Directory(path) => path,
        }
    }

    /// Key under which results for this target are cached
    pub fn cache_key(&self) -> String {
        self.path().to_string_lossy().into_owned()
    }

    /// Last path component, used as the display name in reports
    pub fn display_name(&self) -> String {
        self.path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path().display().to_string())
    }
}
