use std::path::{Path, PathBuf};
use thiserror::Error;

/// A file that could not be turned into a record.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Could not access {path}: {source}")]
    Access {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ResolveError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Access { path, .. } => path.as_path(),
        }
    }
}
