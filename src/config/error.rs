use crate::structs::{FileFormat, Source};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration problems. All of them are fatal and surface before any file is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Pattern `{0}` has no named capture groups")]
    NoCaptureGroups(String),

    #[error("Pattern `{pattern}` uses unknown capture group `{group}`")]
    UnknownCaptureGroup { pattern: String, group: String },

    #[error("Session date pattern `{0}` must define a `date` capture group")]
    MissingDateGroup(String),

    #[error("Extension `{extension}` is mapped to both {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: FileFormat,
        second: FileFormat,
    },

    #[error("Configuration value `{0}` must not be empty")]
    EmptyValue(&'static str),

    #[error("Source `{0}` is listed more than once in a precedence order")]
    DuplicateSource(Source),

    #[error("FITS block limit {value} is outside 1..={max}")]
    BlockLimitOutOfRange { value: usize, max: usize },
}
