use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the astro-inventory crate.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not write CSV output: {0}")]
    Csv(#[from] csv::Error),

    // --- Specific Logic Errors ---
    #[error("Scan root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("The scan of {0} did not complete; write it as a partial inventory instead")]
    Incomplete(PathBuf),
}
