use crate::structs::FileRecord;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A file that was left out of the inventory, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    /// Canonical scan root.
    pub root: PathBuf,
    /// One record per supported file, in traversal order.
    pub records: Vec<FileRecord>,
    pub skipped: Vec<SkippedFile>,
    /// False when the scan was cancelled before every file was processed.
    pub complete: bool,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Events emitted while a scan runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// The tree has been walked; `total` supported files will be processed.
    Discovered { total: usize },
    Progress { processed: usize, total: usize },
    Skipped(SkippedFile),
    /// Always the last event.
    Finished(Inventory),
}

/// Cancels a running scan at the next file boundary. Clones share the same flag.
///
/// [`Scanner::scan`](super::Scanner::scan) resets the flag, so one token serves every scan of a
/// scanner.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
