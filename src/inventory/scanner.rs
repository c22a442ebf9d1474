use super::structs::{CancelToken, Inventory, ScanEvent, SkippedFile};
use crate::InventoryError;
use crate::config::ScanConfig;
use crate::headers::ReaderTable;
use crate::path::EditIndex;
use crate::resolver::RecordResolver;
use crate::structs::FileRecord;
use crate::utils::list_files_sorted;
use bon::bon;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, info, warn};

/// The main entry point for building an inventory.
///
/// A scanner is created once and can scan several roots. Use the builder to construct it:
/// ```rust,no_run
/// # use astro_inventory::{Scanner, InventoryError};
/// # fn main() -> Result<(), InventoryError> {
/// let mut scanner = Scanner::builder().progress_interval(100).build();
/// let inventory = scanner.run("/data/astro".as_ref(), |_| {})?;
/// inventory.write_csv("inventory.csv".as_ref())?;
/// # Ok(())
/// # }
/// ```
pub struct Scanner {
    resolver: RecordResolver,
    config: ScanConfig,
    progress_interval: usize,
    include_hidden: bool,
    cancel: CancelToken,
}

#[bon]
impl Scanner {
    /// Constructs a `Scanner` via a builder pattern.
    ///
    /// # Builder Arguments
    ///
    /// * `config: ScanConfig` - (Default: built-in tables) Compiled patterns, filters, extensions and layout.
    /// * `exiftool_path: Option<PathBuf>` - An optional path to a specific `exiftool` executable. If `None`, `exiftool` is searched for in the system's PATH. When it cannot be started, camera tags are skipped.
    /// * `readers: Option<ReaderTable>` - Replaces the default header readers.
    /// * `progress_interval: usize` - (Default: `50`) Emit a progress event every this many files.
    /// * `include_hidden: bool` - (Default: `false`) Also scan files and folders starting with a dot.
    /// * `cancel: CancelToken` - Token to stop the scan from elsewhere.
    #[builder]
    pub fn new(
        #[builder(default)] config: ScanConfig,
        exiftool_path: Option<PathBuf>,
        readers: Option<ReaderTable>,
        #[builder(default = 50)] progress_interval: usize,
        #[builder(default = false)] include_hidden: bool,
        #[builder(default)] cancel: CancelToken,
    ) -> Self {
        let readers = readers.unwrap_or_else(|| {
            ReaderTable::with_defaults(config.fits_block_limit(), exiftool_path.as_deref())
        });
        Self {
            resolver: RecordResolver::new(&config, readers),
            config,
            progress_interval: progress_interval.max(1),
            include_hidden,
            cancel,
        }
    }

    /// A token that cancels scans run by this scanner.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Starts a scan of `root`. The returned iterator processes one file per step.
    ///
    /// Clears a cancellation left over from an earlier scan.
    ///
    /// # Errors
    ///
    /// The root does not exist or is not a directory.
    pub fn scan(&mut self, root: &Path) -> Result<Scan<'_>, InventoryError> {
        self.cancel.reset();
        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(InventoryError::RootNotDirectory(root));
        }

        let listing = list_files_sorted(&root, self.include_hidden);
        let edits = EditIndex::build(
            &root,
            listing.files.iter().map(PathBuf::as_path),
            self.config.layout(),
        );
        let files: Vec<PathBuf> = listing
            .files
            .into_iter()
            .filter(|path| self.resolver.format_of(path).is_some())
            .collect();
        let total = files.len();
        info!(root = %root.display(), total, "starting scan");

        let skipped: Vec<SkippedFile> = listing
            .errors
            .into_iter()
            .map(|e| {
                warn!(error = %e, "could not read directory entry");
                SkippedFile {
                    path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
                    reason: e.to_string(),
                }
            })
            .collect();

        let mut pending = VecDeque::from([ScanEvent::Discovered { total }]);
        pending.extend(skipped.iter().cloned().map(ScanEvent::Skipped));

        Ok(Scan {
            resolver: &mut self.resolver,
            cancel: self.cancel.clone(),
            progress_interval: self.progress_interval,
            root,
            files: files.into_iter(),
            edits,
            total,
            processed: 0,
            records: Vec::with_capacity(total),
            skipped,
            pending,
            done: false,
        })
    }

    /// Scans `root` to the end, passing every event except the final one to `on_event`.
    pub fn run(
        &mut self,
        root: &Path,
        on_event: impl FnMut(&ScanEvent),
    ) -> Result<Inventory, InventoryError> {
        Ok(self.scan(root)?.complete_with(on_event))
    }
}

enum Step {
    Event(ScanEvent),
    Done(Inventory),
}

/// A running scan. Yields [`ScanEvent`]s and ends with [`ScanEvent::Finished`].
pub struct Scan<'a> {
    resolver: &'a mut RecordResolver,
    cancel: CancelToken,
    progress_interval: usize,
    root: PathBuf,
    files: vec::IntoIter<PathBuf>,
    edits: EditIndex,
    total: usize,
    processed: usize,
    records: Vec<FileRecord>,
    skipped: Vec<SkippedFile>,
    pending: VecDeque<ScanEvent>,
    done: bool,
}

impl Scan<'_> {
    /// Drives the scan to the end, passing every progress event to `on_event`.
    pub fn complete_with(mut self, mut on_event: impl FnMut(&ScanEvent)) -> Inventory {
        loop {
            match self.step() {
                Step::Event(event) => on_event(&event),
                Step::Done(inventory) => return inventory,
            }
        }
    }

    fn step(&mut self) -> Step {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Step::Event(event);
            }
            if self.cancel.is_cancelled() {
                warn!(processed = self.processed, total = self.total, "scan cancelled");
                return Step::Done(self.take_inventory(false));
            }
            let Some(path) = self.files.next() else {
                return Step::Done(self.take_inventory(true));
            };
            self.process(&path);
        }
    }

    fn process(&mut self, path: &Path) {
        match self.resolver.resolve(&self.root, path, &self.edits) {
            Ok(Some(record)) => {
                debug!(path = %path.display(), anomaly = record.anomaly, "resolved");
                self.records.push(record);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "skipping file");
                let skipped = SkippedFile {
                    path: e.path().to_path_buf(),
                    reason: e.to_string(),
                };
                self.skipped.push(skipped.clone());
                self.pending.push_back(ScanEvent::Skipped(skipped));
            }
        }

        self.processed += 1;
        if self.processed % self.progress_interval == 0 || self.processed == self.total {
            self.pending.push_back(ScanEvent::Progress {
                processed: self.processed,
                total: self.total,
            });
        }
    }

    fn take_inventory(&mut self, complete: bool) -> Inventory {
        self.done = true;
        info!(
            records = self.records.len(),
            skipped = self.skipped.len(),
            complete,
            "scan finished"
        );
        Inventory {
            root: self.root.clone(),
            records: std::mem::take(&mut self.records),
            skipped: std::mem::take(&mut self.skipped),
            complete,
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<ScanEvent> {
        if self.done {
            return None;
        }
        Some(match self.step() {
            Step::Event(event) => event,
            Step::Done(inventory) => ScanEvent::Finished(inventory),
        })
    }
}
