use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Files found below a folder, plus the entries that could not be read.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: Vec<PathBuf>,
    pub errors: Vec<walkdir::Error>,
}

/// Checks if a directory entry is hidden (starts with '.').
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

/// Recursively lists all files using `walkdir`, sorted by name within each folder so the
/// order is stable between runs.
///
/// Unreadable entries do not stop the walk; they are collected in [`Listing::errors`].
/// The root itself is never treated as hidden.
pub fn list_files_sorted(dir: &Path, include_hidden: bool) -> Listing {
    let mut listing = Listing::default();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => listing.files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => listing.errors.push(e),
        }
    }
    listing
}
