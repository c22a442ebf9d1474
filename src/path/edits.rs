use crate::config::Layout;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Folders below the scan root that contain edited or stacked output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditIndex {
    marked: HashSet<PathBuf>,
}

impl EditIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the folders of every edit indicator among `files`, ignoring calibration folders.
    pub fn build<'a>(
        root: &Path,
        files: impl IntoIterator<Item = &'a Path>,
        layout: &Layout,
    ) -> Self {
        let mut index = Self::new();
        for file in files {
            let Some(file_name) = file.file_name().map(|n| n.to_string_lossy()) else {
                continue;
            };
            if !layout.is_edit_indicator(&file_name) {
                continue;
            }
            let Some(folder) = file.parent() else {
                continue;
            };
            let in_calibration = folder.strip_prefix(root).is_ok_and(|relative| {
                let dirs: Vec<String> = relative
                    .iter()
                    .map(|segment| segment.to_string_lossy().into_owned())
                    .collect();
                layout
                    .calibration_in_folders(&dirs, layout.structural_levels(&dirs))
                    .is_some()
            });
            if in_calibration {
                debug!(path = %file.display(), "ignoring edit indicator in calibration folder");
                continue;
            }
            debug!(path = %file.display(), "edit indicator found");
            index.mark(root, folder);
        }
        index
    }

    /// Marks `folder` and its ancestors, stopping before `root`.
    pub fn mark(&mut self, root: &Path, folder: &Path) {
        let mut current = Some(folder);
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) || !self.marked.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
    }

    pub fn is_marked(&self, folder: &Path) -> bool {
        self.marked.contains(folder)
    }

    /// Whether the file's folder or the folder above it holds edits.
    pub fn has_edits_near(&self, file: &Path) -> bool {
        file.ancestors()
            .skip(1)
            .take(2)
            .any(|folder| self.is_marked(folder))
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}
