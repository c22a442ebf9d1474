use super::error::ResolveError;
use super::interpret::header_candidates;
use super::merge::{Layers, Resolved};
use crate::config::ScanConfig;
use crate::headers::ReaderTable;
use crate::path::{EditIndex, PathClassifier};
use crate::patterns::PatternMatcher;
use crate::structs::{FileFormat, FileRecord};
use std::path::Path;
use tracing::debug;

/// Builds one [`FileRecord`] per supported file from its header, its name and its place in the
/// folder tree.
pub struct RecordResolver {
    config: ScanConfig,
    matcher: PatternMatcher,
    classifier: PathClassifier,
    readers: ReaderTable,
}

impl RecordResolver {
    pub fn new(config: &ScanConfig, readers: ReaderTable) -> Self {
        Self {
            config: config.clone(),
            matcher: PatternMatcher::new(config),
            classifier: PathClassifier::new(config),
            readers,
        }
    }

    pub fn format_of(&self, path: &Path) -> Option<FileFormat> {
        self.config.format_of(path)
    }

    /// Resolves `path`, found below `root`.
    ///
    /// Returns `Ok(None)` for files with an unsupported extension. An unreadable header only
    /// removes that source; the record is still produced.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Access`] when the file cannot be opened.
    pub fn resolve(
        &mut self,
        root: &Path,
        path: &Path,
        edits: &EditIndex,
    ) -> Result<Option<FileRecord>, ResolveError> {
        let Some(format) = self.format_of(path) else {
            return Ok(None);
        };

        let context = self.classifier.classify(root, path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = self
            .readers
            .read(format, path)
            .map_err(|source| ResolveError::Access {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(problem) = outcome.problem() {
            debug!(path = %path.display(), problem, "header not fully readable");
        }

        let layers = Layers {
            header: header_candidates(
                format,
                &outcome.into_fields(),
                self.config.filters(),
                self.config.placeholders(),
            ),
            filename: self.matcher.match_filename(&file_name),
            folder: self
                .matcher
                .match_folders(context.folders.iter().map(String::as_str)),
            path: context.candidates(),
        };
        let Resolved {
            object,
            telescope,
            camera,
            focal_length,
            session_date,
            capture_time,
            location,
            filter,
            exposure_s,
            gain,
            temperature_c,
            binning,
            rotation,
        } = layers.merge(self.config.precedence());

        Ok(Some(FileRecord {
            path: path.to_path_buf(),
            format,
            object,
            telescope,
            camera,
            focal_length,
            session_date,
            capture_time,
            location,
            filter,
            exposure_s,
            gain,
            temperature_c,
            binning,
            rotation,
            frame_type: context.frame_type,
            anomaly: context.is_anomalous(),
            edits_detected: edits.has_edits_near(path),
        }))
    }
}
