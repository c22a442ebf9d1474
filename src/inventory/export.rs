//! CSV export with a fixed column set.

use super::structs::Inventory;
use crate::InventoryError;
use crate::structs::{FileRecord, Sourced};
use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Output columns, in order. The same for every run and configuration.
pub const COLUMNS: [&str; 32] = [
    "path",
    "format",
    "object",
    "telescope",
    "camera",
    "focal_length",
    "session_date",
    "capture_time",
    "location",
    "filter",
    "exposure_s",
    "gain",
    "temperature_c",
    "binning",
    "rotation",
    "frame_type",
    "anomaly",
    "edits_detected",
    "object_source",
    "telescope_source",
    "camera_source",
    "focal_length_source",
    "session_date_source",
    "capture_time_source",
    "location_source",
    "filter_source",
    "filter_confidence",
    "exposure_s_source",
    "gain_source",
    "temperature_c_source",
    "binning_source",
    "rotation_source",
];

fn value<T: Display>(field: Option<&Sourced<T>>) -> String {
    field.map(|f| f.value.to_string()).unwrap_or_default()
}

fn source<T>(field: Option<&Sourced<T>>) -> String {
    field.map(|f| f.source.to_string()).unwrap_or_default()
}

/// One CSV row for a record; absent values are empty cells.
pub fn record_row(record: &FileRecord) -> [String; 32] {
    let filter = record.filter.as_ref();
    [
        record.path.display().to_string(),
        record.format.to_string(),
        value(record.object.as_ref()),
        value(record.telescope.as_ref()),
        value(record.camera.as_ref()),
        value(record.focal_length.as_ref()),
        record
            .session_date
            .as_ref()
            .map(|d| d.value.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        record
            .capture_time
            .as_ref()
            .map(|t| t.value.format("%Y-%m-%dT%H:%M:%S").to_string())
            .unwrap_or_default(),
        value(record.location.as_ref()),
        filter.map(|f| f.value.name.clone()).unwrap_or_default(),
        value(record.exposure_s.as_ref()),
        value(record.gain.as_ref()),
        value(record.temperature_c.as_ref()),
        value(record.binning.as_ref()),
        value(record.rotation.as_ref()),
        record.frame_type.as_str().to_string(),
        record.anomaly.to_string(),
        record.edits_detected.to_string(),
        source(record.object.as_ref()),
        source(record.telescope.as_ref()),
        source(record.camera.as_ref()),
        source(record.focal_length.as_ref()),
        source(record.session_date.as_ref()),
        source(record.capture_time.as_ref()),
        source(record.location.as_ref()),
        source(filter),
        filter
            .map(|f| f.value.confidence.as_str().to_string())
            .unwrap_or_default(),
        source(record.exposure_s.as_ref()),
        source(record.gain.as_ref()),
        source(record.temperature_c.as_ref()),
        source(record.binning.as_ref()),
        source(record.rotation.as_ref()),
    ]
}

impl Inventory {
    /// Writes the header row and one row per record to `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), InventoryError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(COLUMNS)?;
        for record in &self.records {
            csv.write_record(record_row(record))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes a complete inventory to `path`, replacing the file in one step.
    ///
    /// # Errors
    ///
    /// [`InventoryError::Incomplete`] for a cancelled scan; use [`Inventory::write_partial_csv`]
    /// to keep its results anyway.
    pub fn write_csv(&self, path: &Path) -> Result<(), InventoryError> {
        if !self.complete {
            return Err(InventoryError::Incomplete(self.root.clone()));
        }
        self.write_partial_csv(path)
    }

    /// Like [`Inventory::write_csv`], but also writes the records of an incomplete scan.
    pub fn write_partial_csv(&self, path: &Path) -> Result<(), InventoryError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        self.write_to(file.as_file_mut())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), rows = self.records.len(), "inventory written");
        Ok(())
    }
}
