use super::structs::{HeaderFields, HeaderOutcome, HeaderReader};
use exiftool::ExifTool;
use serde_json::Value;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// The EXIF tags the inventory cares about, as named by `exiftool`.
pub const CAMERA_TAGS: [&str; 7] = [
    "ExposureTime",
    "ISO",
    "Model",
    "Make",
    "DateTimeOriginal",
    "CameraTemperature",
    "FocalLength",
];

/// Reads EXIF-style camera tags from RAW, JPEG and PNG files through `exiftool`.
///
/// When `exiftool` cannot be started every file is reported as unreadable and the scan carries
/// on with the other sources.
pub struct CameraTagReader {
    exiftool: Option<ExifTool>,
}

impl CameraTagReader {
    pub fn new(exiftool_path: Option<&Path>) -> Self {
        let exiftool = match exiftool_path {
            Some(path) => ExifTool::with_executable(path),
            None => ExifTool::new(),
        };
        match exiftool {
            Ok(exiftool) => Self {
                exiftool: Some(exiftool),
            },
            Err(e) => {
                warn!(error = %e, "exiftool is not available, camera tags will not be read");
                Self { exiftool: None }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.exiftool.is_some()
    }
}

impl HeaderReader for CameraTagReader {
    fn read(&mut self, path: &Path) -> io::Result<HeaderOutcome> {
        // Access failures surface as io errors, not as an unreadable header.
        drop(File::open(path)?);

        let Some(exiftool) = self.exiftool.as_mut() else {
            return Ok(HeaderOutcome::Unreadable("exiftool is not available".into()));
        };
        match exiftool.json(path, &["-n"]) {
            Ok(exif) => Ok(HeaderOutcome::Found(select_camera_tags(&exif))),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "exiftool could not read file");
                Ok(HeaderOutcome::Unreadable(e.to_string()))
            }
        }
    }
}

/// Keeps the tags of interest. A file without any of them gives an empty map.
pub fn select_camera_tags(exif: &Value) -> HeaderFields {
    CAMERA_TAGS
        .iter()
        .filter_map(|&tag| {
            exif.get(tag)
                .filter(|value| !value.is_null())
                .map(|value| (tag.to_string(), value.clone()))
        })
        .collect()
}
