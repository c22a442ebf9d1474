use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The file formats an inventory can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Scientific image with a FITS primary header (`.fit`, `.fits`, `.fts`).
    Fits,
    /// Camera RAW container (`.cr2`, `.nef`, `.dng`, ...).
    Raw,
    Jpeg,
    Png,
}

impl FileFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fits => "fits",
            Self::Raw => "raw",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Which kind of embedded header this format carries.
    pub const fn family(self) -> HeaderFamily {
        match self {
            Self::Fits => HeaderFamily::Scientific,
            Self::Raw | Self::Jpeg | Self::Png => HeaderFamily::CameraTags,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header families, each served by one header reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderFamily {
    /// Fixed-keyword FITS header block.
    Scientific,
    /// EXIF-style camera tags.
    CameraTags,
}

/// The extraction layer that supplied a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Header,
    FilenamePattern,
    FolderPattern,
    PathInference,
}

impl Source {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::FilenamePattern => "filename_pattern",
            Self::FolderPattern => "folder_pattern",
            Self::PathInference => "path_inference",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolvable fields of a [`FileRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Object,
    Telescope,
    Camera,
    FocalLength,
    SessionDate,
    CaptureTime,
    Location,
    Filter,
    Exposure,
    Gain,
    Temperature,
    Binning,
    Rotation,
}

/// A resolved value together with the layer it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Sourced<T> {
    pub const fn new(value: T, source: Source) -> Self {
        Self { value, source }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The filter text was found in the configured keyword table.
    High,
    /// Unmapped filter text, kept verbatim.
    Low,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterName {
    pub name: String,
    pub confidence: Confidence,
}

impl FilterName {
    pub fn mapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confidence: Confidence::High,
        }
    }

    pub fn unmapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            confidence: Confidence::Low,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.confidence == Confidence::High
    }
}

/// Light frame or one of the calibration frame kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    #[default]
    Light,
    Dark,
    Flat,
    Bias,
    /// Calibration material that could not be narrowed down further.
    Calibration,
}

impl FrameType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Flat => "flat",
            Self::Bias => "bias",
            Self::Calibration => "calibration",
        }
    }
}

/// Field values proposed by one extraction layer, before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub object: Option<String>,
    pub telescope: Option<String>,
    pub camera: Option<String>,
    pub focal_length: Option<f64>,
    pub session_date: Option<NaiveDate>,
    pub capture_time: Option<NaiveDateTime>,
    pub location: Option<String>,
    pub filter: Option<FilterName>,
    pub exposure_s: Option<f64>,
    pub gain: Option<i64>,
    pub temperature_c: Option<f64>,
    pub binning: Option<u32>,
    pub rotation: Option<f64>,
}

impl Candidates {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Takes every field of `other` that is still missing here.
    pub fn fill_missing_from(&mut self, other: Self) {
        self.object = self.object.take().or(other.object);
        self.telescope = self.telescope.take().or(other.telescope);
        self.camera = self.camera.take().or(other.camera);
        self.focal_length = self.focal_length.or(other.focal_length);
        self.session_date = self.session_date.or(other.session_date);
        self.capture_time = self.capture_time.or(other.capture_time);
        self.location = self.location.take().or(other.location);
        self.filter = self.filter.take().or(other.filter);
        self.exposure_s = self.exposure_s.or(other.exposure_s);
        self.gain = self.gain.or(other.gain);
        self.temperature_c = self.temperature_c.or(other.temperature_c);
        self.binning = self.binning.or(other.binning);
        self.rotation = self.rotation.or(other.rotation);
    }
}

/// One row of the inventory. Fully resolved before it is stored and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub format: FileFormat,
    pub object: Option<Sourced<String>>,
    pub telescope: Option<Sourced<String>>,
    pub camera: Option<Sourced<String>>,
    /// Focal length in millimetres.
    pub focal_length: Option<Sourced<f64>>,
    pub session_date: Option<Sourced<NaiveDate>>,
    pub capture_time: Option<Sourced<NaiveDateTime>>,
    pub location: Option<Sourced<String>>,
    pub filter: Option<Sourced<FilterName>>,
    /// Exposure time in seconds, never negative.
    pub exposure_s: Option<Sourced<f64>>,
    pub gain: Option<Sourced<i64>>,
    /// Sensor temperature in degrees Celsius.
    pub temperature_c: Option<Sourced<f64>>,
    pub binning: Option<Sourced<u32>>,
    /// Camera rotator angle in degrees.
    pub rotation: Option<Sourced<f64>>,
    pub frame_type: FrameType,
    /// True when the file is not sitting in a `subs` folder of the expected layout.
    pub anomaly: bool,
    /// True when edited or stacked output was found next to the file or one level up.
    pub edits_detected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_missing_keeps_existing_values() {
        let mut first = Candidates {
            exposure_s: Some(180.0),
            object: Some("M31".to_string()),
            ..Candidates::default()
        };
        let second = Candidates {
            exposure_s: Some(60.0),
            gain: Some(100),
            object: Some("M42".to_string()),
            ..Candidates::default()
        };

        first.fill_missing_from(second);

        assert_eq!(first.exposure_s, Some(180.0));
        assert_eq!(first.object.as_deref(), Some("M31"));
        assert_eq!(first.gain, Some(100));
    }

    #[test]
    fn test_format_families() {
        assert_eq!(FileFormat::Fits.family(), HeaderFamily::Scientific);
        assert_eq!(FileFormat::Raw.family(), HeaderFamily::CameraTags);
        assert_eq!(FileFormat::Png.family(), HeaderFamily::CameraTags);
        assert_eq!(FileFormat::Jpeg.to_string(), "jpeg");
    }

    #[test]
    fn test_empty_candidates() {
        assert!(Candidates::default().is_empty());
        let filled = Candidates {
            gain: Some(0),
            ..Candidates::default()
        };
        assert!(!filled.is_empty(), "zero is a value, not an absence");
    }
}
