//! Built-in tables for common astrophotography capture software and folder conventions.

use super::{CalibrationKeyword, LayoutConfig, PlaceholderRule};
use crate::patterns::FilterKeyword;
use crate::structs::{Field, FileFormat, FrameType};
use std::collections::BTreeMap;

pub const DEFAULT_FITS_BLOCK_LIMIT: usize = 16;
/// Upper bound for `fits_block_limit`, about 2.9 MB of header.
pub const MAX_FITS_BLOCK_LIMIT: usize = 1024;

pub fn default_filename_patterns() -> Vec<String> {
    [
        // ASIAIR: Light_M42_180.0s_Bin1_294MC_L-Extreme_gain120_20250405-214232_-10C_90deg_0001.fit
        // The rotator token is only written when a rotator is connected.
        r"(?i)_(?P<exposure>\d+(?:\.\d+)?)s_Bin(?P<bin>\d+)_(?P<camera>[^_]+)(?:_(?P<filter>[^_]+))?_gain(?P<gain>\d+)_(?P<timestamp>\d{8}-\d{6})_(?P<temperature>-?\d+(?:\.\d+)?)C(?:_(?P<rotation>\d+)deg)?",
        // N.I.N.A. default: 2025-08-17_21-13-23_OIII_-10.00_300.00s_0005.fits
        r"^(?P<timestamp>\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})_(?P<filter>[^_]+)_(?P<temperature>-?\d+(?:\.\d+)?)_(?P<exposure>\d+(?:\.\d+)?)s_",
        // Light_M31_180s_Gain100_-10C.fits
        r"(?i)^(?:light|preview|img|crw)_(?:(?P<object>[^_]+)_)?(?P<exposure>\d+(?:\.\d+)?)s_gain(?P<gain>\d+)(?:_(?P<temperature>-?\d+(?:\.\d+)?)C)?",
        // Light_M42_123deg_67.0s_-10C_Bin1_PlayerOne_UVIR_gain456_001.fits
        r"(?i)(?:_(?P<rotation>\d+)deg)?_(?P<exposure>\d+(?:\.\d+)?)s_(?P<temperature>-?\d+(?:\.\d+)?)C_Bin(?P<bin>\d+)_(?P<camera>[^_]+)(?:_(?P<filter>[^_]+))?_gain(?P<gain>\d+)",
        r"(?i)(?:^|_)(?P<exposure>\d+(?:\.\d+)?)s(?:_|\.|$)",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

pub fn default_folder_patterns() -> Vec<String> {
    [
        r"^(?P<date>\d{4}[-_]?\d{2}[-_]?\d{2})(?:$|[\s_-])",
        r"(?i)^(?P<exposure>\d+(?:\.\d+)?)\s?s(?:ec)?(?:[\s_-]+gain[\s_-]?(?P<gain>\d+))?$",
        r"(?i)^gain[\s_-]?(?P<gain>\d+)$",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect()
}

pub fn default_filter_keywords() -> Vec<FilterKeyword> {
    [
        ("lxtrme", "L-eXtreme"),
        ("lxtreme", "L-eXtreme"),
        ("lextreme", "L-eXtreme"),
        ("l-extreme", "L-eXtreme"),
        ("lenhance", "L-eNhance"),
        ("l-enhance", "L-eNhance"),
        ("lultimate", "L-Ultimate"),
        ("l-ultimate", "L-Ultimate"),
        ("l-pro", "L-Pro"),
        ("lpro", "L-Pro"),
        ("uvir", "UV/IR Cut"),
        ("uv/ir", "UV/IR Cut"),
        ("irblock", "UV/IR Cut"),
        ("irblocked", "UV/IR Cut"),
        ("ir-block", "UV/IR Cut"),
        ("ir filter", "UV/IR Cut"),
        ("halpha", "Ha"),
        ("ha", "Ha"),
        ("h", "Ha"),
        ("oxygen", "OIII"),
        ("oiii", "OIII"),
        ("o3", "OIII"),
        ("o", "OIII"),
        ("sulphur", "SII"),
        ("sulfur", "SII"),
        ("sii", "SII"),
        ("s2", "SII"),
        ("s", "SII"),
        ("r", "Red"),
        ("g", "Green"),
        ("b", "Blue"),
        ("l", "Luminance"),
        ("cls", "CLS"),
    ]
    .into_iter()
    .map(|(keyword, canonical)| FilterKeyword {
        keyword: keyword.to_string(),
        canonical: canonical.to_string(),
    })
    .collect()
}

pub fn default_extensions() -> BTreeMap<String, FileFormat> {
    [
        ("fit", FileFormat::Fits),
        ("fits", FileFormat::Fits),
        ("fts", FileFormat::Fits),
        ("cr2", FileFormat::Raw),
        ("cr3", FileFormat::Raw),
        ("nef", FileFormat::Raw),
        ("arw", FileFormat::Raw),
        ("dng", FileFormat::Raw),
        ("orf", FileFormat::Raw),
        ("raf", FileFormat::Raw),
        ("jpg", FileFormat::Jpeg),
        ("jpeg", FileFormat::Jpeg),
        ("png", FileFormat::Png),
    ]
    .into_iter()
    .map(|(ext, format)| (ext.to_string(), format))
    .collect()
}

pub fn default_layout() -> LayoutConfig {
    let calibration_keywords = [
        ("dark", FrameType::Dark),
        ("darks", FrameType::Dark),
        ("flat", FrameType::Flat),
        ("flats", FrameType::Flat),
        ("bias", FrameType::Bias),
        ("biases", FrameType::Bias),
        ("calibration", FrameType::Calibration),
    ]
    .into_iter()
    .map(|(keyword, frame_type)| CalibrationKeyword {
        keyword: keyword.to_string(),
        frame_type,
    })
    .collect();

    LayoutConfig {
        subs_folder_names: vec!["subs".to_string()],
        session_date_pattern: r"^(?P<date>\d{4}[-_]?\d{2}[-_]?\d{2})".to_string(),
        calibration_keywords,
        edit_extensions: vec!["tif".to_string(), "tiff".to_string(), "psd".to_string()],
        edit_name_markers: vec!["stack".to_string()],
    }
}

/// Zero exposure and zero ISO are what many cameras write when the value was never set.
pub fn default_placeholders() -> Vec<PlaceholderRule> {
    let mut rules = vec![PlaceholderRule {
        format: FileFormat::Fits,
        field: Field::Exposure,
        values: vec![0.0],
    }];
    for format in [FileFormat::Raw, FileFormat::Jpeg, FileFormat::Png] {
        rules.push(PlaceholderRule {
            format,
            field: Field::Exposure,
            values: vec![0.0],
        });
        rules.push(PlaceholderRule {
            format,
            field: Field::Gain,
            values: vec![0.0],
        });
    }
    rules
}
