//! Scan configuration.
//!
//! A [`ConfigFile`] is the serializable form (JSON). It is compiled once into an immutable
//! [`ScanConfig`], which validates every pattern and table up front so that configuration
//! mistakes abort a scan before any file is touched.
pub mod defaults;
mod error;

pub use error::ConfigError;

use crate::patterns::{FilterKeyword, FilterTable, KNOWN_GROUPS};
use crate::structs::{Field, FileFormat, FrameType, Source};
use defaults::{
    DEFAULT_FITS_BLOCK_LIMIT, MAX_FITS_BLOCK_LIMIT, default_extensions, default_filename_patterns,
    default_filter_keywords, default_folder_patterns, default_layout, default_placeholders,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Serializable configuration, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Ordered filename regexes with named capture groups.
    pub filename_patterns: Vec<String>,
    /// Ordered folder-name regexes with named capture groups.
    pub folder_patterns: Vec<String>,
    pub filter_keywords: Vec<FilterKeyword>,
    /// Extension (without dot) to file format.
    pub extensions: BTreeMap<String, FileFormat>,
    pub layout: LayoutConfig,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderRule>,
    #[serde(default)]
    pub precedence: PrecedencePolicy,
    /// Maximum number of 2880-byte blocks read while looking for the end of a FITS header.
    #[serde(default = "fits_block_limit_default")]
    pub fits_block_limit: usize,
}

fn fits_block_limit_default() -> usize {
    DEFAULT_FITS_BLOCK_LIMIT
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            filename_patterns: default_filename_patterns(),
            folder_patterns: default_folder_patterns(),
            filter_keywords: default_filter_keywords(),
            extensions: default_extensions(),
            layout: default_layout(),
            placeholders: default_placeholders(),
            precedence: PrecedencePolicy::default(),
            fits_block_limit: DEFAULT_FITS_BLOCK_LIMIT,
        }
    }
}

/// Folder layout conventions: `Object/Telescope/Session/subs/file`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Names of the raw-subs folder, compared case-insensitively.
    pub subs_folder_names: Vec<String>,
    /// Regex with a `date` group, matched at the start of a session folder name.
    pub session_date_pattern: String,
    #[serde(default)]
    pub calibration_keywords: Vec<CalibrationKeyword>,
    /// Extensions that mark a folder as containing edited output.
    #[serde(default)]
    pub edit_extensions: Vec<String>,
    /// File name fragments that mark edited output, such as `stack`.
    #[serde(default)]
    pub edit_name_markers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CalibrationKeyword {
    pub keyword: String,
    pub frame_type: FrameType,
}

/// Header values that mean "not set" for a given format and field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaceholderRule {
    pub format: FileFormat,
    pub field: Field,
    pub values: Vec<f64>,
}

/// Which source wins when several provide the same field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrecedencePolicy {
    /// Default order, highest precedence first. Sources left out are never used.
    pub order: Vec<Source>,
    /// Per-field replacements for `order`.
    pub field_orders: Vec<FieldOrder>,
    /// When the winning filter is unmapped text, take a mapped filter from a lower source instead.
    pub prefer_mapped_filter: bool,
}

impl Default for PrecedencePolicy {
    fn default() -> Self {
        Self {
            order: vec![
                Source::Header,
                Source::FilenamePattern,
                Source::FolderPattern,
                Source::PathInference,
            ],
            field_orders: Vec::new(),
            prefer_mapped_filter: false,
        }
    }
}

impl PrecedencePolicy {
    pub fn order_for(&self, field: Field) -> &[Source] {
        self.field_orders
            .iter()
            .find(|o| o.field == field)
            .map_or(self.order.as_slice(), |o| o.order.as_slice())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.order.is_empty() {
            return Err(ConfigError::EmptyValue("precedence.order"));
        }
        std::iter::once(&self.order)
            .chain(self.field_orders.iter().map(|o| &o.order))
            .try_for_each(|order| {
                let mut seen = HashSet::new();
                match order.iter().find(|source| !seen.insert(**source)) {
                    Some(duplicate) => Err(ConfigError::DuplicateSource(*duplicate)),
                    None => Ok(()),
                }
            })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldOrder {
    pub field: Field,
    pub order: Vec<Source>,
}

/// Compiled layout conventions.
#[derive(Debug, Clone)]
pub struct Layout {
    pub subs_folder_names: Vec<String>,
    pub session_date: Regex,
    pub calibration_keywords: Vec<CalibrationKeyword>,
    pub edit_extensions: Vec<String>,
    pub edit_name_markers: Vec<String>,
}

impl Layout {
    pub fn is_subs_folder(&self, name: &str) -> bool {
        self.subs_folder_names
            .iter()
            .any(|subs| subs.eq_ignore_ascii_case(name.trim()))
    }

    /// Calibration frame type named by a word in `segment`, if any.
    pub fn calibration_frame(&self, segment: &str) -> Option<FrameType> {
        segment
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(|word| {
                self.calibration_keywords
                    .iter()
                    .find(|k| k.keyword.eq_ignore_ascii_case(word))
                    .map(|k| k.frame_type)
            })
    }

    /// Calibration frame type when the whole folder name is a calibration keyword.
    pub fn calibration_folder(&self, name: &str) -> Option<FrameType> {
        let name = name.trim();
        self.calibration_keywords
            .iter()
            .find(|k| k.keyword.eq_ignore_ascii_case(name))
            .map(|k| k.frame_type)
    }

    /// Calibration frame type named by the folders between the scan root and a file, searched
    /// nearest first.
    ///
    /// The first `structural_levels` folders (object and telescope) only count when their whole
    /// name is a keyword: `Darks/` is a calibration folder, `Dark Shark Nebula/` is not.
    pub fn calibration_in_folders<S: AsRef<str>>(
        &self,
        dirs: &[S],
        structural_levels: usize,
    ) -> Option<FrameType> {
        dirs.iter().enumerate().rev().find_map(|(depth, dir)| {
            if depth < structural_levels {
                self.calibration_folder(dir.as_ref())
            } else {
                self.calibration_frame(dir.as_ref())
            }
        })
    }

    /// Object and telescope levels in front of the session folder. One when the second folder
    /// is already a dated session.
    pub fn structural_levels<S: AsRef<str>>(&self, dirs: &[S]) -> usize {
        match dirs.get(1) {
            Some(dir) if self.session_date.is_match(dir.as_ref()) => 1,
            _ => 2,
        }
    }

    /// Whether a file name marks edited or stacked output.
    pub fn is_edit_indicator(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        let extension = Path::new(&lower)
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        extension.is_some_and(|ext| self.edit_extensions.contains(&ext))
            || self.edit_name_markers.iter().any(|m| lower.contains(m))
    }
}

/// Placeholder lookup table.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    rules: Vec<PlaceholderRule>,
}

impl Placeholders {
    pub fn is_placeholder(&self, format: FileFormat, field: Field, value: f64) -> bool {
        self.rules
            .iter()
            .filter(|r| r.format == format && r.field == field)
            .flat_map(|r| r.values.iter())
            .any(|p| (p - value).abs() < f64::EPSILON)
    }
}

/// Validated, immutable scan configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub(crate) filename_patterns: Vec<Regex>,
    pub(crate) folder_patterns: Vec<Regex>,
    pub(crate) filters: FilterTable,
    pub(crate) extensions: HashMap<String, FileFormat>,
    pub(crate) layout: Layout,
    pub(crate) placeholders: Placeholders,
    pub(crate) precedence: PrecedencePolicy,
    pub(crate) fits_block_limit: usize,
}

impl ScanConfig {
    /// Validates and compiles a configuration.
    ///
    /// # Errors
    ///
    /// Any malformed regex, pattern without (or with unknown) capture groups, empty table, extension
    /// mapped to two formats, duplicated precedence entry, or FITS block limit out of range.
    pub fn compile(file: ConfigFile) -> Result<Self, ConfigError> {
        let filename_patterns = compile_patterns(&file.filename_patterns)?;
        let folder_patterns = compile_patterns(&file.folder_patterns)?;
        let filters = FilterTable::new(&file.filter_keywords)?;
        let extensions = compile_extensions(&file.extensions)?;
        let layout = compile_layout(file.layout)?;
        file.precedence.validate()?;
        if !(1..=MAX_FITS_BLOCK_LIMIT).contains(&file.fits_block_limit) {
            return Err(ConfigError::BlockLimitOutOfRange {
                value: file.fits_block_limit,
                max: MAX_FITS_BLOCK_LIMIT,
            });
        }

        Ok(Self {
            filename_patterns,
            folder_patterns,
            filters,
            extensions,
            layout,
            placeholders: Placeholders {
                rules: file.placeholders,
            },
            precedence: file.precedence,
            fits_block_limit: file.fits_block_limit,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Self::compile(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Format for a file, by its extension. `None` means the file is not part of the inventory.
    pub fn format_of(&self, path: &Path) -> Option<FileFormat> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        self.extensions.get(&extension).copied()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    pub fn precedence(&self) -> &PrecedencePolicy {
        &self.precedence
    }

    pub fn fits_block_limit(&self) -> usize {
        self.fits_block_limit
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::compile(ConfigFile::default()).expect("built-in configuration is valid")
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            let re = compile_regex(pattern)?;
            let groups: Vec<&str> = re.capture_names().flatten().collect();
            if groups.is_empty() {
                return Err(ConfigError::NoCaptureGroups(pattern.clone()));
            }
            if let Some(unknown) = groups.iter().find(|g| !KNOWN_GROUPS.contains(g)) {
                return Err(ConfigError::UnknownCaptureGroup {
                    pattern: pattern.clone(),
                    group: (*unknown).to_string(),
                });
            }
            Ok(re)
        })
        .collect()
}

fn compile_extensions(
    extensions: &BTreeMap<String, FileFormat>,
) -> Result<HashMap<String, FileFormat>, ConfigError> {
    if extensions.is_empty() {
        return Err(ConfigError::EmptyValue("extensions"));
    }
    let mut compiled = HashMap::with_capacity(extensions.len());
    for (extension, format) in extensions {
        let normalized = extension.trim().trim_start_matches('.').to_lowercase();
        if normalized.is_empty() {
            return Err(ConfigError::EmptyValue("extensions"));
        }
        match compiled.insert(normalized.clone(), *format) {
            Some(previous) if previous != *format => {
                return Err(ConfigError::DuplicateExtension {
                    extension: normalized,
                    first: previous,
                    second: *format,
                });
            }
            _ => {}
        }
    }
    Ok(compiled)
}

fn compile_layout(layout: LayoutConfig) -> Result<Layout, ConfigError> {
    let subs_folder_names: Vec<String> = layout
        .subs_folder_names
        .iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if subs_folder_names.is_empty() {
        return Err(ConfigError::EmptyValue("layout.subs_folder_names"));
    }

    let session_date = compile_regex(&layout.session_date_pattern)?;
    if !session_date.capture_names().flatten().any(|g| g == "date") {
        return Err(ConfigError::MissingDateGroup(layout.session_date_pattern));
    }

    let lowercase = |values: Vec<String>| -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.trim().trim_start_matches('.').to_lowercase())
            .filter(|v| !v.is_empty())
            .collect()
    };

    Ok(Layout {
        subs_folder_names,
        session_date,
        calibration_keywords: layout.calibration_keywords,
        edit_extensions: lowercase(layout.edit_extensions),
        edit_name_markers: lowercase(layout.edit_name_markers),
    })
}
