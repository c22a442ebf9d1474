//! Filename and folder-name pattern matching.

use super::filters::FilterTable;
use super::parsing::{parse_date, parse_number, parse_timestamp, valid_exposure};
use crate::config::ScanConfig;
use crate::structs::Candidates;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Capture group names a pattern may use.
pub const KNOWN_GROUPS: [&str; 12] = [
    "exposure",
    "gain",
    "filter",
    "object",
    "date",
    "telescope",
    "temperature",
    "location",
    "camera",
    "bin",
    "timestamp",
    "rotation",
];

static RE_NOT_A_CAMERA: OnceLock<Regex> = OnceLock::new();

/// Applies the configured regex lists to file and folder names.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    filename_patterns: Vec<Regex>,
    folder_patterns: Vec<Regex>,
    filters: FilterTable,
}

impl PatternMatcher {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filename_patterns: config.filename_patterns.clone(),
            folder_patterns: config.folder_patterns.clone(),
            filters: config.filters.clone(),
        }
    }

    /// Candidates from a file name.
    ///
    /// The first filename pattern that matches wins. When it leaves the filter empty, the name is
    /// also searched for a delimited filter keyword.
    pub fn match_filename(&self, file_name: &str) -> Candidates {
        let mut candidates = first_match(&self.filename_patterns, file_name)
            .map(|(_, caps)| self.candidates_from_captures(&caps))
            .unwrap_or_default();
        if candidates.filter.is_none() {
            candidates.filter = self.filters.find_delimited(file_name);
        }
        candidates
    }

    /// Candidates from a single folder name, using the folder pattern list.
    pub fn match_folder(&self, folder_name: &str) -> Candidates {
        first_match(&self.folder_patterns, folder_name)
            .map(|(_, caps)| self.candidates_from_captures(&caps))
            .unwrap_or_default()
    }

    /// Candidates from ancestor folder names, ordered nearest first.
    ///
    /// Every field is taken from the nearest folder that provides it.
    pub fn match_folders<'a>(&self, folders: impl IntoIterator<Item = &'a str>) -> Candidates {
        folders
            .into_iter()
            .fold(Candidates::default(), |mut found, folder| {
                found.fill_missing_from(self.match_folder(folder));
                found
            })
    }

    /// Index of the first filename pattern matching `file_name`.
    pub fn matching_filename_pattern(&self, file_name: &str) -> Option<usize> {
        first_match(&self.filename_patterns, file_name).map(|(index, _)| index)
    }

    fn candidates_from_captures(&self, caps: &Captures<'_>) -> Candidates {
        let text = |group: &str| {
            caps.name(group)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
        };

        let mut candidates = Candidates {
            object: text("object").map(str::to_owned),
            telescope: text("telescope").map(str::to_owned),
            camera: text("camera").map(str::to_owned),
            session_date: text("date").and_then(parse_date),
            capture_time: text("timestamp").and_then(parse_timestamp),
            location: text("location").map(str::to_owned),
            filter: text("filter").and_then(|f| self.filters.normalize(f)),
            exposure_s: text("exposure")
                .and_then(parse_number)
                .and_then(valid_exposure),
            gain: text("gain").and_then(|g| g.parse::<i64>().ok()),
            temperature_c: text("temperature").and_then(parse_number),
            binning: text("bin").and_then(|b| b.parse::<u32>().ok()),
            rotation: text("rotation").and_then(parse_number),
            focal_length: None,
        };
        self.sanitize_camera(&mut candidates);
        candidates
    }

    /// Camera tokens are loosely captured; drop gain/ISO/timestamp look-alikes and move filter
    /// keywords to the filter field.
    fn sanitize_camera(&self, candidates: &mut Candidates) {
        let Some(camera) = candidates.camera.take() else {
            return;
        };
        let not_a_camera = RE_NOT_A_CAMERA
            .get_or_init(|| Regex::new(r"(?i)^(?:gain\d+|iso\d+|\d{8}(?:-\d{6})?)$").unwrap());
        if not_a_camera.is_match(&camera) {
            return;
        }
        if let Some(canonical) = self.filters.lookup(&camera) {
            if candidates.filter.is_none() {
                candidates.filter = self.filters.normalize(canonical);
            }
            return;
        }
        candidates.camera = Some(camera);
    }
}

fn first_match<'t>(patterns: &[Regex], text: &'t str) -> Option<(usize, Captures<'t>)> {
    patterns
        .iter()
        .enumerate()
        .find_map(|(index, re)| re.captures(text).map(|caps| (index, caps)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use crate::structs::FilterName;
    use chrono::NaiveDate;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new(&ScanConfig::default())
    }

    #[test]
    fn test_asiair_filename() {
        let name = "Light_Orion_180.0s_Bin1_294MC_L-Extreme_gain120_20250405-214232_-10C_90deg_001.fit";
        let c = matcher().match_filename(name);

        assert_eq!(c.exposure_s, Some(180.0));
        assert_eq!(c.binning, Some(1));
        assert_eq!(c.rotation, Some(90.0));
        assert_eq!(c.camera.as_deref(), Some("294MC"));
        assert_eq!(c.filter, Some(FilterName::mapped("L-eXtreme")));
        assert_eq!(c.gain, Some(120));
        assert_eq!(c.temperature_c, Some(-10.0));
        assert_eq!(
            c.capture_time,
            NaiveDate::from_ymd_opt(2025, 4, 5)
                .unwrap()
                .and_hms_opt(21, 42, 32)
        );
    }

    #[test]
    fn test_asiair_filename_without_rotator() {
        let name = "Light_M31_300.0s_Bin1_533MC_gain100_20231015-203012_-10.0C_0001.fit";
        let matcher = matcher();
        assert_eq!(matcher.matching_filename_pattern(name), Some(0));

        let c = matcher.match_filename(name);
        assert_eq!(c.exposure_s, Some(300.0));
        assert_eq!(c.binning, Some(1));
        assert_eq!(c.camera.as_deref(), Some("533MC"));
        assert!(c.filter.is_none());
        assert_eq!(c.gain, Some(100));
        assert_eq!(c.temperature_c, Some(-10.0));
        assert!(c.rotation.is_none());
        assert_eq!(
            c.capture_time,
            NaiveDate::from_ymd_opt(2023, 10, 15)
                .unwrap()
                .and_hms_opt(20, 30, 12)
        );
    }

    #[test]
    fn test_nina_filename() {
        let name = "2025-08-17_21-13-23_OIII_-10.00_300.00s_0005.fits";
        let c = matcher().match_filename(name);

        assert_eq!(c.filter, Some(FilterName::mapped("OIII")));
        assert_eq!(c.temperature_c, Some(-10.0));
        assert_eq!(c.exposure_s, Some(300.0));
        assert!(c.capture_time.is_some());
        assert!(c.gain.is_none());
    }

    #[test]
    fn test_short_light_filename() {
        let c = matcher().match_filename("Light_180s_Gain100_-10C.fits");
        assert_eq!(c.exposure_s, Some(180.0));
        assert_eq!(c.gain, Some(100));
        assert_eq!(c.temperature_c, Some(-10.0));
        assert!(c.object.is_none());
        assert!(c.filter.is_none());
    }

    #[test]
    fn test_light_filename_with_object() {
        let c = matcher().match_filename("Light_M31_60s_gain200_0001.fits");
        assert_eq!(c.object.as_deref(), Some("M31"));
        assert_eq!(c.exposure_s, Some(60.0));
        assert_eq!(c.gain, Some(200));
    }

    #[test]
    fn test_reordered_tokens_with_filter_after_camera() {
        let name = "Light_M42_123deg_67.0s_-273C_Bin1_PlayerOne_UVIR_gain456_001.fits";
        let c = matcher().match_filename(name);

        assert_eq!(c.exposure_s, Some(67.0));
        assert_eq!(c.temperature_c, Some(-273.0));
        assert_eq!(c.rotation, Some(123.0));
        assert_eq!(c.binning, Some(1));
        assert_eq!(c.camera.as_deref(), Some("PlayerOne"));
        assert_eq!(c.filter, Some(FilterName::mapped("UV/IR Cut")));
        assert_eq!(c.gain, Some(456));
    }

    #[test]
    fn test_first_matching_pattern_wins_without_merging() {
        let config = ScanConfig::compile(ConfigFile {
            filename_patterns: vec![
                r"(?P<exposure>\d+)s".to_string(),
                r"(?P<exposure>\d+)s_gain(?P<gain>\d+)".to_string(),
            ],
            ..ConfigFile::default()
        })
        .unwrap();
        let matcher = PatternMatcher::new(&config);

        let name = "60s_gain100.fits";
        assert_eq!(matcher.matching_filename_pattern(name), Some(0));
        let c = matcher.match_filename(name);
        assert_eq!(c.exposure_s, Some(60.0));
        assert!(c.gain.is_none(), "the second pattern is never consulted");
    }

    #[test]
    fn test_default_pattern_order() {
        let matcher = matcher();
        assert_eq!(
            matcher.matching_filename_pattern("Light_60s_gain100_0001.fits"),
            Some(2)
        );
        assert_eq!(matcher.matching_filename_pattern("Flat_0.5s_0001.fits"), Some(4));
    }

    #[test]
    fn test_filter_keyword_in_camera_slot_moves_to_filter() {
        let name = "Light_M42_67.0s_-10C_Bin1_Ha_gain100_001.fits";
        let c = matcher().match_filename(name);
        assert!(c.camera.is_none());
        assert_eq!(c.filter, Some(FilterName::mapped("Ha")));
    }

    #[test]
    fn test_unmapped_filename_filter_is_low_confidence() {
        let name = "2025-08-17_21-13-23_Quadband_-10.00_300.00s_0005.fits";
        let c = matcher().match_filename(name);
        assert_eq!(c.filter, Some(FilterName::unmapped("Quadband")));
    }

    #[test]
    fn test_delimited_filter_fallback() {
        let c = matcher().match_filename("IMG_0042_Ha_stack.jpg");
        assert_eq!(c.filter, Some(FilterName::mapped("Ha")));
    }

    #[test]
    fn test_unmatched_filename_yields_nothing() {
        assert!(matcher().match_filename("notes.fits").is_empty());
    }

    #[test]
    fn test_session_folder_date() {
        let c = matcher().match_folder("2024-03-01 HomeOSC Ha");
        assert_eq!(c.session_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_folders_nearest_first() {
        let c = matcher().match_folders(["180s", "2024-03-01 Backyard", "300s"]);
        assert_eq!(c.exposure_s, Some(180.0));
        assert_eq!(c.session_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }
}
