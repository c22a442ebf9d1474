use super::structs::{PathContext, Placement, SessionInfo};
use crate::config::{Layout, ScanConfig};
use crate::patterns::FilterTable;
use crate::patterns::parsing::parse_date;
use std::path::{Component, Path};

/// Interprets the folders between the scan root and a file.
#[derive(Debug, Clone)]
pub struct PathClassifier {
    layout: Layout,
    filters: FilterTable,
}

impl PathClassifier {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            layout: config.layout().clone(),
            filters: config.filters().clone(),
        }
    }

    /// Classifies `path` relative to `root`. Unconventional layouts degrade to absent fields.
    pub fn classify(&self, root: &Path, path: &Path) -> PathContext {
        let Ok(relative) = path.strip_prefix(root) else {
            return PathContext::unclassified();
        };
        let dirs: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let placement = match dirs.len() {
            0 => Placement::Unclassified,
            1 => Placement::ObjectFolder,
            2 => Placement::TelescopeFolder,
            3 => Placement::SessionFolder,
            4 if self.layout.is_subs_folder(&dirs[3]) => Placement::Subs,
            _ => Placement::Nested,
        };

        let object = dirs.first().cloned();
        // Object/Session/... without a telescope level.
        let (telescope, session) = match dirs.get(1).and_then(|d| self.parse_session(d)) {
            Some(session) => (None, Some(session)),
            None => (
                dirs.get(1).cloned(),
                dirs.get(2).and_then(|d| self.parse_session(d)),
            ),
        };

        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let frame_type = self
            .layout
            .calibration_frame(&file_name)
            .or_else(|| {
                let structural_levels = if telescope.is_none() && session.is_some() {
                    1
                } else {
                    2
                };
                self.layout.calibration_in_folders(&dirs, structural_levels)
            })
            .unwrap_or_default();

        PathContext {
            placement,
            object,
            telescope,
            session,
            frame_type,
            folders: dirs.into_iter().rev().collect(),
        }
    }

    /// Parses a session folder name such as `2024-03-01 HomeOSC Ha`.
    ///
    /// The date comes from the configured date pattern. In the rest of the name, the first filter
    /// keyword standing as a word is the filter, and what remains is the location.
    pub fn parse_session(&self, name: &str) -> Option<SessionInfo> {
        let caps = self.layout.session_date.captures(name)?;
        let date = parse_date(caps.name("date")?.as_str())?;
        let matched_end = caps.get(0).map_or(0, |m| m.end());

        // Underscores are word characters for `\b`; treat them as spaces. Same byte length.
        let mut rest = name[matched_end..].replace('_', " ");
        let filter = self.filters.find_word(&rest).map(|(filter, range)| {
            rest.replace_range(range, " ");
            filter
        });
        let location = rest
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c == '-' || c.is_whitespace())
            .to_string();

        Some(SessionInfo {
            date,
            location: (!location.is_empty()).then_some(location),
            filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{FilterName, FrameType};
    use chrono::NaiveDate;

    fn classifier() -> PathClassifier {
        PathClassifier::new(&ScanConfig::default())
    }

    fn classify(relative: &str) -> PathContext {
        let root = Path::new("/data/astro");
        classifier().classify(root, &root.join(relative))
    }

    #[test]
    fn test_full_layout_is_not_anomalous() {
        let ctx = classify("M31/EdgeHD925/2024-03-01 HomeOSC Ha/subs/Light_180s_Gain100_-10C.fits");

        assert_eq!(ctx.placement, Placement::Subs);
        assert!(!ctx.is_anomalous());
        assert_eq!(ctx.object.as_deref(), Some("M31"));
        assert_eq!(ctx.telescope.as_deref(), Some("EdgeHD925"));
        let session = ctx.session.as_ref().unwrap();
        assert_eq!(session.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(session.location.as_deref(), Some("HomeOSC"));
        assert_eq!(session.filter, Some(FilterName::mapped("Ha")));
        assert_eq!(ctx.frame_type, FrameType::Light);
        assert_eq!(
            ctx.folders,
            ["subs", "2024-03-01 HomeOSC Ha", "EdgeHD925", "M31"]
        );
    }

    #[test]
    fn test_file_under_telescope_is_anomalous() {
        let ctx = classify("M31/EdgeHD925/stacked_final.fits");

        assert_eq!(ctx.placement, Placement::TelescopeFolder);
        assert!(ctx.is_anomalous());
        assert_eq!(ctx.object.as_deref(), Some("M31"));
        assert_eq!(ctx.telescope.as_deref(), Some("EdgeHD925"));
        assert!(ctx.session.is_none());
    }

    #[test]
    fn test_shallower_placements() {
        let session = classify("M31/EdgeHD925/2024-03-01/final.jpg");
        assert_eq!(session.placement, Placement::SessionFolder);
        assert!(session.is_anomalous());
        assert!(session.session.is_some());

        let object = classify("M31/M31_final.png");
        assert_eq!(object.placement, Placement::ObjectFolder);
        assert!(object.is_anomalous());
        assert_eq!(object.object.as_deref(), Some("M31"));
        assert!(object.telescope.is_none());
    }

    #[test]
    fn test_loose_file_at_root_is_unclassified() {
        let ctx = classify("Light_180s.fits");
        assert_eq!(ctx.placement, Placement::Unclassified);
        assert!(ctx.is_anomalous());
        assert!(ctx.candidates().is_empty());
    }

    #[test]
    fn test_path_outside_root_is_unclassified() {
        let ctx = classifier().classify(Path::new("/data/astro"), Path::new("/tmp/x/y/z.fits"));
        assert_eq!(ctx, PathContext::unclassified());
    }

    #[test]
    fn test_nested_keeps_first_three_levels() {
        let deep = classify("M42/Redcat51/20240115/subs/extra/Light_60s.fits");
        assert_eq!(deep.placement, Placement::Nested);
        assert!(deep.is_anomalous());
        assert_eq!(deep.object.as_deref(), Some("M42"));
        assert_eq!(deep.telescope.as_deref(), Some("Redcat51"));
        assert!(deep.session.is_some());

        let not_subs = classify("M42/Redcat51/20240115/processed/final.fits");
        assert_eq!(not_subs.placement, Placement::Nested);
    }

    #[test]
    fn test_subs_name_is_case_insensitive() {
        let ctx = classify("M42/Redcat51/20240115/SUBS/Light_60s.fits");
        assert_eq!(ctx.placement, Placement::Subs);
    }

    #[test]
    fn test_missing_telescope_layout() {
        let ctx = classify("M42/2024-01-15 Backyard/subs/Light_60s.fits");

        assert_eq!(ctx.object.as_deref(), Some("M42"));
        assert!(ctx.telescope.is_none());
        let session = ctx.session.unwrap();
        assert_eq!(session.location.as_deref(), Some("Backyard"));
        assert!(ctx.placement != Placement::Subs, "only the full layout is expected");
    }

    #[test]
    fn test_parse_session_variants() {
        let classifier = classifier();

        let plain = classifier.parse_session("20240301").unwrap();
        assert!(plain.location.is_none());
        assert!(plain.filter.is_none());

        let underscored = classifier.parse_session("2024_03_01_Backyard_OIII").unwrap();
        assert_eq!(underscored.location.as_deref(), Some("Backyard"));
        assert_eq!(underscored.filter, Some(FilterName::mapped("OIII")));

        let hyphenated = classifier.parse_session("2024-03-01 - La Palma").unwrap();
        assert_eq!(hyphenated.location.as_deref(), Some("La Palma"));

        assert!(classifier.parse_session("EdgeHD925").is_none());
        assert!(classifier.parse_session("2024-13-45 Nowhere").is_none());
    }

    #[test]
    fn test_calibration_frames() {
        let dark = classify("Calibration/Darks/dark_300s_-10C_0001.fits");
        assert_eq!(dark.frame_type, FrameType::Dark);

        let flat = classify("M31/EdgeHD925/2024-03-01/subs/Flat_0.5s_0001.fits");
        assert_eq!(flat.frame_type, FrameType::Flat);

        let light = classify("M31/EdgeHD925/2024-03-01/subs/Light_60s.fits");
        assert_eq!(light.frame_type, FrameType::Light);
    }

    #[test]
    fn test_object_named_like_a_calibration_frame_stays_light() {
        let light = classify("Dark Shark Nebula/Redcat51/2024-05-01/subs/Light_120s.fits");
        assert_eq!(light.object.as_deref(), Some("Dark Shark Nebula"));
        assert_eq!(light.frame_type, FrameType::Light);

        let no_telescope = classify("Flat Galaxy/2024-05-01/subs/Light_120s.fits");
        assert_eq!(no_telescope.frame_type, FrameType::Light);

        let darks = classify("Dark Shark Nebula/Redcat51/2024-05-01/darks/120s_0001.fits");
        assert_eq!(darks.frame_type, FrameType::Dark);

        let library = classify("Darks/-10C/0001.fits");
        assert_eq!(library.frame_type, FrameType::Dark);
    }
}
