//! Per-field fusion of the candidate layers.

use crate::config::PrecedencePolicy;
use crate::structs::{Candidates, Field, FilterName, Source, Sourced};

/// Candidates from each extraction layer for one file.
#[derive(Debug, Clone, Default)]
pub struct Layers {
    pub header: Candidates,
    pub filename: Candidates,
    pub folder: Candidates,
    pub path: Candidates,
}

/// The merged fields, each tagged with the layer that supplied it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolved {
    pub object: Option<Sourced<String>>,
    pub telescope: Option<Sourced<String>>,
    pub camera: Option<Sourced<String>>,
    pub focal_length: Option<Sourced<f64>>,
    pub session_date: Option<Sourced<chrono::NaiveDate>>,
    pub capture_time: Option<Sourced<chrono::NaiveDateTime>>,
    pub location: Option<Sourced<String>>,
    pub filter: Option<Sourced<FilterName>>,
    pub exposure_s: Option<Sourced<f64>>,
    pub gain: Option<Sourced<i64>>,
    pub temperature_c: Option<Sourced<f64>>,
    pub binning: Option<Sourced<u32>>,
    pub rotation: Option<Sourced<f64>>,
}

impl Layers {
    fn layer(&self, source: Source) -> &Candidates {
        match source {
            Source::Header => &self.header,
            Source::FilenamePattern => &self.filename,
            Source::FolderPattern => &self.folder,
            Source::PathInference => &self.path,
        }
    }

    /// Value from the first source, in policy order, that has one.
    fn pick<T: Clone>(
        &self,
        policy: &PrecedencePolicy,
        field: Field,
        get: impl Fn(&Candidates) -> Option<&T>,
    ) -> Option<Sourced<T>> {
        policy.order_for(field).iter().find_map(|&source| {
            get(self.layer(source)).map(|value| Sourced::new(value.clone(), source))
        })
    }

    fn pick_filter(&self, policy: &PrecedencePolicy) -> Option<Sourced<FilterName>> {
        let first = self.pick(policy, Field::Filter, |c| c.filter.as_ref());
        if !policy.prefer_mapped_filter || first.as_ref().is_none_or(|f| f.value.is_mapped()) {
            return first;
        }
        self.pick(policy, Field::Filter, |c| {
            c.filter.as_ref().filter(|f| f.is_mapped())
        })
        .or(first)
    }

    /// Merges all layers. A value is only ever taken from a lower source when every higher
    /// source lacks it.
    pub fn merge(&self, policy: &PrecedencePolicy) -> Resolved {
        Resolved {
            object: self.pick(policy, Field::Object, |c| c.object.as_ref()),
            telescope: self.pick(policy, Field::Telescope, |c| c.telescope.as_ref()),
            camera: self.pick(policy, Field::Camera, |c| c.camera.as_ref()),
            focal_length: self.pick(policy, Field::FocalLength, |c| c.focal_length.as_ref()),
            session_date: self.pick(policy, Field::SessionDate, |c| c.session_date.as_ref()),
            capture_time: self.pick(policy, Field::CaptureTime, |c| c.capture_time.as_ref()),
            location: self.pick(policy, Field::Location, |c| c.location.as_ref()),
            filter: self.pick_filter(policy),
            exposure_s: self.pick(policy, Field::Exposure, |c| c.exposure_s.as_ref()),
            gain: self.pick(policy, Field::Gain, |c| c.gain.as_ref()),
            temperature_c: self.pick(policy, Field::Temperature, |c| c.temperature_c.as_ref()),
            binning: self.pick(policy, Field::Binning, |c| c.binning.as_ref()),
            rotation: self.pick(policy, Field::Rotation, |c| c.rotation.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldOrder;

    fn exposure(seconds: f64) -> Candidates {
        Candidates {
            exposure_s: Some(seconds),
            ..Candidates::default()
        }
    }

    #[test]
    fn test_header_beats_filename() {
        let layers = Layers {
            header: exposure(300.0),
            filename: exposure(180.0),
            folder: exposure(60.0),
            ..Layers::default()
        };
        let resolved = layers.merge(&PrecedencePolicy::default());
        assert_eq!(
            resolved.exposure_s,
            Some(Sourced::new(300.0, Source::Header))
        );
    }

    #[test]
    fn test_absent_fields_fall_through() {
        let layers = Layers {
            folder: exposure(60.0),
            path: Candidates {
                object: Some("M31".to_string()),
                ..Candidates::default()
            },
            ..Layers::default()
        };
        let resolved = layers.merge(&PrecedencePolicy::default());
        assert_eq!(
            resolved.exposure_s,
            Some(Sourced::new(60.0, Source::FolderPattern))
        );
        assert_eq!(
            resolved.object,
            Some(Sourced::new("M31".to_string(), Source::PathInference))
        );
        assert!(resolved.gain.is_none());
    }

    #[test]
    fn test_field_order_override() {
        let layers = Layers {
            header: Candidates {
                filter: Some(FilterName::unmapped("Filter 3")),
                ..Candidates::default()
            },
            path: Candidates {
                filter: Some(FilterName::mapped("Ha")),
                ..Candidates::default()
            },
            ..Layers::default()
        };
        let policy = PrecedencePolicy {
            field_orders: vec![FieldOrder {
                field: Field::Filter,
                order: vec![Source::PathInference, Source::Header],
            }],
            ..PrecedencePolicy::default()
        };
        let resolved = layers.merge(&policy);
        assert_eq!(resolved.filter.map(|f| f.source), Some(Source::PathInference));
    }

    #[test]
    fn test_prefer_mapped_filter() {
        let layers = Layers {
            header: Candidates {
                filter: Some(FilterName::unmapped("Filter 3")),
                ..Candidates::default()
            },
            folder: Candidates {
                filter: Some(FilterName::mapped("OIII")),
                ..Candidates::default()
            },
            ..Layers::default()
        };

        let strict = layers.merge(&PrecedencePolicy::default());
        assert_eq!(
            strict.filter,
            Some(Sourced::new(FilterName::unmapped("Filter 3"), Source::Header))
        );

        let lenient = layers.merge(&PrecedencePolicy {
            prefer_mapped_filter: true,
            ..PrecedencePolicy::default()
        });
        assert_eq!(
            lenient.filter,
            Some(Sourced::new(FilterName::mapped("OIII"), Source::FolderPattern))
        );
    }

    #[test]
    fn test_sources_left_out_of_the_order_are_ignored() {
        let layers = Layers {
            path: exposure(60.0),
            ..Layers::default()
        };
        let policy = PrecedencePolicy {
            order: vec![Source::Header, Source::FilenamePattern],
            ..PrecedencePolicy::default()
        };
        assert!(layers.merge(&policy).exposure_s.is_none());
    }
}
