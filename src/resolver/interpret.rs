//! Turns raw header maps into typed field candidates.

use crate::config::Placeholders;
use crate::headers::HeaderFields;
use crate::patterns::FilterTable;
use crate::patterns::parsing::{
    parse_timestamp, valid_exposure, value_to_f64, value_to_i64, value_to_string,
};
use crate::structs::{Candidates, Field, FileFormat, HeaderFamily};

/// Exposure keys with the divisor that converts them to seconds.
const FITS_EXPOSURE_KEYS: [(&str, f64); 3] =
    [("EXPTIME", 1.0), ("EXPOSURE", 1.0), ("EXPOINUS", 1e6)];

struct HeaderView<'a> {
    fields: &'a HeaderFields,
    format: FileFormat,
    placeholders: &'a Placeholders,
}

impl HeaderView<'_> {
    fn is_placeholder(&self, field: Field, value: f64) -> bool {
        self.placeholders.is_placeholder(self.format, field, value)
    }

    /// First key holding a usable number, divided by its unit divisor.
    fn number(&self, field: Field, keys: &[(&str, f64)]) -> Option<f64> {
        keys.iter().find_map(|(key, divisor)| {
            self.fields
                .get(*key)
                .and_then(value_to_f64)
                .map(|v| v / divisor)
                .filter(|v| v.is_finite() && !self.is_placeholder(field, *v))
        })
    }

    fn integer(&self, field: Field, keys: &[&str]) -> Option<i64> {
        keys.iter().find_map(|key| {
            self.fields
                .get(*key)
                .and_then(value_to_i64)
                .filter(|v| !self.is_placeholder(field, *v as f64))
        })
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|key| self.fields.get(*key).and_then(value_to_string))
    }
}

/// Candidates from a header map read from a file of `format`.
///
/// Empty strings and configured placeholder values count as absent.
pub fn header_candidates(
    format: FileFormat,
    fields: &HeaderFields,
    filters: &FilterTable,
    placeholders: &Placeholders,
) -> Candidates {
    let view = HeaderView {
        fields,
        format,
        placeholders,
    };
    match format.family() {
        HeaderFamily::Scientific => fits_candidates(&view, filters),
        HeaderFamily::CameraTags => camera_candidates(&view),
    }
}

fn fits_candidates(view: &HeaderView<'_>, filters: &FilterTable) -> Candidates {
    let exposure_s = FITS_EXPOSURE_KEYS.iter().find_map(|key| {
        view.number(Field::Exposure, std::slice::from_ref(key))
            .and_then(valid_exposure)
    });

    Candidates {
        object: view.text(&["OBJECT"]),
        telescope: view.text(&["TELESCOP"]),
        camera: view.text(&["INSTRUME", "CAMERA"]),
        focal_length: view
            .number(Field::FocalLength, &[("FOCALLEN", 1.0)])
            .filter(|mm| *mm > 0.0),
        session_date: None,
        capture_time: view.text(&["DATE-OBS"]).and_then(|t| parse_timestamp(&t)),
        location: view.text(&["SITENAME"]),
        filter: view.text(&["FILTER"]).and_then(|f| filters.normalize(&f)),
        exposure_s,
        gain: view.integer(Field::Gain, &["GAIN", "ISOSPEED"]),
        temperature_c: view.number(Field::Temperature, &[("CCD-TEMP", 1.0), ("SET-TEMP", 1.0)]),
        binning: view
            .integer(Field::Binning, &["XBINNING"])
            .and_then(|b| u32::try_from(b).ok())
            .filter(|b| *b > 0),
        rotation: None,
    }
}

fn camera_candidates(view: &HeaderView<'_>) -> Candidates {
    Candidates {
        camera: camera_name(view.text(&["Make"]), view.text(&["Model"])),
        focal_length: view
            .number(Field::FocalLength, &[("FocalLength", 1.0)])
            .filter(|mm| *mm > 0.0),
        capture_time: view
            .text(&["DateTimeOriginal"])
            .and_then(|t| parse_timestamp(&t)),
        exposure_s: view
            .number(Field::Exposure, &[("ExposureTime", 1.0)])
            .and_then(valid_exposure),
        gain: view.integer(Field::Gain, &["ISO"]),
        temperature_c: view.number(Field::Temperature, &[("CameraTemperature", 1.0)]),
        ..Candidates::default()
    }
}

/// `Canon` + `EOS Ra` gives `Canon EOS Ra`; a model that already names the make is kept as is.
fn camera_name(make: Option<String>, model: Option<String>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) => {
            let brand = make.split_whitespace().next().unwrap_or_default();
            if model.to_lowercase().contains(&brand.to_lowercase()) {
                Some(model)
            } else {
                Some(format!("{make} {model}"))
            }
        }
        (make, model) => model.or(make),
    }
}
