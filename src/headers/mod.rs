//! Readers for the metadata embedded in image files.
pub mod camera;
pub mod fits;
mod structs;

pub use camera::CameraTagReader;
pub use fits::FitsReader;
pub use structs::{HeaderFields, HeaderOutcome, HeaderReader, ReaderTable};

use crate::structs::HeaderFamily;
use std::path::Path;

impl ReaderTable {
    /// The FITS reader and the `exiftool` camera tag reader.
    pub fn with_defaults(fits_block_limit: usize, exiftool_path: Option<&Path>) -> Self {
        let mut table = Self::new();
        table.register(HeaderFamily::Scientific, FitsReader::new(fits_block_limit));
        table.register(HeaderFamily::CameraTags, CameraTagReader::new(exiftool_path));
        table
    }
}
