use crate::structs::{FileFormat, HeaderFamily};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Raw header keys and values, exactly as present in the file.
pub type HeaderFields = Map<String, Value>;

/// What a header reader managed to get out of a file.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderOutcome {
    /// The complete header was read.
    Found(HeaderFields),
    /// Some fields were read before the header became unreadable.
    Partial { fields: HeaderFields, reason: String },
    /// Nothing usable; the header source is absent for this file.
    Unreadable(String),
}

impl HeaderOutcome {
    /// Whatever fields were read, empty for an unreadable header.
    pub fn into_fields(self) -> HeaderFields {
        match self {
            Self::Found(fields) | Self::Partial { fields, .. } => fields,
            Self::Unreadable(_) => HeaderFields::new(),
        }
    }

    /// The reason a header was not fully read.
    pub fn problem(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::Partial { reason, .. } | Self::Unreadable(reason) => Some(reason),
        }
    }

    /// `Partial` when some fields were read, `Unreadable` otherwise.
    pub(crate) fn degraded(fields: HeaderFields, reason: impl Into<String>) -> Self {
        if fields.is_empty() {
            Self::Unreadable(reason.into())
        } else {
            Self::Partial {
                fields,
                reason: reason.into(),
            }
        }
    }
}

/// Reads the embedded header of one file.
///
/// Implementations open the file, read what they need and close it again within one call.
/// They return `Err` only when the file cannot be opened at all; anything wrong with its
/// content is reported through [`HeaderOutcome`].
pub trait HeaderReader {
    fn read(&mut self, path: &Path) -> io::Result<HeaderOutcome>;
}

/// Dispatch table from header family to its reader.
#[derive(Default)]
pub struct ReaderTable {
    readers: HashMap<HeaderFamily, Box<dyn HeaderReader>>,
}

impl ReaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the reader for `family`.
    pub fn register(&mut self, family: HeaderFamily, reader: impl HeaderReader + 'static) {
        self.readers.insert(family, Box::new(reader));
    }

    /// Reads the header of `path` with the reader for its format.
    pub fn read(&mut self, format: FileFormat, path: &Path) -> io::Result<HeaderOutcome> {
        match self.readers.get_mut(&format.family()) {
            Some(reader) => reader.read(path),
            None => Ok(HeaderOutcome::Unreadable(format!(
                "no header reader registered for {format} files"
            ))),
        }
    }
}
