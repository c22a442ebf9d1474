use crate::structs::{Candidates, FilterName, FrameType};
use chrono::NaiveDate;
use serde::Serialize;

/// Where a file sits relative to the `Object/Telescope/Session/subs` convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// `Object/Telescope/Session/subs/file`, the only expected place for raw subs.
    Subs,
    /// `Object/Telescope/Session/file`
    SessionFolder,
    /// `Object/Telescope/file`
    TelescopeFolder,
    /// `Object/file`
    ObjectFolder,
    /// Loose at the scan root, or outside it.
    Unclassified,
    /// Deeper than the convention, or a fourth folder that is not a subs folder.
    Nested,
}

/// What a session folder name tells about the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionInfo {
    pub date: NaiveDate,
    pub location: Option<String>,
    pub filter: Option<FilterName>,
}

/// Structural information derived from a file's position below the scan root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathContext {
    pub placement: Placement,
    pub object: Option<String>,
    pub telescope: Option<String>,
    pub session: Option<SessionInfo>,
    pub frame_type: FrameType,
    /// Folder names between the root and the file, nearest first.
    pub folders: Vec<String>,
}

impl PathContext {
    pub fn unclassified() -> Self {
        Self {
            placement: Placement::Unclassified,
            object: None,
            telescope: None,
            session: None,
            frame_type: FrameType::default(),
            folders: Vec::new(),
        }
    }

    /// Depends on the placement alone, never on field values.
    pub fn is_anomalous(&self) -> bool {
        self.placement != Placement::Subs
    }

    pub fn candidates(&self) -> Candidates {
        let session = self.session.as_ref();
        Candidates {
            object: self.object.clone(),
            telescope: self.telescope.clone(),
            session_date: session.map(|s| s.date),
            location: session.and_then(|s| s.location.clone()),
            filter: session.and_then(|s| s.filter.clone()),
            ..Candidates::default()
        }
    }
}
