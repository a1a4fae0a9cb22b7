//! Import configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::GeometryMerge;
use crate::context::CommitMode;

/// Errors reading an options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs controlling how a document is turned into scene entities.
///
/// Defaults match the reference importer's geometry handling and stage the
/// scene so a failed import leaves the host untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// How multiple geometry entries on one object combine
    pub geometry_merge: GeometryMerge,

    /// Whether entities reach the host all at once or as they are built
    pub commit: CommitMode,
}

impl ImportOptions {
    /// Load options from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_geometry_merge(mut self, merge: GeometryMerge) -> Self {
        self.geometry_merge = merge;
        self
    }

    pub fn with_commit(mut self, commit: CommitMode) -> Self {
        self.commit = commit;
        self
    }
}
