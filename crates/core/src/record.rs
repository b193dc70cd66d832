//! Metadata record attached to every indexed embedding.
//!
//! A `Record` describes the source image of one vector row: where it lives on
//! disk, a caption, and an ordered list of labels. Records are stored in the
//! same order as vector rows and serialized verbatim into the metadata file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Caption, labels, and source path for one indexed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Filesystem location of the source image.
    pub path: String,
    /// Human or auto-generated description.
    pub caption: String,
    /// Ordered labels, possibly empty.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Record {
    /// Creates a record with the given caption and labels.
    pub fn new(path: impl Into<String>, caption: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            path: path.into(),
            caption: caption.into(),
            labels,
        }
    }

    /// Creates the record a rebuild assigns to a freshly scanned image:
    /// a caption derived from the file name and no labels.
    pub fn for_image(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path: path.to_string_lossy().into_owned(),
            caption: format!("Sample image {name}"),
            labels: Vec::new(),
        }
    }
}
