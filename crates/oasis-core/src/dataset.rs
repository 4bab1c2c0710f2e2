//! Dataset records and the file update body.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChecksumFile, ChecksumFileId, DatasetId, Model};

/// A named collection of files used as algorithm input or output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(flatten)]
    pub meta: Model<DatasetId>,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Files in the dataset.
    pub files: Vec<ChecksumFileId>,

    /// Total size in bytes, computed by the server.
    #[serde(default)]
    pub size: Option<u64>,
}

impl Dataset {
    pub fn id(&self) -> DatasetId {
        self.meta.id
    }
}

/// Body of `PUT /datasets/{id}/files/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFilesUpdate {
    /// Files to add.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insert: Vec<ChecksumFileId>,

    /// Files to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delete: Vec<ChecksumFileId>,
}

impl DatasetFilesUpdate {
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty()
    }
}

/// Body for creating or replacing a dataset. `size` is computed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDataset {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub files: Vec<ChecksumFileId>,
}

impl NewDataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            files: Vec::new(),
        }
    }
}

impl From<&Dataset> for NewDataset {
    fn from(dataset: &Dataset) -> Self {
        Self {
            name: dataset.name.clone(),
            description: dataset.description.clone(),
            files: dataset.files.clone(),
        }
    }
}

/// One level of a dataset's file hierarchy, below some path prefix.
///
/// Files directly at this level are keyed by base name. Deeper files are
/// summarised per first path component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetTree {
    pub folders: BTreeMap<String, FolderSummary>,
    pub files: BTreeMap<String, ChecksumFile>,
}

impl DatasetTree {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }

    /// Path prefix that lists `folder` when fetched again.
    pub fn child_prefix(prefix: &str, folder: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            folder.to_string()
        } else {
            format!("{prefix}/{folder}")
        }
    }
}

/// Aggregate of the files under one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    /// Sum of the sizes the server knows.
    pub known_size: u64,

    pub num_files: u64,

    /// Files registered by URL whose size is unknown.
    pub num_url_files: u64,

    /// Earliest creation time of any file in the folder.
    pub created: DateTime<Utc>,

    /// Latest modification time of any file in the folder.
    pub modified: DateTime<Utc>,
}
