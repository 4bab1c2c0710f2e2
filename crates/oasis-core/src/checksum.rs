//! Checksum file records.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ChecksumFileId, ChecksumFileStatus, CollectionId, CoreError, Model, UserId};

/// A stored file whose integrity can be checksum-validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecksumFile {
    #[serde(flatten)]
    pub meta: Model<ChecksumFileId>,

    /// File name, possibly a `/`-separated path.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Validation status.
    pub status: ChecksumFileStatus,

    /// Stored file reference.
    pub file: String,

    /// External URL the file was registered from.
    pub url: String,

    /// Link to download the contents.
    pub download_url: String,

    /// Source type code.
    #[serde(rename = "type")]
    pub file_type: FileType,

    /// Why validation failed, if it did.
    #[serde(default)]
    pub failure_reason: Option<String>,

    pub checksum: String,

    /// Whether the checksum should be validated.
    pub validate_checksum: bool,

    /// Outcome of the most recent validation.
    pub last_validation: bool,

    #[serde(default)]
    pub collection: Option<CollectionId>,

    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl ChecksumFile {
    pub fn id(&self) -> ChecksumFileId {
        self.meta.id
    }

    /// Last path component of `name`.
    pub fn basename(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Opaque source type code of a checksum file. Only `1` and `2` exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FileType {
    One = 1,
    Two = 2,
}

impl FileType {
    /// The integer code used on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for FileType {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(CoreError::InvalidInput(format!(
                "checksum file type must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<FileType> for u8 {
    fn from(file_type: FileType) -> Self {
        file_type.code()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.code(), f)
    }
}
