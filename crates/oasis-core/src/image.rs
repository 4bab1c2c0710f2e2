//! Container image records.

use serde::{Deserialize, Serialize};

use crate::{ChecksumFileId, CoreError, ImageId, Model};

/// A packaged runtime image an algorithm runs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerImage {
    #[serde(flatten)]
    pub meta: Model<ImageId>,

    /// Display name.
    pub name: String,

    /// Registry image reference (e.g. `python:3.10-slim`).
    #[serde(default)]
    pub image_id: Option<String>,

    /// Uploaded image tarball.
    #[serde(default)]
    pub image_file: Option<ChecksumFileId>,
}

/// Where a container image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Pulled from a registry by reference.
    Registry(&'a str),
    /// Loaded from an uploaded tarball.
    File(ChecksumFileId),
}

impl ContainerImage {
    pub fn id(&self) -> ImageId {
        self.meta.id
    }

    /// The single source of this image.
    ///
    /// The server requires exactly one of `image_id` and `image_file`; a
    /// record carrying both or neither is reported as an error.
    pub fn source(&self) -> Result<ImageSource<'_>, CoreError> {
        match (self.image_id.as_deref(), self.image_file) {
            (Some(reference), None) => Ok(ImageSource::Registry(reference)),
            (None, Some(file)) => Ok(ImageSource::File(file)),
            _ => Err(CoreError::InvalidImageSource(self.meta.id.get())),
        }
    }
}

/// Body for registering or replacing a container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImage {
    pub name: String,

    #[serde(default)]
    pub image_id: Option<String>,

    #[serde(default)]
    pub image_file: Option<ChecksumFileId>,
}

impl NewImage {
    /// An image pulled from a registry.
    pub fn registry(name: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_id: Some(reference.into()),
            image_file: None,
        }
    }

    /// An image loaded from an uploaded tarball.
    pub fn file(name: impl Into<String>, file: ChecksumFileId) -> Self {
        Self {
            name: name.into(),
            image_id: None,
            image_file: Some(file),
        }
    }

    /// Check that exactly one source is set before sending.
    pub fn validate(&self) -> Result<(), CoreError> {
        match (&self.image_id, &self.image_file) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(CoreError::InvalidInput(format!(
                "image '{}' must set exactly one of image_id or image_file",
                self.name
            ))),
        }
    }
}

impl From<&ContainerImage> for NewImage {
    fn from(image: &ContainerImage) -> Self {
        Self {
            name: image.name.clone(),
            image_id: image.image_id.clone(),
            image_file: image.image_file,
        }
    }
}
