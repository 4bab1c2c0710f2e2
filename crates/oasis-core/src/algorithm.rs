//! Algorithm records and the run request body.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{AlgorithmId, DatasetId, ImageId, Model};

/// A runnable unit: a command executed inside a container image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Algorithm {
    #[serde(flatten)]
    pub meta: Model<AlgorithmId>,

    /// Display name.
    pub name: String,

    /// Environment variables set in the container.
    pub environment: BTreeMap<String, String>,

    /// Command run inside the container.
    pub command: String,

    /// Overrides the image entrypoint when set.
    #[serde(default)]
    pub entrypoint: Option<String>,

    /// Whether the algorithm needs a GPU.
    pub gpu: bool,

    /// Image the command runs in.
    pub docker_image: ImageId,

    /// Datasets the algorithm has been bound to as input.
    pub input_dataset: Vec<DatasetId>,
}

impl Algorithm {
    /// Create an algorithm with no environment, entrypoint or inputs.
    pub fn new(
        meta: Model<AlgorithmId>,
        name: impl Into<String>,
        command: impl Into<String>,
        docker_image: ImageId,
    ) -> Self {
        Self {
            meta,
            name: name.into(),
            environment: BTreeMap::new(),
            command: command.into(),
            entrypoint: None,
            gpu: false,
            docker_image,
            input_dataset: Vec::new(),
        }
    }

    /// Builder method to add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Builder method to set the entrypoint.
    pub fn with_entrypoint(mut self, entrypoint: impl Into<String>) -> Self {
        self.entrypoint = Some(entrypoint.into());
        self
    }

    /// Builder method to request a GPU.
    pub fn with_gpu(mut self, gpu: bool) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn id(&self) -> AlgorithmId {
        self.meta.id
    }
}

/// Body of `POST /algorithms/{id}/run/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmRun {
    /// Dataset mounted as the task's input.
    pub input_dataset: DatasetId,
}

/// Body for registering or replacing an algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlgorithm {
    pub name: String,
    pub environment: BTreeMap<String, String>,
    pub command: String,

    #[serde(default)]
    pub entrypoint: Option<String>,

    pub gpu: bool,
    pub docker_image: ImageId,

    #[serde(default)]
    pub input_dataset: Vec<DatasetId>,
}

impl NewAlgorithm {
    pub fn new(name: impl Into<String>, command: impl Into<String>, docker_image: ImageId) -> Self {
        Self {
            name: name.into(),
            environment: BTreeMap::new(),
            command: command.into(),
            entrypoint: None,
            gpu: false,
            docker_image,
            input_dataset: Vec::new(),
        }
    }
}

impl From<&Algorithm> for NewAlgorithm {
    fn from(alg: &Algorithm) -> Self {
        Self {
            name: alg.name.clone(),
            environment: alg.environment.clone(),
            command: alg.command.clone(),
            entrypoint: alg.entrypoint.clone(),
            gpu: alg.gpu,
            docker_image: alg.docker_image,
            input_dataset: alg.input_dataset.clone(),
        }
    }
}
