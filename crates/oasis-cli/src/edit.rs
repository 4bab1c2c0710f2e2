//! Flags for registering and editing records, applied onto request bodies.

use clap::Args;

use oasis_core::{
    ChecksumFileId, CoreError, DatasetId, ImageId, NewAlgorithm, NewDataset, NewImage,
};

/// Parse a `KEY=VALUE` environment variable.
pub fn parse_env(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn required<T: Clone>(value: &Option<T>, flag: &str) -> Result<T, CoreError> {
    value
        .clone()
        .ok_or_else(|| CoreError::InvalidInput(format!("--{flag} is required")))
}

#[derive(Args, Debug, Default)]
pub struct ImageSourceArgs {
    /// Registry image reference
    #[arg(long, conflicts_with = "image_file")]
    pub image_id: Option<String>,

    /// Uploaded image tarball (checksum file ID)
    #[arg(long)]
    pub image_file: Option<u64>,
}

impl ImageSourceArgs {
    /// Set the chosen source and clear the other one.
    fn apply(&self, image: &mut NewImage) {
        if let Some(reference) = &self.image_id {
            image.image_id = Some(reference.clone());
            image.image_file = None;
        }
        if let Some(file) = self.image_file {
            image.image_file = Some(ChecksumFileId::new(file));
            image.image_id = None;
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ImageEdit {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub source: ImageSourceArgs,
}

impl ImageEdit {
    pub fn create(&self) -> Result<NewImage, CoreError> {
        let mut image = NewImage {
            name: required(&self.name, "name")?,
            image_id: None,
            image_file: None,
        };
        self.source.apply(&mut image);
        Ok(image)
    }

    pub fn apply(&self, mut image: NewImage) -> NewImage {
        if let Some(name) = &self.name {
            image.name = name.clone();
        }
        self.source.apply(&mut image);
        image
    }
}

#[derive(Args, Debug, Default)]
pub struct AlgorithmEdit {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Command run inside the container
    #[arg(long)]
    pub command: Option<String>,

    /// Container image ID
    #[arg(long)]
    pub image: Option<u64>,

    /// Entrypoint override
    #[arg(long)]
    pub entrypoint: Option<String>,

    /// Whether the algorithm needs a GPU (true/false)
    #[arg(long)]
    pub gpu: Option<bool>,

    /// Environment variable (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,

    /// Input dataset ID (repeatable, replaces the list)
    #[arg(long = "input", value_name = "ID")]
    pub inputs: Vec<u64>,
}

impl AlgorithmEdit {
    pub fn create(&self) -> Result<NewAlgorithm, CoreError> {
        let alg = NewAlgorithm::new(
            required(&self.name, "name")?,
            required(&self.command, "command")?,
            ImageId::new(required(&self.image, "image")?),
        );
        Ok(self.apply(alg))
    }

    pub fn apply(&self, mut alg: NewAlgorithm) -> NewAlgorithm {
        if let Some(name) = &self.name {
            alg.name = name.clone();
        }
        if let Some(command) = &self.command {
            alg.command = command.clone();
        }
        if let Some(image) = self.image {
            alg.docker_image = ImageId::new(image);
        }
        if let Some(entrypoint) = &self.entrypoint {
            alg.entrypoint = Some(entrypoint.clone()).filter(|e| !e.is_empty());
        }
        if let Some(gpu) = self.gpu {
            alg.gpu = gpu;
        }
        for (key, value) in &self.env {
            alg.environment.insert(key.clone(), value.clone());
        }
        if !self.inputs.is_empty() {
            alg.input_dataset = self.inputs.iter().copied().map(DatasetId::new).collect();
        }
        alg
    }
}

#[derive(Args, Debug, Default)]
pub struct DatasetEdit {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Checksum file ID (repeatable, replaces the list)
    #[arg(long = "file", value_name = "ID")]
    pub files: Vec<u64>,
}

impl DatasetEdit {
    pub fn create(&self) -> Result<NewDataset, CoreError> {
        let dataset = NewDataset::new(required(&self.name, "name")?);
        Ok(self.apply(dataset))
    }

    pub fn apply(&self, mut dataset: NewDataset) -> NewDataset {
        if let Some(name) = &self.name {
            dataset.name = name.clone();
        }
        if let Some(description) = &self.description {
            dataset.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if !self.files.is_empty() {
            dataset.files = self.files.iter().copied().map(ChecksumFileId::new).collect();
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env() {
        assert_eq!(
            parse_env("MODE=fast=1").unwrap(),
            ("MODE".to_string(), "fast=1".to_string())
        );
        assert!(parse_env("MODE").is_err());
        assert!(parse_env("=fast").is_err());
    }

    #[test]
    fn test_image_create_requires_name() {
        let edit = ImageEdit::default();
        assert!(matches!(edit.create(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_image_source_switch_clears_other() {
        let edit = ImageEdit {
            name: None,
            source: ImageSourceArgs {
                image_id: None,
                image_file: Some(9),
            },
        };
        let image = edit.apply(NewImage::registry("python", "python:3.10-slim"));
        assert_eq!(image.name, "python");
        assert_eq!(image.image_id, None);
        assert_eq!(image.image_file, Some(ChecksumFileId::new(9)));
    }

    #[test]
    fn test_algorithm_create() {
        let edit = AlgorithmEdit {
            name: Some("threshold".to_string()),
            command: Some("python run.py".to_string()),
            image: Some(3),
            env: vec![("BAND".to_string(), "red".to_string())],
            inputs: vec![5],
            ..AlgorithmEdit::default()
        };
        let alg = edit.create().unwrap();
        assert_eq!(alg.docker_image, ImageId::new(3));
        assert_eq!(alg.environment["BAND"], "red");
        assert_eq!(alg.input_dataset, vec![DatasetId::new(5)]);
        assert!(!alg.gpu);

        let missing_image = AlgorithmEdit {
            image: None,
            ..edit
        };
        assert!(missing_image.create().is_err());
    }

    #[test]
    fn test_algorithm_apply_keeps_unset_fields() {
        let mut current = NewAlgorithm::new("echo", "echo hi", ImageId::new(1));
        current.input_dataset = vec![DatasetId::new(2)];
        current.entrypoint = Some("/bin/sh".to_string());

        let edit = AlgorithmEdit {
            gpu: Some(true),
            entrypoint: Some(String::new()),
            ..AlgorithmEdit::default()
        };
        let updated = edit.apply(current);
        assert_eq!(updated.name, "echo");
        assert_eq!(updated.input_dataset, vec![DatasetId::new(2)]);
        assert_eq!(updated.entrypoint, None);
        assert!(updated.gpu);
    }

    #[test]
    fn test_dataset_apply() {
        let edit = DatasetEdit {
            description: Some("flights".to_string()),
            files: vec![4, 6],
            ..DatasetEdit::default()
        };
        let dataset = edit.apply(NewDataset::new("survey"));
        assert_eq!(dataset.name, "survey");
        assert_eq!(dataset.description.as_deref(), Some("flights"));
        assert_eq!(dataset.files.len(), 2);
        assert!(edit.create().is_err());
    }
}
