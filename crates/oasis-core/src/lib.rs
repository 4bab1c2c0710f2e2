//! RD-OASIS Core Types
//!
//! This crate contains the record shapes exchanged with the RD-OASIS API
//! and the page route table, with no dependencies on:
//! - Network/HTTP
//! - Runtime specifics
//!
//! Records decode from and encode to the server's JSON layout via serde.

pub mod algorithm;
pub mod checksum;
pub mod dataset;
pub mod error;
pub mod ids;
pub mod image;
pub mod model;
pub mod route;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use algorithm::{Algorithm, AlgorithmRun, NewAlgorithm};
pub use checksum::{ChecksumFile, FileType};
pub use dataset::{Dataset, DatasetFilesUpdate, DatasetTree, FolderSummary, NewDataset};
pub use error::CoreError;
pub use ids::{AlgorithmId, ChecksumFileId, CollectionId, DatasetId, ImageId, TaskId, UserId};
pub use image::{ContainerImage, ImageSource, NewImage};
pub use model::{Model, PageRequest, Paginated};
pub use route::{Route, RouteMatch, RouteTable, View};
pub use status::{ChecksumFileStatus, TaskStatus};
pub use task::{LogSlice, Task};
