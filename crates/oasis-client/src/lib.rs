//! API client library for RD-OASIS.
//!
//! Provides a typed HTTP client for the algorithm, task, dataset and
//! container image endpoints of the RD-OASIS REST API.

pub mod config;
pub mod error;
pub mod http;

#[cfg(any(test, feature = "test-util"))]
pub mod stub;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::ApiClient;
