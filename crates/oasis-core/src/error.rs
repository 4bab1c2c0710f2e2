//! Core domain errors.

use thiserror::Error;

/// Core domain errors for RD-OASIS clients.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Container image names neither or both of its sources.
    #[error("Container image {0} must set exactly one of image_id or image_file")]
    InvalidImageSource(u64),

    /// No route with this name exists in the table.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// A named route was asked for without one of its parameters.
    #[error("Route '{route}' requires parameter '{param}'")]
    MissingRouteParam { route: String, param: String },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
