//! Newtype wrappers for record identifiers to ensure type safety.
//!
//! The server hands out integer primary keys for every record kind. On the
//! wire they are bare integers; the newtypes keep an algorithm id from being
//! passed where a dataset id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create an id from its integer value.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the integer value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

record_id!(
    /// Identifier of a container image record.
    ImageId
);
record_id!(
    /// Identifier of an algorithm.
    AlgorithmId
);
record_id!(
    /// Identifier of an algorithm task (one execution attempt).
    TaskId
);
record_id!(
    /// Identifier of a dataset.
    DatasetId
);
record_id!(
    /// Identifier of a checksum file.
    ChecksumFileId
);
record_id!(
    /// Identifier of a file collection.
    CollectionId
);
record_id!(
    /// Identifier of a user account.
    UserId
);
