// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the tilegram data model.

use crate::model::RegionId;

/// Result type alias for data model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The table a failed region lookup was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    /// The region-code-to-name table of a geography.
    Geography,
    /// The dataset metric listing.
    Dataset,
}

impl std::fmt::Display for LookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupTable::Geography => f.write_str("geography"),
            LookupTable::Dataset => f.write_str("dataset"),
        }
    }
}

/// Errors that can occur while building or querying the data model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A region id has no entry in the table it was looked up in.
    #[error("region {region:?} has no entry in the {table} table")]
    Lookup { region: RegionId, table: LookupTable },

    /// No code table is registered for the requested geography.
    #[error("unknown geography: {0:?}")]
    UnknownGeography(String),

    /// A dataset lists the same region twice.
    #[error("dataset lists region {0:?} more than once")]
    DuplicateRegion(RegionId),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
