// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology encoding and decoding.

use crate::types::ArcIndex;

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding, building or decoding topologies.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Region lookup or dataset error from the data model.
    #[error("{0}")]
    Core(#[from] tilegram_core::Error),

    /// A feature cannot be turned into arcs: it has no coordinate paths, a
    /// path with fewer than 2 points, or a position with fewer than 2
    /// components.
    #[error("feature {feature}: malformed geometry: {reason}")]
    MalformedGeometry { feature: usize, reason: String },

    /// A feature uses geometry the encoder does not handle.
    #[error("feature {feature}: unsupported geometry: {reason}")]
    UnsupportedGeometry { feature: usize, reason: String },

    /// The requested object is not part of the topology.
    #[error("object not found in topology: {0:?}")]
    ObjectNotFound(String),

    /// A geometry references an arc that does not exist.
    #[error("arc index {0} out of range")]
    ArcOutOfRange(ArcIndex),

    /// Build options that cannot produce a topology.
    #[error("invalid build options: {0}")]
    InvalidOptions(String),

    /// A topology document that does not follow the TopoJSON layout.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error is a failed region lookup.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Error::Core(tilegram_core::Error::Lookup { .. })
                | Error::Core(tilegram_core::Error::UnknownGeography(_))
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
