// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for SVG output.

/// Result type alias for SVG output.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing the document failed.
    #[error("failed to write SVG: {0}")]
    Io(#[from] std::io::Error),
}
