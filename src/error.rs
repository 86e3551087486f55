// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for mesh conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting a solid-geometry scan result
///
/// None of these are recovered locally; they all propagate to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Retrieval of the raw model bytes failed (non-2xx status or equivalent).
    /// Surfaced immediately, never retried here.
    #[error("Failed to fetch source: {0}")]
    SourceFetchFailed(String),

    /// The external geometry-kernel importer reported failure.
    #[error("Geometry import failed: {0}")]
    GeometryImportFailed(String),

    /// The importer's result did not match the expected shape.
    #[error("Malformed geometry result: {0}")]
    MalformedGeometryResult(String),

    /// Caller supplied a transform preset name this crate does not know.
    #[error("Unknown transform preset: {0}")]
    UnknownTransformPreset(String),
}
