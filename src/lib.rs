// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! step-mesh
//!
//! Converts a geometry-kernel importer's triangulated scan result into a
//! normalized, renderer-ready triangle mesh: coordinate frame remapped to
//! the target (Y-up by default), per-triangle colors resolved against
//! ranged face intervals, color-keyed material grouping when colors are
//! present, and an axis-aligned bounding box. Conversions are memoized
//! per (source identity, transform config).
//!
//! Fetching model bytes and running the geometry kernel are external
//! collaborators, consumed through the [`SourceFetcher`] and
//! [`GeometryImporter`] traits.

pub mod convert;
pub mod error;
pub mod import;
pub mod materials;
pub mod mesh;
pub mod transform;
pub mod triangles;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use convert::{convert_result, GeometryImporter, MeshConverter, SourceFetcher};
pub use error::{Error, Result};
pub use import::{read_segments, FaceColorRange, ImportResult, Segment};
pub use materials::{group_by_color, DEFAULT_MATERIAL_COLOR};
pub use mesh::{BoundingBox, Material, MaterialTable, Rgba, Triangle, TriangleMesh};
pub use transform::{transform_triangles, AxisTransform, SignedAxis, TransformConfig};
pub use triangles::{extract_triangles, face_normal, resolve_color};
