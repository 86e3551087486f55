// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry-kernel importer result contract and boundary validation.
//!
//! The external importer hands over triangulated mesh segments in a fixed
//! shape (flat position/normal/index arrays plus face-color ranges). This
//! module models that contract as a strict schema and validates it into
//! typed segments before any pipeline stage runs. Anything that does not
//! match the schema is rejected here, never coerced downstream.

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Raw result produced by the external geometry-kernel importer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    /// Whether the kernel parsed the solid model successfully
    pub success: bool,
    /// Triangulated mesh segments, one per solid body or colored region
    #[serde(default)]
    pub meshes: Vec<RawSegment>,
}

/// One raw mesh segment as emitted by the importer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub attributes: RawAttributes,
    pub index: RawIndexArray,
    /// Ordered face-color ranges over this segment's triangle indices
    #[serde(default)]
    pub brep_faces: Vec<FaceColorRange>,
    /// Segment-wide color, channels in 0.0-1.0
    #[serde(default)]
    pub color: Option<[f64; 3]>,
}

/// Vertex attribute arrays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAttributes {
    pub position: RawFloatArray,
    #[serde(default)]
    pub normal: Option<RawFloatArray>,
}

/// Flat float array, length = 3 x vertex count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFloatArray {
    pub array: Vec<f64>,
}

/// Flat index array, length divisible by 3
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIndexArray {
    pub array: Vec<u32>,
}

/// Inclusive triangle-index interval sharing one color.
///
/// Bounds address triangle indices within a single segment. Channels are
/// in the importer's 0.0-1.0 range; conversion to stored form happens
/// during color resolution, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceColorRange {
    pub first: u32,
    pub last: u32,
    #[serde(default)]
    pub color: Option<[f64; 3]>,
}

/// A validated mesh segment, ready for triangle extraction
#[derive(Debug, Clone)]
pub struct Segment {
    /// Vertex positions
    pub positions: Vec<Point3<f64>>,
    /// Per-vertex normals, same length as `positions` when present
    pub normals: Option<Vec<Vector3<f64>>>,
    /// Triangle indices into `positions`, in groups of three
    pub indices: Vec<u32>,
    /// Ordered face-color ranges, scanned first-match-wins
    pub face_colors: Vec<FaceColorRange>,
    /// Segment-wide fallback color, channels in 0.0-1.0
    pub mesh_color: Option<[f64; 3]>,
}

impl Segment {
    /// Number of triangles in this segment
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Validate an importer result into typed segments.
///
/// Fails with [`Error::GeometryImportFailed`] when the kernel reported
/// failure, and with [`Error::MalformedGeometryResult`] when a segment's
/// arrays do not line up (position/index length not a multiple of 3,
/// an index outside the position array, or a normal array whose length
/// differs from the position array). Only shape is normalized here; no
/// coordinate transform or color conversion happens in this stage.
pub fn read_segments(result: ImportResult) -> Result<Vec<Segment>> {
    if !result.success {
        return Err(Error::GeometryImportFailed(
            "importer reported failure".to_string(),
        ));
    }

    let mut segments = Vec::with_capacity(result.meshes.len());

    for (i, raw) in result.meshes.into_iter().enumerate() {
        segments.push(read_segment(raw).map_err(|e| match e {
            Error::MalformedGeometryResult(msg) => {
                Error::MalformedGeometryResult(format!("segment {}: {}", i, msg))
            }
            other => other,
        })?);
    }

    Ok(segments)
}

fn read_segment(raw: RawSegment) -> Result<Segment> {
    let position = raw.attributes.position.array;
    if position.len() % 3 != 0 {
        return Err(Error::MalformedGeometryResult(format!(
            "position array length {} is not a multiple of 3",
            position.len()
        )));
    }

    let indices = raw.index.array;
    if indices.len() % 3 != 0 {
        return Err(Error::MalformedGeometryResult(format!(
            "index array length {} is not a multiple of 3",
            indices.len()
        )));
    }

    let vertex_count = position.len() / 3;
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::MalformedGeometryResult(format!(
            "index {} out of range for {} vertices",
            bad, vertex_count
        )));
    }

    let positions: Vec<Point3<f64>> = position
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect();

    let normals = match raw.attributes.normal {
        Some(normal) => {
            if normal.array.len() != vertex_count * 3 {
                return Err(Error::MalformedGeometryResult(format!(
                    "normal array length {} does not match {} vertices",
                    normal.array.len(),
                    vertex_count
                )));
            }
            Some(
                normal
                    .array
                    .chunks_exact(3)
                    .map(|c| Vector3::new(c[0], c[1], c[2]))
                    .collect(),
            )
        }
        None => None,
    };

    Ok(Segment {
        positions,
        normals,
        indices,
        face_colors: raw.brep_faces,
        mesh_color: raw.color,
    })
}
