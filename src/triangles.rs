// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle extraction and face-color resolution.
//!
//! Walks a validated segment's index triples, resolves vertex positions,
//! synthesizes a per-triangle normal, and resolves each triangle's color
//! against the segment's ordered face-color ranges.

use crate::import::{FaceColorRange, Segment};
use crate::mesh::{Rgba, Triangle};
use nalgebra::{Point3, Vector3};

/// Extract all triangles from a validated segment.
///
/// Triangle `t` covers indices `3t..3t+3`. When the segment carries vertex
/// normals, the triangle normal is their component-wise arithmetic mean;
/// otherwise it is the raw edge cross product `(v1-v0) x (v2-v0)`. Neither
/// form is renormalized: the averaged normal can be non-unit (near zero on
/// sharply curved or degenerate triangles) and the cross product's
/// magnitude is twice the triangle's area. This matches the source
/// geometry contract; consumers needing unit normals normalize downstream.
pub fn extract_triangles(segment: &Segment) -> Vec<Triangle> {
    let count = segment.triangle_count();
    let mut triangles = Vec::with_capacity(count);

    for t in 0..count {
        let i0 = segment.indices[t * 3] as usize;
        let i1 = segment.indices[t * 3 + 1] as usize;
        let i2 = segment.indices[t * 3 + 2] as usize;

        let v0 = segment.positions[i0];
        let v1 = segment.positions[i1];
        let v2 = segment.positions[i2];

        let normal = match &segment.normals {
            Some(normals) => (normals[i0] + normals[i1] + normals[i2]) / 3.0,
            None => face_normal(&v0, &v1, &v2),
        };

        let color = resolve_color(t as u32, &segment.face_colors, segment.mesh_color);

        triangles.push(Triangle::new([v0, v1, v2], normal, color));
    }

    triangles
}

/// Compute a face normal from edge vectors, unnormalized
#[inline]
pub fn face_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    edge1.cross(&edge2)
}

/// Resolve the color of triangle `t` within its segment.
///
/// Scans the ranges in the order given and takes the first one covering
/// `t` that carries a color (ranges are assumed non-overlapping, but the
/// scan does not enforce it). Falls back to the segment-wide color, else
/// no color. The linear scan is O(ranges) per triangle, which is fine for
/// the small range lists a single solid produces.
pub fn resolve_color(
    t: u32,
    ranges: &[FaceColorRange],
    mesh_color: Option<[f64; 3]>,
) -> Option<Rgba> {
    for range in ranges {
        if t >= range.first && t <= range.last {
            if let Some(color) = range.color {
                return Some(Rgba::from_unit_rgb(color));
            }
        }
    }

    mesh_color.map(Rgba::from_unit_rgb)
}
