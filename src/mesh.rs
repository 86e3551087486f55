// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use std::hash::{Hash, Hasher};

/// RGBA color with 0-255 integer channels and a 0.0-1.0 alpha
#[derive(Debug, Clone, Copy)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Create a new color
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert importer channel floats (0.0-1.0 range) to stored form.
    /// Channels round to the nearest 0-255 integer; alpha is always 1.0.
    #[inline]
    pub fn from_unit_rgb(rgb: [f64; 3]) -> Self {
        Self {
            r: (rgb[0] * 255.0).round() as u8,
            g: (rgb[1] * 255.0).round() as u8,
            b: (rgb[2] * 255.0).round() as u8,
            a: 1.0,
        }
    }
}

// Colors key material buckets, so they need exact structural identity.
// Alpha is compared and hashed through its bit pattern, the same way
// the conversion cache hashes float data.
impl PartialEq for Rgba {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r
            && self.g == other.g
            && self.b == other.b
            && self.a.to_bits() == other.a.to_bits()
    }
}

impl Eq for Rgba {}

impl Hash for Rgba {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
        self.a.to_bits().hash(state);
    }
}

/// A single triangle with resolved vertices, normal, and appearance
///
/// The normal is carried exactly as produced by extraction: either the
/// component-wise average of the three vertex normals or a raw edge
/// cross product. It is NOT unit length; consumers that need
/// lighting-correct normals must normalize downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Vertex positions, always exactly three
    pub vertices: [Point3<f64>; 3],
    /// Face normal (not normalized)
    pub normal: Vector3<f64>,
    /// Resolved color, if any face range or mesh color applied
    pub color: Option<Rgba>,
    /// Material bucket index, assigned only during material grouping
    pub material_index: Option<u32>,
}

impl Triangle {
    /// Create an ungrouped triangle
    pub fn new(vertices: [Point3<f64>; 3], normal: Vector3<f64>, color: Option<Rgba>) -> Self {
        Self {
            vertices,
            normal,
            color,
            material_index: None,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Compute the bounding box of a triangle set.
    ///
    /// An empty set yields both corners at the origin. That is a defined
    /// fallback, not an error: a solid with zero visible geometry is a
    /// legitimate input. Comparisons are exact, no epsilon.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        if triangles.is_empty() {
            return Self {
                min: Point3::origin(),
                max: Point3::origin(),
            };
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for triangle in triangles {
            for vertex in &triangle.vertices {
                min.x = min.x.min(vertex.x);
                min.y = min.y.min(vertex.y);
                min.z = min.z.min(vertex.z);
                max.x = max.x.max(vertex.x);
                max.y = max.y.max(vertex.y);
                max.z = max.z.max(vertex.z);
            }
        }

        Self { min, max }
    }
}

/// A generated material: its name and four-channel color
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Rgba,
}

/// Materials discovered during color grouping.
///
/// Names are `Material_<n>` with `n` assigned in discovery order;
/// `index_map` mirrors that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialTable {
    pub materials: FxHashMap<String, Material>,
    pub index_map: FxHashMap<String, u32>,
}

impl MaterialTable {
    /// Number of distinct materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

/// Renderer-ready triangle mesh.
///
/// `materials` is `None` for the plain uncolored shape and `Some` for the
/// colored, material-grouped shape; downstream consumers branch on it.
/// In the grouped shape every triangle carries a `material_index`
/// referencing one table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub triangles: Vec<Triangle>,
    pub bounding_box: BoundingBox,
    pub materials: Option<MaterialTable>,
}

impl TriangleMesh {
    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh has no geometry
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
