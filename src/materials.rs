// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color-keyed material grouping.
//!
//! Partitions a colored triangle set into material buckets by exact color
//! equality and assigns stable material indices in discovery order.

use crate::mesh::{BoundingBox, Material, MaterialTable, Rgba, Triangle, TriangleMesh};
use rustc_hash::FxHashMap;

/// Material color assigned to triangles that carry no color of their own
pub const DEFAULT_MATERIAL_COLOR: Rgba = Rgba::new(179, 179, 179, 1.0);

/// Group triangles into color-keyed materials.
///
/// Buckets are keyed by exact four-channel color equality, with uncolored
/// triangles forming one shared bucket. Bucket `n` (in the order buckets
/// are first encountered while walking the list, never sorted) becomes
/// `Material_<n>`; the uncolored bucket's material gets the neutral gray
/// [`DEFAULT_MATERIAL_COLOR`]. Triangles are re-emitted bucket by bucket,
/// each stamped with its bucket's index, and the bounding box is computed
/// over the full grouped set. Identically colored triangles from
/// different source segments merge into one material: material count
/// reflects distinct appearances, not segments.
pub fn group_by_color(triangles: Vec<Triangle>) -> TriangleMesh {
    let mut bucket_of: FxHashMap<Option<Rgba>, usize> = FxHashMap::default();
    let mut buckets: Vec<(Option<Rgba>, Vec<Triangle>)> = Vec::new();

    for triangle in triangles {
        let key = triangle.color;
        let index = *bucket_of.entry(key).or_insert_with(|| {
            buckets.push((key, Vec::new()));
            buckets.len() - 1
        });
        buckets[index].1.push(triangle);
    }

    let mut table = MaterialTable::default();
    let mut grouped = Vec::new();

    for (index, (key, bucket)) in buckets.into_iter().enumerate() {
        let name = format!("Material_{}", index);
        let color = key.unwrap_or(DEFAULT_MATERIAL_COLOR);

        table.index_map.insert(name.clone(), index as u32);
        table.materials.insert(
            name.clone(),
            Material {
                name,
                color,
            },
        );

        grouped.extend(bucket.into_iter().map(|mut t| {
            t.material_index = Some(index as u32);
            t
        }));
    }

    let bounding_box = BoundingBox::from_triangles(&grouped);

    TriangleMesh {
        triangles: grouped,
        bounding_box,
        materials: Some(table),
    }
}
