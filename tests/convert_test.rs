// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end conversion and cache tests against fake collaborators.

use approx::assert_relative_eq;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use step_mesh::import::{RawAttributes, RawFloatArray, RawIndexArray, RawSegment};
use step_mesh::{
    Error, FaceColorRange, GeometryImporter, ImportResult, MeshConverter, Result, Rgba,
    SourceFetcher, TransformConfig, DEFAULT_MATERIAL_COLOR,
};

/// In-memory byte store standing in for the network/filesystem fetch
struct FakeFetcher {
    files: FxHashMap<String, Vec<u8>>,
    calls: Arc<AtomicUsize>,
}

impl FakeFetcher {
    fn new(files: FxHashMap<String, Vec<u8>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                files,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(source)
            .cloned()
            .ok_or_else(|| Error::SourceFetchFailed(format!("404 for {}", source)))
    }
}

/// Importer standing in for the geometry kernel: parses the JSON contract
struct JsonImporter {
    calls: Arc<AtomicUsize>,
}

impl JsonImporter {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl GeometryImporter for JsonImporter {
    fn import(&self, data: &[u8]) -> Result<ImportResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        serde_json::from_slice(data).map_err(|e| Error::GeometryImportFailed(e.to_string()))
    }
}

fn segment(
    positions: Vec<f64>,
    indices: Vec<u32>,
    brep_faces: Vec<FaceColorRange>,
    color: Option<[f64; 3]>,
) -> RawSegment {
    RawSegment {
        attributes: RawAttributes {
            position: RawFloatArray { array: positions },
            normal: None,
        },
        index: RawIndexArray { array: indices },
        brep_faces,
        color,
    }
}

/// One Z-up triangle at (0,0,0), (1,0,0), (0,1,0)
fn unit_triangle(brep_faces: Vec<FaceColorRange>, color: Option<[f64; 3]>) -> RawSegment {
    segment(
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        vec![0, 1, 2],
        brep_faces,
        color,
    )
}

fn converter_for(
    results: Vec<(&str, ImportResult)>,
) -> (
    MeshConverter<FakeFetcher, JsonImporter>,
    Arc<AtomicUsize>,
    Arc<AtomicUsize>,
) {
    let mut files = FxHashMap::default();
    for (source, result) in results {
        files.insert(
            source.to_string(),
            serde_json::to_vec(&result).expect("fixture serializes"),
        );
    }
    let (fetcher, fetches) = FakeFetcher::new(files);
    let (importer, imports) = JsonImporter::new();
    (MeshConverter::new(fetcher, importer), fetches, imports)
}

fn range(first: u32, last: u32, color: [f64; 3]) -> FaceColorRange {
    FaceColorRange {
        first,
        last,
        color: Some(color),
    }
}

#[tokio::test]
async fn empty_result_yields_empty_mesh_with_origin_bounds() {
    let result = ImportResult {
        success: true,
        meshes: vec![],
    };
    let (converter, _, _) = converter_for(vec![("empty.step", result)]);

    let mesh = converter.convert("empty.step", None).await.unwrap();
    assert!(mesh.is_empty());
    assert!(mesh.materials.is_none());
    assert_eq!(mesh.bounding_box.min, step_mesh::Point3::origin());
    assert_eq!(mesh.bounding_box.max, step_mesh::Point3::origin());
}

#[tokio::test]
async fn uncolored_triangle_gets_synthesized_normal_and_default_remap() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], None)],
    };
    let (converter, _, _) = converter_for(vec![("plain.step", result)]);

    let mesh = converter.convert("plain.step", None).await.unwrap();
    assert_eq!(mesh.triangle_count(), 1);
    assert!(mesh.materials.is_none());

    let t = &mesh.triangles[0];
    assert_eq!(t.color, None);
    assert_eq!(t.material_index, None);

    // Pre-transform cross product is (0,0,1); default Z_UP_TO_Y_UP maps it to (0,1,0)
    assert_relative_eq!(t.normal.x, 0.0);
    assert_relative_eq!(t.normal.y, 1.0);
    assert_relative_eq!(t.normal.z, 0.0);

    // Vertex (0,1,0) lands at (0,0,-1) in the Y-up frame
    assert_relative_eq!(t.vertices[2].x, 0.0);
    assert_relative_eq!(t.vertices[2].y, 0.0);
    assert_relative_eq!(t.vertices[2].z, -1.0);

    assert_relative_eq!(mesh.bounding_box.min.z, -1.0);
    assert_relative_eq!(mesh.bounding_box.max.x, 1.0);
}

#[tokio::test]
async fn face_range_color_produces_grouped_mesh() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![range(0, 0, [1.0, 0.0, 0.0])], None)],
    };
    let (converter, _, _) = converter_for(vec![("red.step", result)]);

    let mesh = converter.convert("red.step", None).await.unwrap();
    let table = mesh.materials.as_ref().expect("colored mesh has materials");
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.materials["Material_0"].color,
        Rgba::new(255, 0, 0, 1.0)
    );
    assert_eq!(mesh.triangles[0].color, Some(Rgba::new(255, 0, 0, 1.0)));
    assert_eq!(mesh.triangles[0].material_index, Some(0));
}

#[tokio::test]
async fn mesh_color_is_the_fallback_for_unmatched_triangles() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], Some([0.0, 1.0, 0.0]))],
    };
    let (converter, _, _) = converter_for(vec![("green.step", result)]);

    let mesh = converter.convert("green.step", None).await.unwrap();
    assert_eq!(mesh.triangles[0].color, Some(Rgba::new(0, 255, 0, 1.0)));
}

#[tokio::test]
async fn material_buckets_follow_discovery_order_with_gray_default() {
    // Four triangles in one segment: red, red, blue, uncovered
    let result = ImportResult {
        success: true,
        meshes: vec![segment(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0, 1, 2],
            vec![range(0, 1, [1.0, 0.0, 0.0]), range(2, 2, [0.0, 0.0, 1.0])],
            None,
        )],
    };
    let (converter, _, _) = converter_for(vec![("multi.step", result)]);

    let mesh = converter.convert("multi.step", None).await.unwrap();
    let table = mesh.materials.as_ref().unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.materials["Material_0"].color,
        Rgba::new(255, 0, 0, 1.0)
    );
    assert_eq!(
        table.materials["Material_1"].color,
        Rgba::new(0, 0, 255, 1.0)
    );
    assert_eq!(table.materials["Material_2"].color, DEFAULT_MATERIAL_COLOR);
    assert_eq!(table.index_map["Material_2"], 2);

    let indices: Vec<u32> = mesh
        .triangles
        .iter()
        .map(|t| t.material_index.unwrap())
        .collect();
    assert_eq!(indices, vec![0, 0, 1, 2]);
}

#[tokio::test]
async fn identically_colored_segments_share_one_material() {
    let result = ImportResult {
        success: true,
        meshes: vec![
            unit_triangle(vec![], Some([1.0, 0.0, 0.0])),
            unit_triangle(vec![], Some([1.0, 0.0, 0.0])),
        ],
    };
    let (converter, _, _) = converter_for(vec![("twin.step", result)]);

    let mesh = converter.convert("twin.step", None).await.unwrap();
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.materials.as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_conversion_hits_the_cache() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], None)],
    };
    let (converter, fetches, imports) = converter_for(vec![("cached.step", result)]);

    let first = converter.convert("cached.step", None).await.unwrap();
    let second = converter.convert("cached.step", None).await.unwrap();

    assert_eq!(*first, *second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(imports.load(Ordering::SeqCst), 1);
    assert_eq!(converter.cached_count(), 1);
}

#[tokio::test]
async fn distinct_transform_configs_convert_separately() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], None)],
    };
    let (converter, fetches, _) = converter_for(vec![("axes.step", result)]);

    let default = converter.convert("axes.step", None).await.unwrap();
    let identity = converter
        .convert(
            "axes.step",
            Some(&TransformConfig::Preset("IDENTITY".to_string())),
        )
        .await
        .unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(converter.cached_count(), 2);
    // identity keeps the Z-up vertex, default remaps it
    assert_ne!(default.triangles[0].vertices[2], identity.triangles[0].vertices[2]);
}

#[tokio::test]
async fn clear_cache_forces_a_fresh_conversion() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], None)],
    };
    let (converter, fetches, _) = converter_for(vec![("clear.step", result)]);

    converter.convert("clear.step", None).await.unwrap();
    converter.clear_cache();
    assert_eq!(converter.cached_count(), 0);

    converter.convert("clear.step", None).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_preset_fails_before_any_collaborator_runs() {
    let result = ImportResult {
        success: true,
        meshes: vec![unit_triangle(vec![], None)],
    };
    let (converter, fetches, imports) = converter_for(vec![("model.step", result)]);

    let err = converter
        .convert(
            "model.step",
            Some(&TransformConfig::Preset("W_UP_TO_Q_UP".to_string())),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownTransformPreset(_)));
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    assert_eq!(imports.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_failures_surface_unretried() {
    let (converter, fetches, _) = converter_for(vec![]);

    let err = converter.convert("missing.step", None).await.unwrap_err();
    assert!(matches!(err, Error::SourceFetchFailed(_)));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(converter.cached_count(), 0);
}

#[tokio::test]
async fn importer_failure_surfaces_and_is_not_cached() {
    let result = ImportResult {
        success: false,
        meshes: vec![],
    };
    let (converter, _, _) = converter_for(vec![("broken.step", result)]);

    let err = converter.convert("broken.step", None).await.unwrap_err();
    assert!(matches!(err, Error::GeometryImportFailed(_)));
    assert_eq!(converter.cached_count(), 0);
}
