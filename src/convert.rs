// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion pipeline and result cache.
//!
//! `convert_result` is the pure, synchronous core: importer result in,
//! renderer-ready mesh out. `MeshConverter` wraps it with the external
//! collaborators (byte fetch, geometry-kernel import) and memoizes the
//! output per (source identity, transform config).

use crate::error::Result;
use crate::import::{read_segments, ImportResult};
use crate::materials::group_by_color;
use crate::mesh::{BoundingBox, TriangleMesh};
use crate::transform::{transform_triangles, TransformConfig};
use crate::triangles::extract_triangles;
use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// Retrieves raw model bytes for a source identity.
///
/// Implementations map retrieval failures (non-2xx status or equivalent)
/// to [`crate::Error::SourceFetchFailed`]; this crate surfaces them
/// without retrying.
#[allow(async_fn_in_trait)]
pub trait SourceFetcher {
    async fn fetch(&self, source: &str) -> Result<Vec<u8>>;
}

/// Invokes the external geometry kernel on raw model bytes.
///
/// Implementations map kernel-level failures to
/// [`crate::Error::GeometryImportFailed`].
pub trait GeometryImporter {
    fn import(&self, data: &[u8]) -> Result<ImportResult>;
}

/// Run the full conversion pipeline on an importer result.
///
/// Resolves the transform config first so an unknown preset fails before
/// any computation, then validates segments, extracts triangles with
/// resolved colors, flattens all segments, remaps the coordinate frame
/// once over the combined list, and finally either groups by color (when
/// any triangle carries one) or produces the plain uncolored mesh.
pub fn convert_result(
    result: ImportResult,
    transform: Option<&TransformConfig>,
) -> Result<TriangleMesh> {
    let default_config = TransformConfig::default();
    let remap = transform.unwrap_or(&default_config).resolve()?;

    let segments = read_segments(result)?;

    let mut triangles = Vec::new();
    for segment in &segments {
        triangles.extend(extract_triangles(segment));
    }

    let triangles = transform_triangles(triangles, &remap);

    let has_colors = triangles.iter().any(|t| t.color.is_some());
    let mesh = if has_colors {
        group_by_color(triangles)
    } else {
        let bounding_box = BoundingBox::from_triangles(&triangles);
        TriangleMesh {
            triangles,
            bounding_box,
            materials: None,
        }
    };

    tracing::info!(
        triangles = mesh.triangle_count(),
        materials = mesh.materials.as_ref().map(|m| m.len()).unwrap_or(0),
        "converted geometry result"
    );

    Ok(mesh)
}

/// Converts fetched solid models into renderer-ready meshes, caching one
/// result per unique (source identity, transform config) pair.
///
/// The cache is an explicit member of this value rather than ambient
/// global state; it never evicts and has no TTL, so a long-lived process
/// feeding it many distinct inputs grows without bound. Lookup, compute,
/// and store are individually safe under concurrent callers but not
/// atomic as a sequence: two concurrent misses on the same key both run
/// the pipeline and the last write wins. The results are value-identical,
/// so this wastes work without corrupting anything.
pub struct MeshConverter<F, I> {
    fetcher: F,
    importer: I,
    cache: RwLock<FxHashMap<String, Arc<TriangleMesh>>>,
}

impl<F: SourceFetcher, I: GeometryImporter> MeshConverter<F, I> {
    /// Create a converter with an empty cache
    pub fn new(fetcher: F, importer: I) -> Self {
        Self {
            fetcher,
            importer,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Convert a source into a mesh, reusing a cached result when one
    /// exists for the same source and transform config.
    ///
    /// On a hit the stored mesh is returned without re-running any stage,
    /// including the fetch and import collaborators. Callers receive a
    /// shared reference; mutating the mesh is not a supported contract.
    pub async fn convert(
        &self,
        source: &str,
        transform: Option<&TransformConfig>,
    ) -> Result<Arc<TriangleMesh>> {
        // Bad configs are caller errors; fail before touching collaborators.
        if let Some(config) = transform {
            config.resolve()?;
        }

        let key = cache_key(source, transform);

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(mesh) = cache.get(&key) {
                tracing::debug!(key = %key, "conversion cache hit");
                return Ok(Arc::clone(mesh));
            }
        }

        let data = self.fetcher.fetch(source).await?;
        let result = self.importer.import(&data)?;
        let mesh = Arc::new(convert_result(result, transform)?);

        {
            let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
            cache.insert(key.clone(), Arc::clone(&mesh));
        }
        tracing::debug!(key = %key, triangles = mesh.triangle_count(), "cached conversion");

        Ok(mesh)
    }

    /// Discard every cached entry
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// Number of cached conversions
    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Build the cache key: normalized source identity plus the deterministic
/// serialization of the transform config. No config serializes as `{}`,
/// which is a distinct key from any explicit config.
fn cache_key(source: &str, transform: Option<&TransformConfig>) -> String {
    let config = match transform {
        Some(config) => {
            serde_json::to_string(config).unwrap_or_else(|_| format!("{:?}", config))
        }
        None => "{}".to_string(),
    };
    format!("{}:{}", source, config)
}
