// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate-frame remapping.
//!
//! Imported solids arrive in the kernel's Z-up frame; renderers want Y-up.
//! A transform is either a named preset or an explicit signed axis remap
//! with a uniform scale, applied once to the flattened triangle set after
//! extraction and color resolution.

use crate::error::{Error, Result};
use crate::mesh::Triangle;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Preset applied when the caller supplies no transform config
pub const DEFAULT_PRESET: &str = "Z_UP_TO_Y_UP";

/// A source axis with sign, selecting one component of the input frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignedAxis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

impl SignedAxis {
    #[inline]
    fn pick(&self, x: f64, y: f64, z: f64) -> f64 {
        match self {
            SignedAxis::X => x,
            SignedAxis::Y => y,
            SignedAxis::Z => z,
            SignedAxis::NegX => -x,
            SignedAxis::NegY => -y,
            SignedAxis::NegZ => -z,
        }
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Explicit axis remap: each output axis selects a signed source axis.
/// `scale` is applied uniformly to positions (directions are unaffected
/// by uniform scaling and normals are not unit length to begin with).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTransform {
    pub x: SignedAxis,
    pub y: SignedAxis,
    pub z: SignedAxis,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl AxisTransform {
    /// The identity remap
    pub const IDENTITY: AxisTransform = AxisTransform {
        x: SignedAxis::X,
        y: SignedAxis::Y,
        z: SignedAxis::Z,
        scale: 1.0,
    };

    /// Z-up source frame to Y-up target frame: (x, y, z) -> (x, z, -y)
    pub const Z_UP_TO_Y_UP: AxisTransform = AxisTransform {
        x: SignedAxis::X,
        y: SignedAxis::Z,
        z: SignedAxis::NegY,
        scale: 1.0,
    };

    /// Y-up source frame to Z-up target frame: (x, y, z) -> (x, -z, y)
    pub const Y_UP_TO_Z_UP: AxisTransform = AxisTransform {
        x: SignedAxis::X,
        y: SignedAxis::NegZ,
        z: SignedAxis::Y,
        scale: 1.0,
    };

    /// Remap and scale a position
    #[inline]
    pub fn apply_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            self.x.pick(p.x, p.y, p.z) * self.scale,
            self.y.pick(p.x, p.y, p.z) * self.scale,
            self.z.pick(p.x, p.y, p.z) * self.scale,
        )
    }

    /// Remap a direction (no scaling)
    #[inline]
    pub fn apply_vector(&self, v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.x.pick(v.x, v.y, v.z),
            self.y.pick(v.x, v.y, v.z),
            self.z.pick(v.x, v.y, v.z),
        )
    }
}

/// Caller-facing transform configuration: a named preset or an explicit
/// remap. Serializes deterministically, so it doubles as the transform
/// half of the conversion cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformConfig {
    /// A named preset, e.g. `"Z_UP_TO_Y_UP"`
    Preset(String),
    /// An explicit axis remap with scale
    Explicit(AxisTransform),
}

impl TransformConfig {
    /// Resolve this config to a concrete remap.
    ///
    /// Unknown preset names fail with [`Error::UnknownTransformPreset`];
    /// the pipeline resolves the config before doing any other work so
    /// bad configs are surfaced up front.
    pub fn resolve(&self) -> Result<AxisTransform> {
        match self {
            TransformConfig::Preset(name) => match name.as_str() {
                "IDENTITY" => Ok(AxisTransform::IDENTITY),
                "Z_UP_TO_Y_UP" => Ok(AxisTransform::Z_UP_TO_Y_UP),
                "Y_UP_TO_Z_UP" => Ok(AxisTransform::Y_UP_TO_Z_UP),
                other => Err(Error::UnknownTransformPreset(other.to_string())),
            },
            TransformConfig::Explicit(transform) => Ok(*transform),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig::Preset(DEFAULT_PRESET.to_string())
    }
}

/// Apply a remap to every triangle's vertices and normal.
///
/// Order-preserving; runs in parallel over the flattened triangle list.
pub fn transform_triangles(triangles: Vec<Triangle>, transform: &AxisTransform) -> Vec<Triangle> {
    triangles
        .into_par_iter()
        .map(|t| {
            let vertices = [
                transform.apply_point(&t.vertices[0]),
                transform.apply_point(&t.vertices[1]),
                transform.apply_point(&t.vertices[2]),
            ];
            Triangle {
                vertices,
                normal: transform.apply_vector(&t.normal),
                color: t.color,
                material_index: t.material_index,
            }
        })
        .collect()
}
