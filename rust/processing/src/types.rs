// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable scene and metrics types.

use facade_lite_core::Direction;
use facade_lite_geometry::{BoundingSphere, EdgeDimension, Mesh, Point3, RenderOffset, WallInfo};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User controls of one scaffold run, in centimeters as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldParams {
    /// Indices into the flattened wall list
    #[serde(default)]
    pub selected_walls: Vec<i64>,
    /// Scaffold width (cm)
    pub width_cm: f64,
    /// Height difference between eave and scaffold top (cm)
    #[serde(default)]
    pub eave_height_difference_cm: f64,
}

impl ScaffoldParams {
    pub fn new(selected_walls: Vec<i64>, width_cm: f64, eave_height_difference_cm: f64) -> Self {
        Self {
            selected_walls,
            width_cm,
            eave_height_difference_cm,
        }
    }

    /// Reject values that cannot be converted to a length
    pub fn validate(&self) -> Result<()> {
        if !self.width_cm.is_finite() {
            return Err(Error::InvalidParameter {
                name: "width_cm",
                value: self.width_cm,
            });
        }
        if !self.eave_height_difference_cm.is_finite() {
            return Err(Error::InvalidParameter {
                name: "eave_height_difference_cm",
                value: self.eave_height_difference_cm,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn width_m(&self) -> f64 {
        self.width_cm / 100.0
    }

    #[inline]
    pub fn eave_height_difference_m(&self) -> f64 {
        self.eave_height_difference_cm / 100.0
    }

    /// Extrusion runs only for a positive width and a non-empty selection
    pub fn should_extrude(&self) -> bool {
        self.width_cm > 0.0 && !self.selected_walls.is_empty()
    }
}

/// Role of a drawable surface in the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceKind {
    Wall,
    Roof,
    Ground,
    Neighbour,
    SurroundingBuilding,
    Scaffold,
}

/// Render-space mesh of one surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceMesh {
    pub kind: SurfaceKind,
    /// Index of the source surface within its role
    pub index: usize,
    /// Vertex positions (x, y, z triplets), Y up
    pub positions: Vec<f32>,
    /// Vertex normals (x, y, z triplets)
    pub normals: Vec<f32>,
    /// Triangle indices
    pub indices: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_sphere: Option<BoundingSphere>,
}

impl SurfaceMesh {
    pub fn new(kind: SurfaceKind, index: usize, mesh: Mesh) -> Self {
        let bounding_sphere = mesh.bounding_sphere();
        Self {
            kind,
            index,
            positions: mesh.positions,
            normals: mesh.normals,
            indices: mesh.indices,
            bounding_sphere,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }
}

/// Surfaces of one neighbouring building, for per-building selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingGroup {
    pub kind: SurfaceKind,
    pub group_index: usize,
    pub surfaces: Vec<usize>,
}

/// Facade marker floating above a wall-center point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallCenterMarker {
    /// Index in the provider's `wallCenters` array
    pub index: usize,
    pub facade_id: u8,
    pub direction: Direction,
    /// Display abbreviation, e.g. `"NO"`
    pub label: String,
    /// Render-space position
    pub position: [f64; 3],
}

/// One annotated edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionLabel {
    pub kind: SurfaceKind,
    pub index: usize,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub midpoint: [f64; 3],
    pub length: f64,
    pub label: String,
}

impl DimensionLabel {
    pub fn new(kind: SurfaceKind, index: usize, edge: &EdgeDimension) -> Self {
        Self {
            kind,
            index,
            start: to_array(&edge.start),
            end: to_array(&edge.end),
            midpoint: to_array(&edge.midpoint),
            length: edge.length,
            label: edge.label(),
        }
    }
}

/// Scaffold surface of one selected wall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldWall {
    pub wall_index: usize,
    /// Scaffold area (m²), unrounded
    pub area: f64,
    /// Scaffold height (m), unrounded
    pub height: f64,
    pub mesh: SurfaceMesh,
}

/// Payload of the `wall-info-update` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallMetrics {
    pub walls: Vec<WallInfo>,
    pub ground_perimeter: f64,
}

/// Processing statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneStats {
    pub total_meshes: usize,
    pub total_vertices: usize,
    pub total_triangles: usize,
    /// Surfaces that produced no triangles
    pub skipped_surfaces: usize,
    pub process_time_ms: u64,
}

/// Everything a viewer needs to draw and annotate one building.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Origin subtracted from provider coordinates
    pub offset: RenderOffset,
    pub meshes: Vec<SurfaceMesh>,
    pub building_groups: Vec<BuildingGroup>,
    pub wall_centers: Vec<WallCenterMarker>,
    pub dimensions: Vec<DimensionLabel>,
    pub scaffolds: Vec<ScaffoldWall>,
    pub metrics: WallMetrics,
    pub stats: SceneStats,
}

impl Scene {
    /// Meshes of one role
    pub fn meshes_of(&self, kind: SurfaceKind) -> impl Iterator<Item = &SurfaceMesh> {
        self.meshes.iter().filter(move |m| m.kind == kind)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

#[inline]
fn to_array(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}
