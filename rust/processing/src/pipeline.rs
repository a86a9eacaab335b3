// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building scene pipeline.
//!
//! Runs every stage from scratch on each call: render offset, base meshes,
//! neighbour grouping, markers, edge dimensions, scaffold extrusion and the
//! wall metrics. Nothing is cached between calls.

use facade_lite_core::{BuildingData, Surface};
use facade_lite_geometry::extrusion::valid_selection;
use facade_lite_geometry::{
    edge_dimensions, extrude_walls, ground_perimeter, group_surfaces, mesh_surface, walls_info,
    ExtrudedMetrics, ExtrusionConfig, ExtrusionRequest, RenderOffset, GROUPING_EPSILON,
    MIN_ANNOTATED_EDGE,
};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::types::{
    BuildingGroup, DimensionLabel, ScaffoldParams, ScaffoldWall, Scene, SceneStats,
    SurfaceKind, SurfaceMesh, WallCenterMarker, WallMetrics,
};

/// Height of facade markers above their wall-center point (m)
pub const MARKER_LIFT: f64 = 1.0;

/// Pipeline switches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Emit edge dimension labels for walls, roofs and ground
    pub dimensions: bool,
    /// Edges up to this length are not labelled (m)
    pub min_dimension_length: f64,
    pub extrusion: ExtrusionConfig,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            dimensions: true,
            min_dimension_length: MIN_ANNOTATED_EDGE,
            extrusion: ExtrusionConfig::default(),
        }
    }
}

/// Render offset of a building: bounding-box center of walls, roofs,
/// neighbours and surrounding buildings. Ground is not included.
pub fn scene_offset(building: &BuildingData, walls: &[Surface]) -> RenderOffset {
    let points = walls
        .iter()
        .chain(&building.roofs)
        .chain(&building.neighbours)
        .chain(&building.surrounding_buildings)
        .flat_map(|s| s.vertices.iter());

    RenderOffset::from_bounds_center(points)
}

fn mesh_role(
    kind: SurfaceKind,
    surfaces: &[Surface],
    offset: &RenderOffset,
    out: &mut Vec<SurfaceMesh>,
    skipped: &mut usize,
) {
    for (index, surface) in surfaces.iter().enumerate() {
        let mesh = mesh_surface(&surface.vertices, offset);
        if mesh.is_empty() {
            tracing::debug!(?kind, index, vertices = surface.len(), "Skipping degenerate surface");
            *skipped += 1;
            continue;
        }
        out.push(SurfaceMesh::new(kind, index, mesh));
    }
}

fn label_role(
    kind: SurfaceKind,
    surfaces: &[Surface],
    offset: &RenderOffset,
    min_length: f64,
    out: &mut Vec<DimensionLabel>,
) {
    for (index, surface) in surfaces.iter().enumerate() {
        out.extend(
            edge_dimensions(&surface.vertices, offset, min_length)
                .iter()
                .map(|edge| DimensionLabel::new(kind, index, edge)),
        );
    }
}

fn building_groups(kind: SurfaceKind, surfaces: &[Surface]) -> Vec<BuildingGroup> {
    group_surfaces(surfaces, GROUPING_EPSILON)
        .into_iter()
        .enumerate()
        .map(|(group_index, surfaces)| BuildingGroup {
            kind,
            group_index,
            surfaces,
        })
        .collect()
}

/// Process a decoded building for one set of user controls.
pub fn process_building(
    building: &BuildingData,
    params: &ScaffoldParams,
    options: &SceneOptions,
) -> Result<Scene> {
    params.validate()?;
    let start = std::time::Instant::now();

    let augmented = building.all_walls();
    let walls: Vec<Surface> = augmented.iter().map(|w| w.surface.clone()).collect();
    let offset = scene_offset(building, &walls);

    tracing::info!(
        walls = walls.len(),
        roofs = building.roofs.len(),
        ground = building.ground.len(),
        neighbours = building.neighbours.len(),
        surrounding = building.surrounding_buildings.len(),
        selected = params.selected_walls.len(),
        "Processing building"
    );

    // Base meshes
    let mut meshes = Vec::new();
    let mut skipped = 0usize;
    mesh_role(SurfaceKind::Ground, &building.ground, &offset, &mut meshes, &mut skipped);
    mesh_role(
        SurfaceKind::SurroundingBuilding,
        &building.surrounding_buildings,
        &offset,
        &mut meshes,
        &mut skipped,
    );
    mesh_role(SurfaceKind::Neighbour, &building.neighbours, &offset, &mut meshes, &mut skipped);
    mesh_role(SurfaceKind::Wall, &walls, &offset, &mut meshes, &mut skipped);
    mesh_role(SurfaceKind::Roof, &building.roofs, &offset, &mut meshes, &mut skipped);

    let mut groups = building_groups(SurfaceKind::Neighbour, &building.neighbours);
    groups.extend(building_groups(
        SurfaceKind::SurroundingBuilding,
        &building.surrounding_buildings,
    ));

    // Markers only for directions with at least one selected wall
    let selection = valid_selection(&params.selected_walls, walls.len());
    let wall_centers: Vec<WallCenterMarker> = building
        .wall_centers_for_selection(&selection)
        .into_iter()
        .map(|c| {
            let p = offset.to_render(&c.center);
            let direction = c.direction();
            WallCenterMarker {
                index: c.index,
                facade_id: c.facade_id(),
                direction,
                label: direction.display_abbreviation().to_string(),
                position: [p.x, p.y + MARKER_LIFT, p.z],
            }
        })
        .collect();

    let mut dimensions = Vec::new();
    if options.dimensions {
        let min = options.min_dimension_length;
        label_role(SurfaceKind::Wall, &walls, &offset, min, &mut dimensions);
        label_role(SurfaceKind::Roof, &building.roofs, &offset, min, &mut dimensions);
        label_role(SurfaceKind::Ground, &building.ground, &offset, min, &mut dimensions);
    }

    // Scaffold
    let results = if params.should_extrude() {
        let request = ExtrusionRequest {
            walls: &walls,
            roofs: &building.roofs,
            ground: &building.ground,
            selected: &params.selected_walls,
            width: params.width_m(),
            offset,
            eave_height_difference: params.eave_height_difference_m(),
        };
        extrude_walls(&request, &options.extrusion)
    } else {
        Vec::new()
    };

    let extruded: Option<FxHashMap<usize, ExtrudedMetrics>> = (!results.is_empty())
        .then(|| results.iter().map(|r| (r.wall_index, r.metrics())).collect());

    let scaffolds: Vec<ScaffoldWall> = results
        .into_iter()
        .map(|result| ScaffoldWall {
            wall_index: result.wall_index,
            area: result.area,
            height: result.height,
            mesh: SurfaceMesh::new(SurfaceKind::Scaffold, result.wall_index, result.geometry),
        })
        .collect();

    let directions: Vec<&str> = augmented.iter().map(|w| w.direction_label()).collect();

    let metrics = WallMetrics {
        walls: walls_info(&walls, extruded.as_ref(), Some(directions.as_slice())),
        ground_perimeter: ground_perimeter(&building.ground),
    };

    let all_meshes = meshes.iter().chain(scaffolds.iter().map(|s| &s.mesh));
    let (total_vertices, total_triangles, total_meshes) = all_meshes
        .fold((0, 0, 0), |(v, t, n), m| {
            (v + m.vertex_count(), t + m.triangle_count(), n + 1)
        });

    let stats = SceneStats {
        total_meshes,
        total_vertices,
        total_triangles,
        skipped_surfaces: skipped,
        process_time_ms: start.elapsed().as_millis() as u64,
    };

    tracing::info!(
        meshes = stats.total_meshes,
        triangles = stats.total_triangles,
        skipped = stats.skipped_surfaces,
        scaffolds = scaffolds.len(),
        ground_perimeter = metrics.ground_perimeter,
        time_ms = stats.process_time_ms,
        "Building processed"
    );

    Ok(Scene {
        offset,
        meshes,
        building_groups: groups,
        wall_centers,
        dimensions,
        scaffolds,
        metrics,
        stats,
    })
}

/// Decode a provider payload and process it.
pub fn process_json(json: &str, params: &ScaffoldParams, options: &SceneOptions) -> Result<Scene> {
    let building = BuildingData::from_json(json)?;
    process_building(&building, params, options)
}
