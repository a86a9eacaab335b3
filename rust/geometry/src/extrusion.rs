// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scaffold extrusion - offsetting selected walls outward by the scaffold width
//!
//! The pipeline runs in two halves:
//!
//! 1. [`offset_selected_walls`] resolves an outward normal per wall, finds
//!    vertices shared between selected walls and moves every vertex along a
//!    per-vertex extrusion vector (plain normal, averaged normal for coplanar
//!    neighbours, mitered normal at real corners).
//! 2. [`extrude_walls`] normalizes heights so the lowest point is 0 and snaps
//!    the scaffold top edges of all walls onto a small set of shared deck
//!    levels before meshing and measuring each wall.

use std::collections::BTreeMap;

use facade_lite_core::{Point3D, Surface};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::measure::{round_half_up, ExtrudedMetrics};
use crate::mesh::{Mesh, RenderOffset};
use crate::raycast::{ensure_outward_normal, to_point};
use crate::triangulation::mesh_surface;
use crate::{Point3, Vector3};

/// Tunable constants of the extrusion engine.
///
/// The defaults are empirical values, not derived from scaffold norms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrusionConfig {
    /// Max angle (degrees) between two wall normals to treat them as coplanar
    pub coplanar_threshold_deg: f64,
    /// Below this |dot(avg, first)| the miter scale is skipped
    pub min_miter_dot: f64,
    /// Height added above the wall top for guard rail and toe board (m)
    pub guard_rail_clearance: f64,
    /// A level merges into a higher master level at most this far above it (m)
    pub level_merge_margin: f64,
    /// Vertices within this distance of the wall top snap to the wall's level (m)
    pub top_edge_snap_window: f64,
    /// Other vertices snap to the closest master level within this distance (m)
    pub master_snap_window: f64,
    /// Vertices below this height are not snapped unless near the wall top (m)
    pub min_snap_height: f64,
    /// Distance of the inside/outside probe along a candidate normal (m)
    pub outward_probe_distance: f64,
    /// Grid size used to identify shared vertices
    pub vertex_key_quantum: f64,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            coplanar_threshold_deg: 3.0,
            min_miter_dot: 0.1,
            guard_rail_clearance: 2.0,
            level_merge_margin: 1.2,
            top_edge_snap_window: 2.3,
            master_snap_window: 1.5,
            min_snap_height: 1.0,
            outward_probe_distance: 0.1,
            vertex_key_quantum: 0.001,
        }
    }
}

/// Inputs of one extrusion run. Lengths are in meters.
#[derive(Debug, Clone, Copy)]
pub struct ExtrusionRequest<'a> {
    /// All walls of the building (flattened)
    pub walls: &'a [Surface],
    pub roofs: &'a [Surface],
    pub ground: &'a [Surface],
    /// Indices into `walls`; out-of-range entries are ignored
    pub selected: &'a [i64],
    /// Scaffold width
    pub width: f64,
    /// Render offset of the building scene
    pub offset: RenderOffset,
    /// Height difference between eave and scaffold top
    pub eave_height_difference: f64,
}

/// Extruded geometry and metrics of one selected wall
#[derive(Debug, Clone)]
pub struct ExtrusionResult {
    pub geometry: Mesh,
    pub area: f64,
    pub height: f64,
    pub wall_index: usize,
}

impl ExtrusionResult {
    /// Metrics that replace the raw wall values in reports
    pub fn metrics(&self) -> ExtrudedMetrics {
        ExtrudedMetrics {
            area: self.area,
            height: self.height,
        }
    }
}

/// Selected walls moved outward, before height leveling
#[derive(Debug, Clone, Default)]
pub struct OffsetWalls {
    /// Wall indices in selection order (deduplicated)
    pub indices: Vec<usize>,
    /// Outward unit normal per wall
    pub normals: Vec<Vector3<f64>>,
    /// Offset vertices per wall, same length as the source wall
    pub vertices: Vec<Vec<Point3D>>,
}

impl OffsetWalls {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

type VertexKey = (i64, i64, i64);

#[inline]
fn vertex_key(p: &Point3D, quantum: f64) -> VertexKey {
    (
        round_half_up(p.x / quantum) as i64,
        round_half_up(p.y / quantum) as i64,
        round_half_up(p.z / quantum) as i64,
    )
}

/// Keep in-range selection indices, in order, without duplicates
pub fn valid_selection(selected: &[i64], wall_count: usize) -> Vec<usize> {
    let mut valid: Vec<usize> = Vec::with_capacity(selected.len());
    for &idx in selected {
        if idx < 0 || idx as u64 >= wall_count as u64 {
            continue;
        }
        let idx = idx as usize;
        if !valid.contains(&idx) {
            valid.push(idx);
        }
    }
    valid
}

/// Planar normal from the first three vertices, `(0, 1, 0)` if degenerate
pub fn wall_normal(vertices: &[Point3D]) -> Vector3<f64> {
    let fallback = Vector3::new(0.0, 1.0, 0.0);
    if vertices.len() < 3 {
        return fallback;
    }

    let p0 = to_point(&vertices[0]);
    let e1 = to_point(&vertices[1]) - p0;
    let e2 = to_point(&vertices[2]) - p0;

    e2.cross(&e1).try_normalize(1e-12).unwrap_or(fallback)
}

/// Average of all vertices
pub fn wall_center(vertices: &[Point3D]) -> Point3<f64> {
    if vertices.is_empty() {
        return Point3::origin();
    }

    let sum = vertices
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, v| acc + Vector3::new(v.x, v.y, v.z));
    Point3::from(sum / vertices.len() as f64)
}

/// True if the (unsigned) angle between two normals is below `threshold_deg`
pub fn normals_coplanar(n1: &Vector3<f64>, n2: &Vector3<f64>, threshold_deg: f64) -> bool {
    let dot = n1.dot(n2).abs().clamp(-1.0, 1.0);
    dot.acos() < threshold_deg.to_radians()
}

/// Extrusion vector for a vertex shared by walls with the given normals.
///
/// A single normal is scaled by `width`. Mutually coplanar normals are
/// averaged. At real corners the averaged direction is lengthened by
/// `width / dot(avg, first)` so each face keeps its perpendicular distance.
pub fn extrusion_vector(
    normals: &[Vector3<f64>],
    width: f64,
    config: &ExtrusionConfig,
) -> Vector3<f64> {
    let first = match normals {
        [] => return Vector3::zeros(),
        [single] => return single * width,
        [first, ..] => first,
    };

    let avg = normals
        .iter()
        .fold(Vector3::<f64>::zeros(), |acc, n| acc + n)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::zeros);

    let all_coplanar = normals
        .iter()
        .all(|n| normals_coplanar(n, first, config.coplanar_threshold_deg));
    if all_coplanar {
        return avg * width;
    }

    let dot = avg.dot(first);
    let scale = if dot.abs() > config.min_miter_dot {
        width / dot
    } else {
        width
    };
    avg * scale
}

/// Steps 1-5 of the extrusion: validate, orient, reconcile shared vertices
/// and offset every selected wall.
pub fn offset_selected_walls(request: &ExtrusionRequest, config: &ExtrusionConfig) -> OffsetWalls {
    let indices = valid_selection(request.selected, request.walls.len());
    if indices.len() < request.selected.len() {
        debug!(
            requested = request.selected.len(),
            kept = indices.len(),
            "dropped invalid or duplicate wall selections"
        );
    }
    if indices.is_empty() {
        return OffsetWalls::default();
    }

    let normals: Vec<Vector3<f64>> = indices
        .iter()
        .map(|&idx| {
            let vertices = &request.walls[idx].vertices;
            ensure_outward_normal(
                &wall_normal(vertices),
                &wall_center(vertices),
                config.outward_probe_distance,
                request.walls,
                request.roofs,
                request.ground,
            )
        })
        .collect();

    // Vertex key -> slots (positions in `indices`) of the walls containing it
    let mut shared: FxHashMap<VertexKey, SmallVec<[usize; 4]>> = FxHashMap::default();
    for (slot, &idx) in indices.iter().enumerate() {
        for v in &request.walls[idx].vertices {
            let walls = shared.entry(vertex_key(v, config.vertex_key_quantum)).or_default();
            if walls.last() != Some(&slot) {
                walls.push(slot);
            }
        }
    }

    let extrusions: FxHashMap<VertexKey, Vector3<f64>> = shared
        .iter()
        .map(|(key, slots)| {
            let vertex_normals: SmallVec<[Vector3<f64>; 4]> =
                slots.iter().map(|&s| normals[s]).collect();
            (*key, extrusion_vector(&vertex_normals, request.width, config))
        })
        .collect();

    let vertices = indices
        .iter()
        .map(|&idx| {
            request.walls[idx]
                .vertices
                .iter()
                .map(|v| {
                    let e = extrusions
                        .get(&vertex_key(v, config.vertex_key_quantum))
                        .copied()
                        .unwrap_or_else(Vector3::zeros);
                    Point3D::new(v.x + e.x, v.y + e.y, v.z + e.z)
                })
                .collect()
        })
        .collect();

    OffsetWalls {
        indices,
        normals,
        vertices,
    }
}

/// Deck levels shared by all walls of one extrusion run.
///
/// Candidate levels are whole meters. Walking them from the top down, each
/// level either joins the first existing master at most `margin` above it
/// or becomes a new master.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelPlan {
    /// Master levels, highest first
    pub active_levels: Vec<i64>,
    mapping: BTreeMap<i64, i64>,
}

impl LevelPlan {
    pub fn from_targets<I>(targets: I, margin: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let candidates: BTreeMap<i64, ()> = targets
            .into_iter()
            .map(|t| (round_half_up(t) as i64, ()))
            .collect();

        let mut plan = Self::default();
        for &level in candidates.keys().rev() {
            let master = plan.active_levels.iter().copied().find(|&m| {
                let diff = (m - level) as f64;
                (0.0..=margin).contains(&diff)
            });

            match master {
                Some(m) => {
                    plan.mapping.insert(level, m);
                }
                None => {
                    plan.active_levels.push(level);
                    plan.mapping.insert(level, level);
                }
            }
        }
        plan
    }

    /// Master level for a raw target height
    pub fn master_for(&self, target: f64) -> f64 {
        let rounded = round_half_up(target) as i64;
        self.mapping.get(&rounded).copied().unwrap_or(rounded) as f64
    }

    /// Closest master level within `window` of `z` (ties go to the higher one)
    pub fn closest_master(&self, z: f64, window: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for &m in &self.active_levels {
            let m = m as f64;
            let diff = (m - z).abs();
            if diff <= window && best.map_or(true, |(_, d)| diff < d) {
                best = Some((m, diff));
            }
        }
        best.map(|(m, _)| m)
    }
}

/// Final height of one normalized vertex
fn snap_height(
    z: f64,
    wall_max_z: f64,
    wall_level: f64,
    plan: &LevelPlan,
    config: &ExtrusionConfig,
) -> f64 {
    if (z - wall_max_z).abs() <= config.top_edge_snap_window {
        wall_level
    } else if z >= config.min_snap_height {
        plan.closest_master(z, config.master_snap_window)
            .unwrap_or_else(|| round_half_up(z))
    } else {
        z
    }
}

fn max_z(vertices: &[Point3D]) -> f64 {
    vertices.iter().map(|v| v.z).fold(f64::NEG_INFINITY, f64::max)
}

/// Area from the length of the summed fan cross products
fn vector_area(vertices: &[Point3D]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let p0 = to_point(&vertices[0]);
    let total = vertices[1..]
        .windows(2)
        .fold(Vector3::<f64>::zeros(), |acc, w| {
            acc + (to_point(&w[0]) - p0).cross(&(to_point(&w[1]) - p0))
        });
    0.5 * total.norm()
}

/// Compute the scaffold geometry for every valid selected wall.
///
/// Returns one result per valid selection in selection order; an empty or
/// fully invalid selection yields an empty vector.
pub fn extrude_walls(request: &ExtrusionRequest, config: &ExtrusionConfig) -> Vec<ExtrusionResult> {
    let offset_walls = offset_selected_walls(request, config);
    if offset_walls.is_empty() {
        return Vec::new();
    }

    let originals = offset_walls
        .indices
        .iter()
        .flat_map(|&idx| request.walls[idx].vertices.iter());
    let extruded = offset_walls.vertices.iter().flatten();
    let mut global_min_z = originals
        .chain(extruded)
        .map(|v| v.z)
        .fold(f64::INFINITY, f64::min);
    if !global_min_z.is_finite() {
        global_min_z = 0.0;
    }

    let normalized: Vec<Vec<Point3D>> = offset_walls
        .vertices
        .iter()
        .map(|wall| {
            wall.iter()
                .map(|v| Point3D::new(v.x, v.y, v.z - global_min_z))
                .collect()
        })
        .collect();

    let wall_max: Vec<f64> = normalized.iter().map(|w| max_z(w)).collect();
    let targets: Vec<f64> = wall_max
        .iter()
        .map(|m| m - request.eave_height_difference + config.guard_rail_clearance)
        .collect();

    let plan = LevelPlan::from_targets(targets.iter().copied(), config.level_merge_margin);
    debug!(
        global_min_z,
        levels = ?plan.active_levels,
        walls = offset_walls.len(),
        "leveled scaffold tops"
    );

    let mesh_offset = request.offset.shifted_z(-global_min_z);

    offset_walls
        .indices
        .iter()
        .zip(normalized)
        .zip(wall_max.iter().zip(&targets))
        .map(|((&wall_index, vertices), (&wall_max_z, &target))| {
            let wall_level = plan.master_for(target);
            let adjusted: Vec<Point3D> = vertices
                .iter()
                .map(|v| Point3D {
                    z: snap_height(v.z, wall_max_z, wall_level, &plan, config),
                    ..*v
                })
                .collect();

            let (min, max) = adjusted
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v.z), hi.max(v.z))
                });
            let height = if adjusted.is_empty() { 0.0 } else { max - min };

            ExtrusionResult {
                geometry: mesh_surface(&adjusted, &mesh_offset),
                area: vector_area(&adjusted),
                height,
                wall_index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall(points: &[(f64, f64, f64)]) -> Surface {
        Surface::new(points.iter().map(|&(x, y, z)| Point3D::new(x, y, z)).collect())
    }

    #[test]
    fn test_valid_selection() {
        assert_eq!(valid_selection(&[-1, 9999, 2], 3), vec![2]);
        assert_eq!(valid_selection(&[1, 0, 1], 3), vec![1, 0]);
        assert!(valid_selection(&[], 3).is_empty());
        assert!(valid_selection(&[0], 0).is_empty());
    }

    #[test]
    fn test_wall_normal() {
        let w = wall(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0)]);
        assert_relative_eq!(wall_normal(&w.vertices), Vector3::new(0.0, 1.0, 0.0));

        let degenerate = wall(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        assert_eq!(wall_normal(&degenerate.vertices), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(wall_normal(&[]), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_wall_center() {
        let w = wall(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 2.0), (0.0, 0.0, 2.0)]);
        assert_eq!(wall_center(&w.vertices), Point3::new(2.0, 0.0, 1.0));
    }

    #[test]
    fn test_normals_coplanar() {
        let a = Vector3::new(0.0, 1.0, 0.0);
        let b = Vector3::new(2.0f64.to_radians().sin(), 2.0f64.to_radians().cos(), 0.0);
        let c = Vector3::new(1.0, 0.0, 0.0);
        assert!(normals_coplanar(&a, &b, 3.0));
        assert!(normals_coplanar(&a, &-a, 3.0));
        assert!(!normals_coplanar(&a, &c, 3.0));
    }

    #[test]
    fn test_extrusion_vector_miter_and_floor() {
        let config = ExtrusionConfig::default();
        let a = Vector3::new(0.0, -1.0, 0.0);
        let b = Vector3::new(1.0, 0.0, 0.0);

        let v = extrusion_vector(&[a, b], 0.5, &config);
        assert_relative_eq!(v, Vector3::new(0.5, -0.5, 0.0), epsilon = 1e-12);

        // Nearly opposite faces: the miter would explode, plain width is used
        let c = Vector3::new(0.2, 1.0, 0.0).normalize();
        let v = extrusion_vector(&[a, c], 0.5, &config);
        assert!(v.norm() <= 0.5 + 1e-12);
    }

    #[test]
    fn test_level_plan_merges_downward() {
        let plan = LevelPlan::from_targets([9.2, 8.4, 5.0, 10.0], 1.2);
        // Candidates 10, 9, 8, 5: 9 joins 10, 8 starts a new master
        assert_eq!(plan.active_levels, vec![10, 8, 5]);
        assert_eq!(plan.master_for(9.2), 10.0);
        assert_eq!(plan.master_for(8.4), 8.0);
        assert_eq!(plan.master_for(5.0), 5.0);
        // Unknown targets fall back to their own rounded value
        assert_eq!(plan.master_for(20.3), 20.0);
    }

    #[test]
    fn test_closest_master() {
        let plan = LevelPlan::from_targets([10.0, 7.0], 1.2);
        assert_eq!(plan.closest_master(7.9, 1.5), Some(7.0));
        assert_eq!(plan.closest_master(8.5, 1.5), Some(10.0));
        assert_eq!(plan.closest_master(3.0, 1.5), None);
    }

    #[test]
    fn test_snap_height_branches() {
        let config = ExtrusionConfig::default();
        let plan = LevelPlan::from_targets([8.0], 1.2);

        // Near the wall top
        assert_eq!(snap_height(5.5, 6.0, 8.0, &plan, &config), 8.0);
        // Far from the top, close to a master
        assert_eq!(snap_height(1.6, 12.0, 14.0, &plan, &config), 2.0);
        assert_eq!(snap_height(7.0, 12.0, 14.0, &plan, &config), 8.0);
        // Low vertices stay
        assert_eq!(snap_height(0.4, 6.0, 8.0, &plan, &config), 0.4);
    }

    #[test]
    fn test_vector_area_rectangle() {
        let w = wall(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0), (0.0, 0.0, 3.0)]);
        assert_relative_eq!(vector_area(&w.vertices), 12.0);
    }

    #[test]
    fn test_empty_selection() {
        let walls = vec![wall(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 0.0, 1.0)])];
        let request = ExtrusionRequest {
            walls: &walls,
            roofs: &[],
            ground: &[],
            selected: &[],
            width: 0.7,
            offset: RenderOffset::default(),
            eave_height_difference: 0.0,
        };
        assert!(extrude_walls(&request, &ExtrusionConfig::default()).is_empty());

        let request = ExtrusionRequest {
            selected: &[5, -3],
            ..request
        };
        assert!(extrude_walls(&request, &ExtrusionConfig::default()).is_empty());
    }
}
