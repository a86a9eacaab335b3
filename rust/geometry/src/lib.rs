//! Facade-Lite Geometry Processing
//!
//! Surface meshing, scaffold extrusion and measurement for LOD2 buildings,
//! using earcutr triangulation and nalgebra vector math.
//!
//! Every operation here is pure and degrades gracefully: malformed
//! surfaces produce empty meshes, fallback normals or skipped walls instead of
//! errors, so one bad surface never stops the rest of a building.

pub mod dimensions;
pub mod error;
pub mod extrusion;
pub mod grouping;
pub mod measure;
pub mod mesh;
pub mod raycast;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};

pub use dimensions::{edge_dimensions, EdgeDimension, MIN_ANNOTATED_EDGE};
pub use error::{Error, Result};
pub use extrusion::{
    extrude_walls, offset_selected_walls, ExtrusionConfig, ExtrusionRequest, ExtrusionResult,
    LevelPlan, OffsetWalls,
};
pub use grouping::{group_surfaces, GROUPING_EPSILON};
pub use measure::{
    ground_perimeter, polygon_area_3d, polygon_perimeter, wall_height, wall_width, walls_info,
    ExtrudedMetrics, WallInfo,
};
pub use mesh::{BoundingSphere, Mesh, RenderOffset};
pub use raycast::{ensure_outward_normal, is_point_inside_mesh, ray_triangle_intersect};
pub use triangulation::{mesh_surface, triangulate_loop, triangulate_polygon};
