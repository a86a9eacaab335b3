// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Turns a provider surface (an ordered, possibly concave 3D vertex loop)
//! into a render-space triangle mesh. The loop is projected onto a local
//! 2D basis spanned by its first non-degenerate edges, triangulated with
//! earcutr and mapped back onto the original vertices.

use facade_lite_core::Point3D;
use tracing::warn;

use crate::mesh::{Mesh, RenderOffset};
use crate::{Error, Point2, Point3, Result, Vector3};

/// Tolerance for detecting a repeated closing vertex
pub const CLOSING_VERTEX_EPSILON: f64 = 1e-9;
/// Minimum distance from the origin vertex for the first basis edge
pub const MIN_EDGE_LENGTH: f64 = 1e-7;
/// Minimum squared cross-product length for a non-collinear triple
pub const MIN_CROSS_LENGTH_SQ: f64 = 1e-12;

/// Check if a polygon is strictly convex (all cross products non-zero with
/// the same sign). Collinear or repeated vertices fail the check so they go
/// through earcut, which drops them instead of fanning slivers.
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() <= 1e-10 {
            return false;
        }

        let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
        if sign == 0 {
            sign = current_sign;
        } else if sign != current_sign {
            return false;
        }
    }

    true
}

/// Simple fan triangulation from vertex 0
#[inline]
pub fn fan_triangulate(n: usize) -> Vec<usize> {
    if n < 3 {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple polygon (no holes, any winding).
/// Returns triangle indices into the input points.
#[inline]
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    // Quads go through the convexity check too: a concave quad must not be fanned
    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let indices = earcutr::earcut(&vertices, &[], 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))?;

    if indices.len() < 3 {
        return Err(Error::TriangulationError(format!(
            "earcut produced {} indices for {} points",
            indices.len(),
            n
        )));
    }

    Ok(indices)
}

/// Orthonormal in-plane basis of a polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: Point3<f64>,
    pub u_axis: Vector3<f64>,
    pub v_axis: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneBasis {
    /// Build a basis from the first usable vertices of a loop.
    ///
    /// The origin is vertex 0, `u` points at the first vertex farther than
    /// [`MIN_EDGE_LENGTH`] and the normal comes from the first vertex after
    /// that which is not collinear with the two. Fails for collapsed or fully
    /// collinear loops.
    pub fn from_points(points: &[Point3<f64>]) -> Result<Self> {
        let origin = *points
            .first()
            .ok_or_else(|| Error::DegeneratePolygon("no vertices".to_string()))?;

        let i1 = points
            .iter()
            .position(|p| (p - origin).norm() > MIN_EDGE_LENGTH)
            .ok_or_else(|| Error::DegeneratePolygon("all vertices coincide".to_string()))?;

        let e1 = points[i1] - origin;
        let normal = points[i1 + 1..]
            .iter()
            .map(|p| e1.cross(&(p - origin)))
            .find(|c| c.norm_squared() > MIN_CROSS_LENGTH_SQ)
            .ok_or_else(|| Error::DegeneratePolygon("all vertices collinear".to_string()))?
            .normalize();

        let u_axis = e1.normalize();
        let v_axis = normal.cross(&u_axis).normalize();

        Ok(Self {
            origin,
            u_axis,
            v_axis,
            normal,
        })
    }

    /// Project points into this basis
    #[inline]
    pub fn project(&self, points: &[Point3<f64>]) -> Vec<Point2<f64>> {
        project_to_2d_with_basis(points, &self.u_axis, &self.v_axis, &self.origin)
    }
}

/// Project 3D points using an existing coordinate system
#[inline]
pub fn project_to_2d_with_basis(
    points_3d: &[Point3<f64>],
    u_axis: &Vector3<f64>,
    v_axis: &Vector3<f64>,
    origin: &Point3<f64>,
) -> Vec<Point2<f64>> {
    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(u_axis), v.dot(v_axis))
        })
        .collect()
}

/// Drop a repeated closing vertex (first == last within 1e-9 on every axis)
#[inline]
pub fn strip_closing_vertex(vertices: &[Point3D]) -> &[Point3D] {
    match (vertices.first(), vertices.last()) {
        (Some(first), Some(last))
            if vertices.len() > 1 && first.approx_eq(last, CLOSING_VERTEX_EPSILON) =>
        {
            &vertices[..vertices.len() - 1]
        }
        _ => vertices,
    }
}

/// Triangulate an ordered 3D loop, returning indices into `points`.
///
/// Degenerate loops (fewer than 3 points, coincident or collinear points)
/// yield no triangles. If earcut fails on a valid plane a fan from vertex 0
/// is used instead.
pub fn triangulate_loop(points: &[Point3<f64>]) -> Vec<usize> {
    if points.len() < 3 {
        return Vec::new();
    }

    let basis = match PlaneBasis::from_points(points) {
        Ok(basis) => basis,
        Err(_) => return Vec::new(),
    };

    let flat = basis.project(points);
    match triangulate_polygon(&flat) {
        Ok(indices) => indices,
        Err(e) => {
            warn!(vertices = points.len(), error = %e, "falling back to fan triangulation");
            fan_triangulate(points.len())
        }
    }
}

/// Build a render-space mesh for one surface.
///
/// Positions are the surface vertices (closing duplicate removed) mapped
/// through `offset`; normals are recomputed from the triangles.
pub fn mesh_surface(vertices: &[Point3D], offset: &RenderOffset) -> Mesh {
    let verts = strip_closing_vertex(vertices);
    if verts.len() < 3 {
        return Mesh::new();
    }

    let points: Vec<Point3<f64>> = verts.iter().map(|v| offset.to_render(v)).collect();
    let indices = triangulate_loop(&points);
    if indices.is_empty() {
        return Mesh::new();
    }

    let mut mesh = Mesh::with_capacity(points.len(), indices.len());
    for p in &points {
        mesh.add_position(*p);
    }
    for tri in indices.chunks_exact(3) {
        mesh.add_triangle(tri[0] as u32, tri[1] as u32, tri[2] as u32);
    }
    mesh.compute_normals();
    mesh
}
