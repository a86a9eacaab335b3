// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against building surfaces.
//!
//! Used to decide which side of a wall faces away from the building. The
//! inside test is an even-odd ray parity heuristic over a fan triangulation
//! of every wall, roof and ground surface; it can misclassify points whose
//! ray runs through non-manifold or duplicated faces.

use facade_lite_core::{Point3D, Surface};

use crate::{Point3, Vector3};

/// Determinant threshold below which a ray counts as parallel to a triangle
pub const RAY_PARALLEL_EPSILON: f64 = 1e-7;

/// Direction of the parity ray: +X, nudged off-axis so that rays through
/// axis-aligned edges and vertices of LOD2 data do not graze them exactly
pub const PARITY_RAY_DIRECTION: [f64; 3] = [1.0, 1e-7, 1e-8];

#[inline]
pub(crate) fn to_point(p: &Point3D) -> Point3<f64> {
    Point3::new(p.x, p.y, p.z)
}

/// Möller–Trumbore ray-triangle intersection test.
///
/// Casts a ray from `origin` along `dir` and tests if it hits the triangle
/// (v0, v1, v2) strictly in front of the origin.
pub fn ray_triangle_intersect(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    v0: &Point3<f64>,
    v1: &Point3<f64>,
    v2: &Point3<f64>,
) -> bool {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(&edge2);
    let a = edge1.dot(&h);

    if a.abs() < RAY_PARALLEL_EPSILON {
        return false; // ray parallel to triangle
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(&h);

    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&edge1);
    let v = f * dir.dot(&q);

    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    let t = f * edge2.dot(&q);
    t > RAY_PARALLEL_EPSILON
}

/// Count fan-triangle hits of a ray against a set of surfaces
fn count_crossings<'a, I>(origin: &Point3<f64>, dir: &Vector3<f64>, surfaces: I) -> usize
where
    I: IntoIterator<Item = &'a Surface>,
{
    let mut crossings = 0;

    for surface in surfaces {
        let verts = &surface.vertices;
        if verts.len() < 3 {
            continue;
        }

        let p0 = to_point(&verts[0]);
        for i in 1..verts.len() - 1 {
            let p1 = to_point(&verts[i]);
            let p2 = to_point(&verts[i + 1]);

            if ray_triangle_intersect(origin, dir, &p0, &p1, &p2) {
                crossings += 1;
            }
        }
    }

    crossings
}

/// Tests if a point lies inside the volume bounded by the building surfaces.
///
/// Odd crossing count = inside, even = outside.
pub fn is_point_inside_mesh(
    point: &Point3<f64>,
    walls: &[Surface],
    roofs: &[Surface],
    ground: &[Surface],
) -> bool {
    let [dx, dy, dz] = PARITY_RAY_DIRECTION;
    let dir = Vector3::new(dx, dy, dz);
    let crossings = count_crossings(point, &dir, walls.iter().chain(roofs).chain(ground));
    crossings % 2 == 1
}

/// Flip `normal` if a probe `probe_distance` along it lands inside the building.
///
/// Best effort: a normal whose probe lands outside is returned unchanged.
pub fn ensure_outward_normal(
    normal: &Vector3<f64>,
    wall_center: &Point3<f64>,
    probe_distance: f64,
    walls: &[Surface],
    roofs: &[Surface],
    ground: &[Surface],
) -> Vector3<f64> {
    let probe = wall_center + normal * probe_distance;

    if is_point_inside_mesh(&probe, walls, roofs, ground) {
        -normal
    } else {
        *normal
    }
}
