// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use facade_lite_core::Point3D;
use nalgebra::{Point3, Vector3};

/// Origin shift applied when moving provider coordinates into render space.
///
/// Provider data is Z-up; render space is Y-up, so the shifted Y and Z
/// components are swapped: `(x - ox, z - oz, y - oy)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderOffset {
    /// X offset (subtracted from all X coordinates)
    pub x: f64,
    /// Y offset (subtracted from all provider Y coordinates)
    pub y: f64,
    /// Z offset (subtracted from all provider Z coordinates)
    pub z: f64,
}

impl RenderOffset {
    /// Create a new render offset
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Center of the axis-aligned bounding box of `points`, or zero if empty
    pub fn from_bounds_center<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point3D>,
    {
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        let mut any = false;

        for p in points {
            any = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        if !any {
            return Self::default();
        }

        Self {
            x: (min.x + max.x) / 2.0,
            y: (min.y + max.y) / 2.0,
            z: (min.z + max.z) / 2.0,
        }
    }

    /// Same offset with its Z component moved by `dz`
    #[inline]
    pub fn shifted_z(&self, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            ..*self
        }
    }

    /// Map a provider point into render space
    #[inline]
    pub fn to_render(&self, p: &Point3D) -> Point3<f64> {
        Point3::new(p.x - self.x, p.z - self.z, p.y - self.y)
    }

    /// Check if offset is zero (no shifting needed)
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

/// Bounding sphere of a mesh (center of the bounding box, farthest-vertex radius)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingSphere {
    pub center: [f32; 3],
    pub radius: f32,
}

/// Triangle mesh in render space
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Add a vertex position. Normals are filled in by [`Mesh::compute_normals`].
    #[inline]
    pub fn add_position(&mut self, position: Point3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    fn position(&self, i: usize) -> Point3<f64> {
        Point3::new(
            self.positions[i * 3] as f64,
            self.positions[i * 3 + 1] as f64,
            self.positions[i * 3 + 2] as f64,
        )
    }

    /// Recompute smooth per-vertex normals from the triangles.
    ///
    /// Face normals are accumulated unnormalized (area weighted) and each
    /// vertex normal is normalized afterwards. Vertices not referenced by any
    /// triangle get a zero normal.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.vertex_count();
        let mut normals = vec![Vector3::<f64>::zeros(); vertex_count];

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let v0 = self.position(i0);
            let edge1 = self.position(i1) - v0;
            let edge2 = self.position(i2) - v0;
            let normal = edge1.cross(&edge2);

            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        self.normals.clear();
        self.normals.reserve(vertex_count * 3);
        for n in normals {
            let n = n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
            self.normals.push(n.x as f32);
            self.normals.push(n.y as f32);
            self.normals.push(n.z as f32);
        }
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Bounding sphere around all positions, `None` for an empty mesh
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        if self.is_empty() {
            return None;
        }

        let (min, max) = self.bounds();
        let center = nalgebra::center(&min, &max);
        let radius_sq = self
            .positions
            .chunks_exact(3)
            .map(|c| (Point3::new(c[0], c[1], c[2]) - center).norm_squared())
            .fold(0.0f32, f32::max);

        Some(BoundingSphere {
            center: [center.x, center.y, center.z],
            radius: radius_sq.sqrt(),
        })
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
