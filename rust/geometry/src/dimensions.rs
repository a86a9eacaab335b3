// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge length annotations in render space

use facade_lite_core::Point3D;

use crate::mesh::RenderOffset;
use crate::Point3;

/// Edges shorter than this are not annotated (m)
pub const MIN_ANNOTATED_EDGE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDimension {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub midpoint: Point3<f64>,
    pub length: f64,
}

impl EdgeDimension {
    /// Display label, e.g. `"4.00m"`
    pub fn label(&self) -> String {
        format!("{:.2}m", self.length)
    }
}

/// Edges of a loop (closing edge included) longer than `min_length`
pub fn edge_dimensions(
    vertices: &[Point3D],
    offset: &RenderOffset,
    min_length: f64,
) -> Vec<EdgeDimension> {
    if vertices.len() < 2 {
        return Vec::new();
    }

    let n = vertices.len();
    (0..n)
        .filter_map(|i| {
            let start = offset.to_render(&vertices[i]);
            let end = offset.to_render(&vertices[(i + 1) % n]);
            let length = (end - start).norm();
            (length > min_length).then(|| EdgeDimension {
                start,
                end,
                midpoint: nalgebra::center(&start, &end),
                length,
            })
        })
        .collect()
}
