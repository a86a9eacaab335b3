// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facade measurements: area, perimeter, width and height of surfaces.
//!
//! Reported values are rounded to one decimal (half up).

use facade_lite_core::{Point3D, Surface};
use rustc_hash::FxHashMap;

use crate::raycast::to_point;

/// Round half up (toward +inf), matching `floor(x + 0.5)`
#[inline]
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round half up to one decimal
#[inline]
pub fn round_to_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Area of a 3D polygon as the sum of its fan triangle areas from vertex 0
pub fn polygon_area_3d(vertices: &[Point3D]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let v0 = to_point(&vertices[0]);
    let area: f64 = vertices[1..]
        .windows(2)
        .map(|w| {
            let a = to_point(&w[0]) - v0;
            let b = to_point(&w[1]) - v0;
            a.cross(&b).norm() / 2.0
        })
        .sum();

    round_to_tenth(area)
}

/// Perimeter including the closing edge back to vertex 0
pub fn polygon_perimeter(vertices: &[Point3D]) -> f64 {
    if vertices.len() < 2 {
        return 0.0;
    }

    let n = vertices.len();
    let perimeter: f64 = (0..n)
        .map(|i| vertices[i].distance_to(&vertices[(i + 1) % n]))
        .sum();

    round_to_tenth(perimeter)
}

/// Largest horizontal (X-Y) distance between any two vertices
pub fn wall_width(vertices: &[Point3D]) -> f64 {
    if vertices.len() < 2 {
        return 0.0;
    }

    let mut max_width = 0.0f64;
    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            let dx = a.x - b.x;
            let dy = a.y - b.y;
            max_width = max_width.max((dx * dx + dy * dy).sqrt());
        }
    }

    round_to_tenth(max_width)
}

/// Vertical span `max(z) - min(z)`
pub fn wall_height(vertices: &[Point3D]) -> f64 {
    if vertices.is_empty() {
        return 0.0;
    }

    let (min, max) = vertices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.z), hi.max(v.z))
        });

    round_to_tenth(max - min)
}

/// Area and height of an extruded wall, replacing the raw wall values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudedMetrics {
    pub area: f64,
    pub height: f64,
}

/// Per-wall report entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WallInfo {
    pub wall_index: usize,
    pub area: f64,
    pub max_height: f64,
    pub width: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub direction: Option<String>,
    pub vertices: Vec<Point3D>,
}

/// Measure every wall, substituting extruded area/height where available
pub fn walls_info(
    walls: &[Surface],
    extruded: Option<&FxHashMap<usize, ExtrudedMetrics>>,
    directions: Option<&[&str]>,
) -> Vec<WallInfo> {
    walls
        .iter()
        .enumerate()
        .map(|(index, wall)| {
            let vertices = &wall.vertices;
            let (area, max_height) = match extruded.and_then(|m| m.get(&index)) {
                Some(m) => (round_to_tenth(m.area), round_to_tenth(m.height)),
                None => (polygon_area_3d(vertices), wall_height(vertices)),
            };

            WallInfo {
                wall_index: index,
                area,
                max_height,
                width: wall_width(vertices),
                direction: directions
                    .and_then(|d| d.get(index))
                    .map(|d| d.to_string()),
                vertices: vertices.clone(),
            }
        })
        .collect()
}

/// Sum of the rounded perimeters of all ground surfaces
pub fn ground_perimeter(ground: &[Surface]) -> f64 {
    ground.iter().map(|g| polygon_perimeter(&g.vertices)).sum()
}
