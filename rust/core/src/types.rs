// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provider payload types: points, surfaces and the building snapshot

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::Result;

/// Marker the provider emits for "no facade in this direction"
pub const WALL_CENTER_PLACEHOLDER: Point3D = Point3D {
    x: 1.0,
    y: 1.0,
    z: 1.0,
};

/// A point in the site-local metric frame (Z is up)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Point3D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// True when every axis differs by less than `eps`
    #[inline]
    pub fn approx_eq(&self, other: &Point3D, eps: f64) -> bool {
        (self.x - other.x).abs() < eps
            && (self.y - other.y).abs() < eps
            && (self.z - other.z).abs() < eps
    }
}

/// A closed polygon loop.
///
/// The first vertex may or may not be repeated at the end; winding is not
/// guaranteed and the loop may be slightly non-planar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    #[serde(default)]
    pub vertices: Vec<Point3D>,
}

impl Surface {
    pub fn new(vertices: Vec<Point3D>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl From<Vec<Point3D>> for Surface {
    fn from(vertices: Vec<Point3D>) -> Self {
        Self { vertices }
    }
}

/// Point cloud attachments (rendered only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointCloud {
    #[serde(default)]
    pub single: Vec<Point3D>,
    #[serde(default)]
    pub multi: Vec<Point3D>,
    #[serde(default)]
    pub roof_extrusions: Vec<Vec<Point3D>>,
}

/// A building snapshot as returned by the geometry provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingData {
    /// Legacy flat wall list, used when no direction bucket is filled
    #[serde(default)]
    pub walls: Vec<Surface>,
    #[serde(rename = "facade_N", default, skip_serializing_if = "Option::is_none")]
    pub facade_n: Option<Vec<Surface>>,
    #[serde(rename = "facade_NE", default, skip_serializing_if = "Option::is_none")]
    pub facade_ne: Option<Vec<Surface>>,
    #[serde(rename = "facade_E", default, skip_serializing_if = "Option::is_none")]
    pub facade_e: Option<Vec<Surface>>,
    #[serde(rename = "facade_SE", default, skip_serializing_if = "Option::is_none")]
    pub facade_se: Option<Vec<Surface>>,
    #[serde(rename = "facade_S", default, skip_serializing_if = "Option::is_none")]
    pub facade_s: Option<Vec<Surface>>,
    #[serde(rename = "facade_SW", default, skip_serializing_if = "Option::is_none")]
    pub facade_sw: Option<Vec<Surface>>,
    #[serde(rename = "facade_W", default, skip_serializing_if = "Option::is_none")]
    pub facade_w: Option<Vec<Surface>>,
    #[serde(rename = "facade_NW", default, skip_serializing_if = "Option::is_none")]
    pub facade_nw: Option<Vec<Surface>>,
    #[serde(default)]
    pub roofs: Vec<Surface>,
    #[serde(default)]
    pub ground: Vec<Surface>,
    /// One marker per direction, `WALL_CENTER_PLACEHOLDER` where empty
    #[serde(default)]
    pub wall_centers: Vec<Point3D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<PointCloud>,
    /// `[longitude, latitude]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub neighbours: Vec<Surface>,
    #[serde(default)]
    pub surrounding_buildings: Vec<Surface>,
}

/// A wall together with its place in the flattened wall list
#[derive(Debug, Clone, Copy)]
pub struct AugmentedWall<'a> {
    pub surface: &'a Surface,
    /// `None` for legacy walls without a direction bucket
    pub direction: Option<Direction>,
    /// 1..=8 for directional facades, 0 otherwise
    pub facade_id: u8,
    /// Index in the flattened wall list
    pub index: usize,
}

impl AugmentedWall<'_> {
    /// Direction code, or `"Unknown"` for legacy walls
    pub fn direction_label(&self) -> &'static str {
        self.direction.map(Direction::code).unwrap_or("Unknown")
    }
}

/// A wall-center marker paired with its direction index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCenter {
    pub center: Point3D,
    pub index: usize,
}

impl WallCenter {
    pub fn direction(&self) -> Direction {
        Direction::from_index(self.index)
    }

    pub fn facade_id(&self) -> u8 {
        self.direction().facade_id()
    }
}

impl BuildingData {
    /// Decode a provider payload
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a provider payload from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Surfaces of one direction bucket (empty if absent)
    pub fn facade(&self, direction: Direction) -> &[Surface] {
        let bucket = match direction {
            Direction::North => &self.facade_n,
            Direction::NorthEast => &self.facade_ne,
            Direction::East => &self.facade_e,
            Direction::SouthEast => &self.facade_se,
            Direction::South => &self.facade_s,
            Direction::SouthWest => &self.facade_sw,
            Direction::West => &self.facade_w,
            Direction::NorthWest => &self.facade_nw,
        };
        bucket.as_deref().unwrap_or(&[])
    }

    /// True if any direction bucket holds at least one surface
    pub fn has_directional_facades(&self) -> bool {
        Direction::ALL.iter().any(|&d| !self.facade(d).is_empty())
    }

    /// Flatten walls into one indexable list.
    ///
    /// Direction buckets win over the legacy `walls` list when any is filled;
    /// buckets are concatenated in N..NW order.
    pub fn all_walls(&self) -> Vec<AugmentedWall<'_>> {
        if self.has_directional_facades() {
            Direction::ALL
                .iter()
                .flat_map(|&d| self.facade(d).iter().map(move |s| (d, s)))
                .enumerate()
                .map(|(index, (direction, surface))| AugmentedWall {
                    surface,
                    direction: Some(direction),
                    facade_id: direction.facade_id(),
                    index,
                })
                .collect()
        } else {
            self.walls
                .iter()
                .enumerate()
                .map(|(index, surface)| AugmentedWall {
                    surface,
                    direction: None,
                    facade_id: 0,
                    index,
                })
                .collect()
        }
    }

    /// Wall-center markers with the placeholder sentinel removed
    pub fn wall_centers(&self) -> Vec<WallCenter> {
        self.wall_centers
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != WALL_CENTER_PLACEHOLDER)
            .map(|(index, &center)| WallCenter { center, index })
            .collect()
    }

    /// Markers for directions that have at least one selected wall
    pub fn wall_centers_for_selection(&self, selected: &[usize]) -> Vec<WallCenter> {
        let walls = self.all_walls();
        let selected_ids: Vec<u8> = selected
            .iter()
            .filter_map(|&i| walls.get(i))
            .map(|w| w.facade_id)
            .collect();

        self.wall_centers()
            .into_iter()
            .filter(|c| selected_ids.contains(&c.facade_id()))
            .collect()
    }
}
