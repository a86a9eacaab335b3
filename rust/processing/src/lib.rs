// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared building processing pipeline.
//!
//! Turns a provider payload plus the user's scaffold controls into a
//! render-ready [`Scene`]: surface meshes, neighbour groups, facade markers,
//! edge dimensions, scaffold surfaces and the wall metrics payload.

pub mod error;
pub mod pipeline;
pub mod types;

pub use error::{Error, Result};
pub use pipeline::{process_building, process_json, scene_offset, SceneOptions, MARKER_LIFT};
pub use types::{
    BuildingGroup, DimensionLabel, ScaffoldParams, ScaffoldWall, Scene, SceneStats, SurfaceKind,
    SurfaceMesh, WallCenterMarker, WallMetrics,
};
