// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Facade-Lite Core
//!
//! Data model for LOD2 building geometry as delivered by the geometry
//! provider: per-surface vertex loops grouped into walls (optionally bucketed
//! by compass direction), roofs, ground and decorative neighbour surfaces.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use facade_lite_core::BuildingData;
//!
//! let building = BuildingData::from_json(&payload)?;
//! for wall in building.all_walls() {
//!     println!("#{} {} ({} vertices)", wall.index, wall.direction_label(), wall.surface.vertices.len());
//! }
//! ```
//!
//! The model is an immutable snapshot: the geometry engine derives new data
//! from it and never mutates it.

pub mod direction;
pub mod error;
pub mod types;

pub use direction::Direction;
pub use error::{Error, Result};
pub use types::{
    AugmentedWall, BuildingData, PointCloud, Point3D, Surface, WallCenter, WALL_CENTER_PLACEHOLDER,
};
