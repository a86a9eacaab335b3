// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compass directions used to bucket facades.
//!
//! The provider orders facade buckets and wall-center markers as
//! N, NE, E, SE, S, SW, W, NW. Facade ids are 1-based in that order; id 0 is
//! reserved for walls without a direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the eight compass directions a facade can face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "NW")]
    NorthWest,
}

impl Direction {
    /// All directions in provider order
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Direction for a wall-center (or bucket) index, wrapping modulo 8
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Position in provider order (0 = N)
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// 1-based facade id (N = 1 ... NW = 8)
    #[inline]
    pub fn facade_id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// English identifier used in the provider payload (`facade_NE` etc.)
    pub fn code(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    /// German abbreviation shown on facade markers
    pub fn display_abbreviation(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::NorthEast => "NO",
            Direction::East => "O",
            Direction::SouthEast => "SO",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        }
    }

    /// Full German name
    pub fn display_name(self) -> &'static str {
        match self {
            Direction::North => "Norden",
            Direction::NorthEast => "Nordosten",
            Direction::East => "Osten",
            Direction::SouthEast => "Südosten",
            Direction::South => "Süden",
            Direction::SouthWest => "Südwesten",
            Direction::West => "Westen",
            Direction::NorthWest => "Nordwesten",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.code() == code)
            .ok_or_else(|| Error::UnknownDirection(s.to_string()))
    }
}
