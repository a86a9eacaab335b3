// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grouping loose surfaces into buildings.
//!
//! Neighbour and surrounding-building data arrives as a flat surface list.
//! Surfaces that share a vertex (on a quantized grid) belong to the same
//! building; buildings are the connected components of that relation.

use facade_lite_core::Surface;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::measure::round_half_up;

/// Grid size used to match vertices between surfaces
pub const GROUPING_EPSILON: f64 = 0.01;

/// Connected components of `surfaces` by shared vertices.
///
/// Each group lists surface indices in ascending order; groups are ordered by
/// their lowest surface index.
pub fn group_surfaces(surfaces: &[Surface], epsilon: f64) -> Vec<Vec<usize>> {
    let mut by_vertex: FxHashMap<(i64, i64, i64), Vec<usize>> = FxHashMap::default();
    for (idx, surface) in surfaces.iter().enumerate() {
        for v in &surface.vertices {
            let key = (
                round_half_up(v.x / epsilon) as i64,
                round_half_up(v.y / epsilon) as i64,
                round_half_up(v.z / epsilon) as i64,
            );
            by_vertex.entry(key).or_default().push(idx);
        }
    }

    let mut adjacency: Vec<FxHashSet<usize>> = vec![FxHashSet::default(); surfaces.len()];
    for members in by_vertex.values() {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if a != b {
                    adjacency[a].insert(b);
                    adjacency[b].insert(a);
                }
            }
        }
    }

    let mut visited = vec![false; surfaces.len()];
    let mut groups = Vec::new();

    for start in 0..surfaces.len() {
        if visited[start] {
            continue;
        }

        let mut group = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(current) = stack.pop() {
            group.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        group.sort_unstable();
        groups.push(group);
    }

    groups
}
