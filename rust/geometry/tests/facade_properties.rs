// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Behavioural tests for meshing, extrusion and measurement on small
//! synthetic buildings.

use approx::assert_relative_eq;
use facade_lite_core::{Point3D, Surface};
use facade_lite_geometry::triangulation::fan_triangulate;
use facade_lite_geometry::{
    extrude_walls, mesh_surface, offset_selected_walls, polygon_area_3d, polygon_perimeter,
    triangulate_loop, wall_height, wall_width, ExtrusionConfig, ExtrusionRequest, Point3,
    RenderOffset, Vector3,
};

fn surface(points: &[(f64, f64, f64)]) -> Surface {
    Surface::new(
        points
            .iter()
            .map(|&(x, y, z)| Point3D::new(x, y, z))
            .collect(),
    )
}

fn request<'a>(walls: &'a [Surface], selected: &'a [i64], width: f64) -> ExtrusionRequest<'a> {
    ExtrusionRequest {
        walls,
        roofs: &[],
        ground: &[],
        selected,
        width,
        offset: RenderOffset::default(),
        eave_height_difference: 0.0,
    }
}

fn displacement(from: &Point3D, to: &Point3D) -> Vector3<f64> {
    Vector3::new(to.x - from.x, to.y - from.y, to.z - from.z)
}

/// Highest render-space Y (provider Z) of a mesh
fn mesh_top(positions: &[f32]) -> f32 {
    positions
        .chunks_exact(3)
        .map(|p| p[1])
        .fold(f32::NEG_INFINITY, f32::max)
}

#[test]
fn degenerate_surfaces_produce_no_triangles() {
    let offset = RenderOffset::default();

    let cases = [
        surface(&[]),
        surface(&[(0.0, 0.0, 0.0)]),
        surface(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)]),
        // Triangle closed with a repeated first vertex still has 3 effective vertices,
        // a 2-gon closed the same way does not
        surface(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (0.0, 0.0, 0.0)]),
        surface(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (2.0, 2.0, 2.0), (3.0, 3.0, 3.0)]),
        surface(&[(5.0, 5.0, 5.0), (5.0, 5.0, 5.0), (5.0, 5.0, 5.0)]),
    ];

    for case in &cases {
        let mesh = mesh_surface(&case.vertices, &offset);
        assert_eq!(mesh.triangle_count(), 0, "surface {:?}", case.vertices);
    }
}

#[test]
fn convex_polygons_produce_n_minus_two_triangles() {
    // Regular polygons on a tilted plane
    let tilt = Vector3::new(0.0, 1.0, 1.0).normalize();
    let u = Vector3::new(1.0, 0.0, 0.0);
    let v = tilt.cross(&u);

    for n in 3..=12 {
        let vertices: Vec<Point3D> = (0..n)
            .map(|i| {
                let angle = i as f64 / n as f64 * std::f64::consts::TAU;
                let p = u * (3.0 * angle.cos()) + v * (3.0 * angle.sin());
                Point3D::new(p.x + 10.0, p.y - 4.0, p.z + 2.0)
            })
            .collect();

        let mesh = mesh_surface(&vertices, &RenderOffset::new(10.0, -4.0, 2.0));
        assert_eq!(mesh.triangle_count(), n - 2, "{n}-gon");
        assert_eq!(mesh.vertex_count(), n);
    }
}

#[test]
fn triangulation_indices_stay_in_range() {
    // Concave star, an L-shaped gable and a self-touching bow tie
    let star: Vec<Point3<f64>> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 4.0 } else { 1.5 };
            let angle = i as f64 / 10.0 * std::f64::consts::TAU;
            Point3::new(r * angle.cos(), 0.0, r * angle.sin())
        })
        .collect();
    let l_shape = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 2.0),
        Point3::new(2.0, 0.0, 2.0),
        Point3::new(2.0, 0.0, 5.0),
        Point3::new(0.0, 0.0, 5.0),
    ];
    let bow_tie = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ];

    for loop_points in [&star, &l_shape, &bow_tie] {
        let indices = triangulate_loop(loop_points);
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|&i| i < loop_points.len()));
    }

    assert_eq!(triangulate_loop(&l_shape).len(), 4 * 3);

    for n in 0..16 {
        assert!(fan_triangulate(n).iter().all(|&i| i < n));
    }
}

#[test]
fn invalid_selections_are_ignored() {
    let walls = vec![
        surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0), (0.0, 0.0, 3.0)]),
        surface(&[(0.0, 10.0, 0.0), (4.0, 10.0, 0.0), (4.0, 10.0, 3.0), (0.0, 10.0, 3.0)]),
        surface(&[(0.0, 20.0, 0.0), (4.0, 20.0, 0.0), (4.0, 20.0, 6.0), (0.0, 20.0, 6.0)]),
    ];
    let config = ExtrusionConfig::default();

    let noisy = extrude_walls(&request(&walls, &[-1, 9999, 2], 0.7), &config);
    let clean = extrude_walls(&request(&walls, &[2], 0.7), &config);

    assert_eq!(noisy.len(), 1);
    assert_eq!(clean.len(), 1);
    assert_eq!(noisy[0].wall_index, 2);
    assert_eq!(noisy[0].wall_index, clean[0].wall_index);
    assert_eq!(noisy[0].area, clean[0].area);
    assert_eq!(noisy[0].height, clean[0].height);
    assert_eq!(noisy[0].geometry, clean[0].geometry);
}

#[test]
fn isolated_wall_moves_by_width_along_normal() {
    // Wall running along (3, 4, 0) / 5
    let walls = vec![surface(&[
        (0.0, 0.0, 0.0),
        (3.0, 4.0, 0.0),
        (3.0, 4.0, 2.5),
        (0.0, 0.0, 2.5),
    ])];
    let width = 0.7;

    let offset = offset_selected_walls(&request(&walls, &[0], width), &ExtrusionConfig::default());
    assert_eq!(offset.indices, vec![0]);

    let normal = offset.normals[0];
    assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-12);
    // Either side of the plane, depending on the parity probe
    assert_relative_eq!(normal.dot(&Vector3::new(-0.8, 0.6, 0.0)).abs(), 1.0, epsilon = 1e-12);

    for (src, dst) in walls[0].vertices.iter().zip(&offset.vertices[0]) {
        let d = displacement(src, dst);
        assert_relative_eq!(d.norm(), width, epsilon = 1e-9);
        assert_relative_eq!(d, normal * width, epsilon = 1e-9);
    }
}

#[test]
fn coplanar_walls_share_the_plain_normal() {
    let walls = vec![
        surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0), (0.0, 0.0, 3.0)]),
        surface(&[(4.0, 0.0, 0.0), (8.0, 0.0, 0.0), (8.0, 0.0, 3.0), (4.0, 0.0, 3.0)]),
    ];
    let width = 0.8;

    let offset = offset_selected_walls(&request(&walls, &[0, 1], width), &ExtrusionConfig::default());
    let normal = offset.normals[0];
    assert_relative_eq!(normal, offset.normals[1], epsilon = 1e-12);

    // Shared edge (4, 0, 0) - (4, 0, 3) is vertex 1 / 2 of the first wall
    // and vertex 0 / 3 of the second
    for (wall, vertex) in [(0, 1), (0, 2), (1, 0), (1, 3)] {
        let d = displacement(&walls[wall].vertices[vertex], &offset.vertices[wall][vertex]);
        assert_relative_eq!(d, normal * width, epsilon = 1e-9);
    }
}

#[test]
fn right_angle_corner_keeps_both_faces_at_width() {
    // South face (normal -Y) and east face (normal +X) sharing the edge x=4, y=0
    let walls = vec![
        surface(&[(4.0, 0.0, 0.0), (0.0, 0.0, 0.0), (0.0, 0.0, 3.0), (4.0, 0.0, 3.0)]),
        surface(&[(4.0, 4.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0), (4.0, 4.0, 3.0)]),
    ];
    let w = 0.7;

    let offset = offset_selected_walls(&request(&walls, &[0, 1], w), &ExtrusionConfig::default());
    assert_relative_eq!(offset.normals[0], Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(offset.normals[1], Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);

    for slot in 0..2 {
        let normal = offset.normals[slot];
        let origin = &walls[slot].vertices[0];
        for p in &offset.vertices[slot] {
            // Distance of the offset vertex from the original wall plane
            let distance = displacement(origin, p).dot(&normal);
            assert_relative_eq!(distance, w, epsilon = 1e-9);
        }
    }

    // The corner itself moved diagonally, not by plain width
    let corner = displacement(&walls[0].vertices[0], &offset.vertices[0][0]);
    assert_relative_eq!(corner, Vector3::new(w, -w, 0.0), epsilon = 1e-9);
}

#[test]
fn normals_point_away_from_a_closed_volume() {
    let walls = vec![
        // South, wound so its planar normal points into the box
        surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 3.0), (0.0, 0.0, 3.0)]),
        // North, wound outward
        surface(&[(0.0, 4.0, 0.0), (4.0, 4.0, 0.0), (4.0, 4.0, 3.0), (0.0, 4.0, 3.0)]),
        surface(&[(4.0, 0.0, 0.0), (4.0, 4.0, 0.0), (4.0, 4.0, 3.0), (4.0, 0.0, 3.0)]),
        surface(&[(0.0, 0.0, 0.0), (0.0, 4.0, 0.0), (0.0, 4.0, 3.0), (0.0, 0.0, 3.0)]),
    ];
    let roofs = vec![surface(&[(0.0, 0.0, 3.0), (4.0, 0.0, 3.0), (4.0, 4.0, 3.0), (0.0, 4.0, 3.0)])];
    let ground = vec![surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 4.0, 0.0), (0.0, 4.0, 0.0)])];

    let request = ExtrusionRequest {
        roofs: &roofs,
        ground: &ground,
        ..request(&walls, &[0, 1], 0.7)
    };
    let offset = offset_selected_walls(&request, &ExtrusionConfig::default());

    assert_relative_eq!(offset.normals[0], Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(offset.normals[1], Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    assert!(offset.vertices[0].iter().all(|v| (v.y + 0.7).abs() < 1e-9));
    assert!(offset.vertices[1].iter().all(|v| (v.y - 4.7).abs() < 1e-9));
}

#[test]
fn equal_heights_collapse_to_one_level() {
    let walls = vec![
        surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 6.0), (0.0, 0.0, 6.0)]),
        surface(&[(0.0, 20.0, 0.0), (4.0, 20.0, 0.0), (4.0, 20.0, 6.0), (0.0, 20.0, 6.0)]),
        surface(&[(0.0, 40.0, 0.0), (4.0, 40.0, 0.0), (4.0, 40.0, 6.0), (0.0, 40.0, 6.0)]),
    ];

    let results = extrude_walls(&request(&walls, &[0, 1, 2], 0.7), &ExtrusionConfig::default());
    assert_eq!(results.len(), 3);

    for result in &results {
        assert_relative_eq!(result.height, 8.0, epsilon = 1e-9);
        assert_relative_eq!(mesh_top(&result.geometry.positions), 8.0);
    }
}

#[test]
fn close_heights_merge_into_the_higher_level() {
    let walls = vec![
        surface(&[(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (4.0, 0.0, 6.0), (0.0, 0.0, 6.0)]),
        surface(&[(0.0, 20.0, 0.0), (4.0, 20.0, 0.0), (4.0, 20.0, 5.3), (0.0, 20.0, 5.3)]),
    ];

    let results = extrude_walls(&request(&walls, &[0, 1], 0.7), &ExtrusionConfig::default());
    let tops: Vec<f32> = results.iter().map(|r| mesh_top(&r.geometry.positions)).collect();
    assert_eq!(tops, vec![8.0, 8.0]);
}

#[test]
fn eave_difference_lowers_the_deck_level() {
    let walls = vec![surface(&[
        (0.0, 0.0, 0.0),
        (4.0, 0.0, 0.0),
        (4.0, 0.0, 6.0),
        (0.0, 0.0, 6.0),
    ])];
    let config = ExtrusionConfig::default();

    // 6 m wall: 6 - 1 + 2 = 7
    let lowered = ExtrusionRequest {
        eave_height_difference: 1.0,
        ..request(&walls, &[0], 0.7)
    };
    let results = extrude_walls(&lowered, &config);
    assert_eq!(results.len(), 1);
    assert_relative_eq!(results[0].height, 7.0, epsilon = 1e-9);
    assert_relative_eq!(results[0].area, 28.0, epsilon = 1e-9);
    assert_relative_eq!(mesh_top(&results[0].geometry.positions), 7.0);

    // Without the difference the same wall goes to 8
    let flat = extrude_walls(&request(&walls, &[0], 0.7), &config);
    assert_relative_eq!(flat[0].height, 8.0, epsilon = 1e-9);
}

#[test]
fn collinear_vertices_do_not_produce_slivers() {
    // Bottom edge carries a mid-edge vertex right after vertex 0
    let wall = surface(&[
        (0.0, 0.0, 0.0),
        (2.0, 0.0, 0.0),
        (4.0, 0.0, 0.0),
        (4.0, 0.0, 3.0),
        (0.0, 0.0, 3.0),
    ]);
    let mesh = mesh_surface(&wall.vertices, &RenderOffset::default());
    assert_eq!(mesh.triangle_count(), 3);

    let corner = |i: u32| {
        let p = &mesh.positions[i as usize * 3..i as usize * 3 + 3];
        Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    };
    let mut total = 0.0;
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (corner(tri[0]), corner(tri[1]), corner(tri[2]));
        let area = 0.5 * (b - a).cross(&(c - a)).norm();
        assert!(area > 1e-6, "sliver triangle {:?}", tri);
        total += area;
    }
    assert_relative_eq!(total, 12.0, epsilon = 1e-5);
    assert!(mesh.normals.chunks_exact(3).all(|n| n.iter().any(|c| c.abs() > 0.5)));
}

#[test]
fn unit_square_measurements() {
    let square = surface(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 1.0, 0.0), (0.0, 1.0, 0.0)]);

    assert_eq!(polygon_area_3d(&square.vertices), 1.0);
    assert_eq!(polygon_perimeter(&square.vertices), 4.0);
    // Diagonal sqrt(2) at one decimal
    assert_eq!(wall_width(&square.vertices), 1.4);
    assert_eq!(wall_height(&square.vertices), 0.0);
}

#[test]
fn single_wall_scaffold_end_to_end() {
    let walls = vec![surface(&[
        (0.0, 0.0, 0.0),
        (4.0, 0.0, 0.0),
        (4.0, 0.0, 3.0),
        (0.0, 0.0, 3.0),
    ])];
    let config = ExtrusionConfig::default();
    let request = request(&walls, &[0], 0.8);

    // Before leveling: rectangle moved 0.8 m along its normal, same area
    let offset = offset_selected_walls(&request, &config);
    assert_relative_eq!(offset.normals[0], Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    assert!(offset.vertices[0].iter().all(|v| (v.y - 0.8).abs() < 1e-9));
    assert_eq!(polygon_area_3d(&offset.vertices[0]), 12.0);
    assert_eq!(wall_height(&offset.vertices[0]), 3.0);

    // Leveling lifts the top edge to 3 + 2 m guard rail, the base stays on the ground
    let results = extrude_walls(&request, &config);
    assert_eq!(results.len(), 1);

    let result = &results[0];
    assert_eq!(result.wall_index, 0);
    assert_relative_eq!(result.height, 5.0, epsilon = 1e-9);
    assert_relative_eq!(result.area, 20.0, epsilon = 1e-9);
    assert_eq!(result.geometry.triangle_count(), 2);
    assert_relative_eq!(mesh_top(&result.geometry.positions), 5.0);

    // Render space: provider y becomes render z
    for p in result.geometry.positions.chunks_exact(3) {
        assert_relative_eq!(p[2], 0.8, epsilon = 1e-6);
    }
}
