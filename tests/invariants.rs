// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Quantified invariants (§8) that cross more than one pass: triangle-area
//! conservation, Boolean algebra laws, and layer count/z-value agreement
//! with the chosen [`lamina_csg::Range`].

use lamina_core::Config;
use lamina_csg::pipeline::Stage;
use lamina_csg::run_pipeline;

fn evaluate(source: &str, z_step: f64) -> lamina_csg::PipelineOutput {
    let mut cfg = Config::default();
    cfg.range.z_step = Some(z_step);
    run_pipeline(source, &cfg, Stage::Triangulated).expect("pipeline runs")
}

/// "Layer count equals `range.count`; layer z-values are `z_min + i*z_step`."
#[test]
fn layer_count_and_z_values_match_the_range() {
    let out = evaluate("sphere(r=10, $fn=12);", 2.0);
    let range = out.range.expect("range computed");
    assert_eq!(out.layers.len(), range.count);
    for (i, layer) in out.layers.iter().enumerate() {
        assert!((layer.z - range.z_at(i)).abs() < 1e-9);
    }
}

/// "For every layer, triangle union area equals polygon interior area
/// within `sqr` epsilon."
#[test]
fn triangulation_area_matches_polygon_area() {
    let out = evaluate(
        "difference() { cube(20, center=true); cylinder(r=5, h=30, center=true, $fn=16); }",
        4.0,
    );
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        let triangles = layer.triangles.as_ref().expect("triangulated");
        let tri_area: f64 = triangles
            .triangles
            .iter()
            .map(|[a, b, c]| {
                let (ax, ay) = triangles.vertices[*a];
                let (bx, by) = triangles.vertices[*b];
                let (cx, cy) = triangles.vertices[*c];
                (0.5 * ((bx - ax) * (cy - ay) - (cx - ax) * (by - ay))).abs()
            })
            .sum();
        assert!((tri_area - polygons.area()).abs() < 1e-6, "layer z={}", layer.z);
    }
}

/// "Union is idempotent: union(A, A) = A up to vertex fusion."
#[test]
fn union_is_idempotent_across_the_whole_pipeline() {
    let single = evaluate("sphere(r=8, $fn=10);", 3.0);
    let doubled = evaluate("union() { sphere(r=8, $fn=10); sphere(r=8, $fn=10); }", 3.0);
    assert_eq!(single.layers.len(), doubled.layers.len());
    for (a, b) in single.layers.iter().zip(doubled.layers.iter()) {
        let area_a = a.polygons.as_ref().expect("evaluated").area();
        let area_b = b.polygons.as_ref().expect("evaluated").area();
        assert!((area_a - area_b).abs() < 1e-6);
    }
}

/// "Difference is antisymmetric in the first argument: ... produces
/// geometry <= A." A `difference(A, B)` can never have more area than `A`
/// alone, at any layer.
#[test]
fn difference_never_exceeds_the_base_operand() {
    let base = evaluate("cube(10);", 5.0);
    let subtracted = evaluate(
        "difference() { cube(10); translate([5,5,-1]) cube([10,10,12]); }",
        5.0,
    );
    for (a, d) in base.layers.iter().zip(subtracted.layers.iter()) {
        let area_a = a.polygons.as_ref().expect("evaluated").area();
        let area_d = d.polygons.as_ref().expect("evaluated").area();
        assert!(area_d <= area_a + 1e-9, "z={}: {area_d} > {area_a}", a.z);
    }
}

/// "Intersection commutes: intersection(A,B) = intersection(B,A)
/// vertex-for-vertex after canonical ordering." Canonical ordering here is
/// area, since both orderings of a commutative, associative fold produce
/// the same geometry.
#[test]
fn intersection_commutes() {
    let ab = evaluate(
        "intersection() { cube(10); translate([5,5,5]) cube(10); }",
        5.0,
    );
    let ba = evaluate(
        "intersection() { translate([5,5,5]) cube(10); cube(10); }",
        5.0,
    );
    assert_eq!(ab.layers.len(), ba.layers.len());
    for (x, y) in ab.layers.iter().zip(ba.layers.iter()) {
        let area_x = x.polygons.as_ref().expect("evaluated").area();
        let area_y = y.polygons.as_ref().expect("evaluated").area();
        assert!((area_x - area_y).abs() < 1e-6);
    }
}

/// Every output path is simple, closed and lies on the `pt`-snapped grid
/// (§8 "every vertex lies on the `pt`-snapped grid").
#[test]
fn evaluated_vertices_lie_on_the_pt_grid() {
    let mut cfg = Config::default();
    cfg.range.z_step = Some(5.0);
    cfg.epsilon = lamina_core::Epsilon::new(0.01, 1e-9, 1e-12);
    let out = run_pipeline(
        "difference() { cube(10); translate([5,0,0]) cube(10); }",
        &cfg,
        Stage::Evaluated,
    )
    .expect("pipeline runs");
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        for polygon in polygons.0.iter() {
            for coord in polygon.exterior().coords() {
                let snapped_x = cfg.epsilon.snap(coord.x);
                let snapped_y = cfg.epsilon.snap(coord.y);
                assert!((snapped_x - coord.x).abs() < 1e-9);
                assert!((snapped_y - coord.y).abs() < 1e-9);
            }
        }
    }
}
