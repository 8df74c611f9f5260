// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The numbered boundary scenarios (§8 "Boundary scenarios").

use geo::BoundingRect;
use lamina_core::Config;
use lamina_csg::pipeline::Stage;
use lamina_csg::{run_pipeline, PipelineOutput};

fn run(source: &str, configure: impl FnOnce(&mut Config)) -> PipelineOutput {
    let mut cfg = Config::default();
    configure(&mut cfg);
    run_pipeline(source, &cfg, Stage::Emitted).expect("pipeline runs")
}

/// Scenario 1: `cube(10);` with `z_step=5` samples two layers at the cell
/// centres of its `z` extent, each the cube's full 10x10 cross-section.
#[test]
fn scenario_1_cube_layers_at_cell_centres() {
    let out = run("cube(10);", |cfg| cfg.range.z_step = Some(5.0));
    let range = out.range.expect("range computed");
    assert_eq!(range.count, 2);
    assert!((range.z_at(0) - 2.5).abs() < 1e-9);
    assert!((range.z_at(1) - 7.5).abs() < 1e-9);
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        assert!((polygons.area() - 100.0).abs() < 1e-6);
    }
}

/// Scenario 2: subtracting a laterally offset cube leaves a rectangular
/// strip, the same shape at every sampled layer since neither cube's
/// cross-section changes with `z`.
#[test]
fn scenario_2_difference_leaves_a_rectangular_strip() {
    let out = run(
        "difference() { cube(10); translate([5,0,0]) cube(10); }",
        |cfg| {
            cfg.range.z_step = Some(5.0);
            cfg.range.z_min = Some(2.5);
            cfg.range.z_max = Some(7.5);
        },
    );
    assert_eq!(out.layers.len(), 2);
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        // cube(10) spans x in [0,10]; its translated twin spans [5,15];
        // the surviving strip is x in [0,5], y in [0,10]: a 5x10 rectangle.
        assert!((polygons.area() - 50.0).abs() < 1e-6);
        let bbox = polygons.0.bounding_rect().expect("non-empty");
        assert!((bbox.min().x - 0.0).abs() < 1e-6);
        assert!((bbox.max().x - 5.0).abs() < 1e-6);
    }
}

/// Scenario 3: a faceted sphere's layer radius follows `sqrt(r^2 - z^2)`
/// relative to its centre, and the polar layers (`z = +-r`) are elided as
/// empty rather than emitted as zero-area polygons.
#[test]
fn scenario_3_sphere_layers_follow_the_circle_equation() {
    let out = run("sphere(r=10, $fn=8);", |cfg| {
        cfg.range.z_step = Some(5.0);
        cfg.range.z_min = Some(-10.0);
        cfg.range.z_max = Some(10.0);
    });
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        let expected_r_sqr = (100.0 - layer.z * layer.z).max(0.0);
        if expected_r_sqr <= 1e-9 {
            assert!(polygons.is_empty(), "pole layer at z={} should be elided", layer.z);
        } else {
            // An inscribed regular octagon of circumradius r has area
            // 2*sqrt(2)*r^2; within $fn=8's polygon approximation the
            // layer area should be close to, but strictly less than, the
            // true circle's area (pi*r^2).
            let circle_area = std::f64::consts::PI * expected_r_sqr;
            assert!(polygons.area() > 0.0);
            assert!(polygons.area() < circle_area);
        }
    }
}

/// Scenario 4: `cube(0);` is a lex/parse-error-free run that nonetheless
/// aborts at CSG3 build time with a `GeomError`, under the default
/// `empty_at_source = error` policy.
#[test]
fn scenario_4_empty_cube_aborts_at_csg3_build() {
    let cfg = Config::default();
    let err =
        run_pipeline("cube(0);", &cfg, Stage::Emitted).expect_err("empty cube is fatal by default");
    assert!(matches!(err, lamina_csg::error::PipelineError::Geom(
        lamina_csg::GeomError::EmptyAtSource { .. }
    )));
}

/// Scenario 5: `union(){ cube(10); cube(10); }` is idempotent — every
/// layer is identical to a plain `cube(10)`'s layer.
#[test]
fn scenario_5_union_of_identical_solids_is_idempotent() {
    let out = run("union() { cube(10); cube(10); }", |cfg| cfg.range.z_step = Some(5.0));
    for layer in &out.layers {
        let polygons = layer.polygons.as_ref().expect("evaluated");
        assert!((polygons.area() - 100.0).abs() < 1e-6);
    }
}

/// Scenario 6: an abutted multi-character token is a lex error; the
/// pipeline never reaches the SCAD stage.
#[test]
fn scenario_6_abutted_tokens_are_a_lex_error() {
    let cfg = Config::default();
    let err = run_pipeline("9.9foo;", &cfg, Stage::Emitted).expect_err("lex error");
    match err {
        lamina_csg::error::PipelineError::Lex(_) => {}
        other => panic!("expected a lex error, got {other:?}"),
    }
}
