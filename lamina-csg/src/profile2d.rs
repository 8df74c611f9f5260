// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Eager evaluation of a 2D SCAD subtree into a flat [`Geometries2D`]
//! (§4.3 "Extruded 2D profile"). Used only for `linear_extrude`'s children
//! — the spec's own Non-goal "supporting 2D primitives embedded in 3D
//! context" means a bare 2D primitive outside an extrusion is the
//! `object_2d_in_3d` policy case (§4.3), not a thing this evaluator
//! renders on its own.

use crate::csg2::fold_boolean;
use crate::error::GeomError;
use crate::resolution::fragments_for;
use crate::winding::ccw_polygon;
use lamina_core::geo2d::Geometries2D;
use lamina_core::{Config, Mat3, Policy, Scalar, Vec2};
use lamina_lang::diag::{DiagList, Diagnostic};
use lamina_lang::scad::{ScadNode, ScadTag};

fn transform_point(m: &Mat3, p: Vec2) -> Vec2 {
    use cgmath::Vector3;
    let v = m * Vector3::new(p.x, p.y, 1.0);
    Vec2::new(v.x, v.y)
}

fn rect_polygon(size: Vec2, center: bool) -> geo::Polygon<Scalar> {
    let (min, max) = if center {
        (Vec2::new(-size.x / 2.0, -size.y / 2.0), Vec2::new(size.x / 2.0, size.y / 2.0))
    } else {
        (Vec2::new(0.0, 0.0), size)
    };
    ccw_polygon(vec![
        (min.x, min.y),
        (max.x, min.y),
        (max.x, max.y),
        (min.x, max.y),
    ])
}

fn circle_polygon(radius: Scalar, segments: u32) -> geo::Polygon<Scalar> {
    let n = segments.max(3);
    let coords: Vec<(Scalar, Scalar)> = (0..n)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
            (radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    ccw_polygon(coords)
}

fn path_polygon(points: &[Vec2]) -> geo::Polygon<Scalar> {
    ccw_polygon(points.iter().map(|p| (p.x, p.y)).collect())
}

/// Evaluate a 2D SCAD subtree into a flat polygon set, in the profile's own
/// local 2D frame.
pub fn eval_profile2d(
    node: &ScadNode,
    current: Mat3,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<Geometries2D>, GeomError> {
    use lamina_lang::src_ref::SrcReferrer;
    if node.is_disabled() {
        return Ok(None);
    }
    let geometry = match &node.tag {
        ScadTag::Square { size, center } => {
            if size.x.abs() <= 0.0 || size.y.abs() <= 0.0 {
                return apply_empty_policy(cfg, diags, node, true);
            }
            Some(Geometries2D::single(transform_polygon(
                &rect_polygon(*size, *center),
                &current,
            )))
        }
        ScadTag::Circle { radius, resolution } => {
            if *radius <= 0.0 {
                return apply_empty_policy(cfg, diags, node, true);
            }
            let segments = fragments_for(*radius, *resolution, cfg.max_fn);
            Some(Geometries2D::single(transform_polygon(
                &circle_polygon(*radius, segments),
                &current,
            )))
        }
        ScadTag::Polygon { points } => {
            if points.len() < 3 {
                return apply_empty_policy(cfg, diags, node, true);
            }
            Some(Geometries2D::single(transform_polygon(
                &path_polygon(points),
                &current,
            )))
        }
        ScadTag::Union | ScadTag::Group => {
            return eval_children_union(node, current, cfg, diags);
        }
        ScadTag::Difference => {
            return eval_children_op(node, current, cfg, diags, lamina_core::BooleanOp::Difference);
        }
        ScadTag::Intersection => {
            return eval_children_op(node, current, cfg, diags, lamina_core::BooleanOp::Intersection);
        }
        ScadTag::Translate { v } => {
            let m = current * Mat3::from_translation(Vec2::new(v.x, v.y));
            return eval_children_union_with(node, m, cfg, diags);
        }
        ScadTag::Scale { v } => {
            if v.x == 0.0 || v.y == 0.0 {
                return apply_collapse_policy(cfg, diags, node);
            }
            let m = current * Mat3::from_nonuniform_scale(v.x, v.y);
            return eval_children_union_with(node, m, cfg, diags);
        }
        ScadTag::Rotate { angle_deg, .. } => {
            let m = current * Mat3::from_angle_z(cgmath::Deg(*angle_deg));
            return eval_children_union_with(node, m, cfg, diags);
        }
        ScadTag::Mirror { v } => {
            let m = current * mirror2d(Vec2::new(v.x, v.y));
            return eval_children_union_with(node, m, cfg, diags);
        }
        ScadTag::Multmatrix { m } => {
            let m2 = current
                * Mat3::new(m.x.x, m.x.y, 0.0, m.y.x, m.y.y, 0.0, m.w.x, m.w.y, 1.0);
            return eval_children_union_with(node, m2, cfg, diags);
        }
        ScadTag::Cube { .. }
        | ScadTag::Sphere { .. }
        | ScadTag::Cylinder { .. }
        | ScadTag::Polyhedron { .. }
        | ScadTag::LinearExtrude { .. } => {
            return match cfg.policy.object_3d_in_2d {
                Policy::Error => Err(GeomError::Object3DIn2D { tag: node.tag_name(), at: node.src_ref() }),
                Policy::Warn => {
                    diags.push(Diagnostic::warning(node, "3D object in 2D context, ignored"));
                    Ok(None)
                }
                Policy::Ignore => Ok(None),
            };
        }
    };
    Ok(geometry)
}

fn transform_polygon(p: &geo::Polygon<Scalar>, m: &Mat3) -> geo::Polygon<Scalar> {
    let ext: Vec<(Scalar, Scalar)> = p
        .exterior()
        .coords()
        .map(|c| {
            let t = transform_point(m, Vec2::new(c.x, c.y));
            (t.x, t.y)
        })
        .collect();
    geo::Polygon::new(geo::LineString::from(ext), vec![])
}

fn mirror2d(axis: Vec2) -> Mat3 {
    let n = axis;
    let len2 = n.x * n.x + n.y * n.y;
    if len2 <= 0.0 {
        return Mat3::from_scale(1.0);
    }
    // Reflect across the line through the origin perpendicular to `axis`.
    let a = 1.0 - 2.0 * n.x * n.x / len2;
    let b = -2.0 * n.x * n.y / len2;
    let c = -2.0 * n.x * n.y / len2;
    let d = 1.0 - 2.0 * n.y * n.y / len2;
    Mat3::new(a, c, 0.0, b, d, 0.0, 0.0, 0.0, 1.0)
}

fn eval_children_union(
    node: &ScadNode,
    current: Mat3,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<Geometries2D>, GeomError> {
    eval_children_union_with(node, current, cfg, diags)
}

fn eval_children_union_with(
    node: &ScadNode,
    current: Mat3,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<Geometries2D>, GeomError> {
    let mut operands = Vec::new();
    for child in &node.children {
        if let Some(g) = eval_profile2d(child, current, cfg, diags)? {
            operands.push(g);
        }
    }
    if operands.is_empty() {
        return Ok(None);
    }
    Ok(Some(fold_boolean(
        lamina_core::BooleanOp::Union,
        operands,
        cfg,
    )))
}

fn eval_children_op(
    node: &ScadNode,
    current: Mat3,
    cfg: &Config,
    diags: &mut DiagList,
    op: lamina_core::BooleanOp,
) -> Result<Option<Geometries2D>, GeomError> {
    let mut operands = Vec::new();
    for child in &node.children {
        if let Some(g) = eval_profile2d(child, current, cfg, diags)? {
            operands.push(g);
        }
    }
    if operands.is_empty() {
        return Ok(None);
    }
    Ok(Some(fold_boolean(op, operands, cfg)))
}

fn apply_empty_policy(
    cfg: &Config,
    diags: &mut DiagList,
    node: &ScadNode,
    _source: bool,
) -> Result<Option<Geometries2D>, GeomError> {
    use lamina_lang::src_ref::SrcReferrer;
    match cfg.policy.empty_at_source {
        Policy::Error => Err(GeomError::EmptyAtSource { at: node.src_ref() }),
        Policy::Warn => {
            diags.push(Diagnostic::warning(node, "empty primitive, elided"));
            Ok(None)
        }
        Policy::Ignore => Ok(None),
    }
}

fn apply_collapse_policy(
    cfg: &Config,
    diags: &mut DiagList,
    node: &ScadNode,
) -> Result<Option<Geometries2D>, GeomError> {
    use lamina_lang::src_ref::SrcReferrer;
    match cfg.policy.collapsed_by_transform {
        Policy::Error => Err(GeomError::CollapsedByTransform { at: node.src_ref() }),
        Policy::Warn => {
            diags.push(Diagnostic::warning(node, "geometry collapsed by transform, elided"));
            Ok(None)
        }
        Policy::Ignore => Ok(None),
    }
}
