// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The CSG3 solid tree and its builder (§3 "CSG3 node", §4.3 "SCAD -> CSG3
//! builder"): walks the typed SCAD tree, folds transforms into an
//! accumulated matrix, and freezes primitives with that matrix attached.
//! Generalizes the teacher's `core/geo3d/tree.rs` node kinds (`Group`,
//! `Geometry`, `Transform`) down to this language's fixed primitive/
//! combinator set, with the transform folded in eagerly rather than kept
//! as a sibling tree node — the CSG3 invariant (§3) is "no transform nodes
//! remain."

use crate::error::GeomError;
use crate::primitive::{cube_to_polyhedron, Primitive3};
use crate::profile2d::eval_profile2d;
use lamina_core::{BooleanOp, Config, Mat4, Policy};
use lamina_lang::diag::{DiagList, Diagnostic};
use lamina_lang::scad::{ScadNode, ScadTag};
use lamina_lang::src_ref::{SrcRef, SrcReferrer};
use lamina_lang::syn::Modifier;

/// A node of the CSG3 solid tree: either a transformed primitive leaf, or
/// a Boolean combinator over child nodes (§3).
#[derive(Debug, Clone)]
pub enum Csg3Node {
    /// A frozen primitive.
    Primitive(Primitive3),
    /// A Boolean combinator (`union`/`difference`/`intersection`, or an
    /// implicit `group`, which behaves as `union`).
    Op(BooleanOp, Vec<Csg3Node>),
}

/// Build the CSG3 tree from a lowered SCAD forest (§4.3).
///
/// Honours the `!` (root) modifier per OpenSCAD semantics: if any node in
/// the forest carries it, only the *first* such node (depth-first,
/// pre-order) contributes to the result and every sibling is discarded —
/// this is the §9 Open Question resolution recorded in `DESIGN.md`. `*`
/// (disable) and `%` (background) both exclude a node and its subtree from
/// the solid; `#` (highlight) is a preview-only hint with no geometric
/// effect and is otherwise treated as present.
pub fn build_csg3(
    forest: &[ScadNode],
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Csg3Node, GeomError> {
    if let Some(root_node) = find_root_override(forest) {
        return build_node(root_node, Mat4::from_scale(1.0), cfg, diags)
            .map(|n| n.unwrap_or(Csg3Node::Op(BooleanOp::Union, Vec::new())));
    }
    build_body(forest, Mat4::from_scale(1.0), cfg, diags)
        .map(|nodes| Csg3Node::Op(BooleanOp::Union, nodes))
}

fn find_root_override(forest: &[ScadNode]) -> Option<&ScadNode> {
    for node in forest {
        if node.modifiers.contains(&Modifier::Root) {
            return Some(node);
        }
        if let Some(found) = find_root_override(&node.children) {
            return Some(found);
        }
    }
    None
}

fn build_body(
    forest: &[ScadNode],
    current: Mat4,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Vec<Csg3Node>, GeomError> {
    let mut out = Vec::new();
    for node in forest {
        if let Some(built) = build_node(node, current, cfg, diags)? {
            out.push(built);
        }
    }
    Ok(out)
}

fn build_node(
    node: &ScadNode,
    current: Mat4,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<Csg3Node>, GeomError> {
    if node.is_disabled() || node.modifiers.contains(&Modifier::Background) {
        return Ok(None);
    }
    let src = node.src_ref();
    match &node.tag {
        ScadTag::Cube { size, center } => {
            if size.x.abs() <= 0.0 || size.y.abs() <= 0.0 || size.z.abs() <= 0.0 {
                return empty_at_source(cfg, diags, &src);
            }
            let (points, faces) = cube_to_polyhedron(*size, *center);
            Ok(Some(Csg3Node::Primitive(Primitive3::Polyhedron {
                points,
                faces,
                transform: current,
            })))
        }
        ScadTag::Sphere { radius, resolution } => {
            if *radius <= 0.0 {
                return empty_at_source(cfg, diags, &src);
            }
            let segments = crate::resolution::fragments_for(*radius, resolution, cfg.max_fn);
            Ok(Some(Csg3Node::Primitive(Primitive3::Sphere {
                radius: *radius,
                segments,
                transform: current,
            })))
        }
        ScadTag::Cylinder {
            radius_bottom,
            radius_top,
            height,
            center,
            resolution,
        } => {
            if (*radius_bottom <= 0.0 && *radius_top <= 0.0) || *height <= 0.0 {
                return empty_at_source(cfg, diags, &src);
            }
            let max_radius = radius_bottom.max(*radius_top);
            let segments = crate::resolution::fragments_for(max_radius, resolution, cfg.max_fn);
            let base = if *center {
                current * Mat4::from_translation(lamina_core::Vec3::new(0.0, 0.0, -height / 2.0))
            } else {
                current
            };
            Ok(Some(Csg3Node::Primitive(Primitive3::Cylinder {
                radius_bottom: *radius_bottom,
                radius_top: *radius_top,
                height: *height,
                segments,
                transform: base,
            })))
        }
        ScadTag::Polyhedron { points, faces } => {
            if points.is_empty() || faces.is_empty() {
                return empty_at_source(cfg, diags, &src);
            }
            for face in faces {
                for &idx in face {
                    if idx >= points.len() {
                        return Err(GeomError::DegenerateFace { index: idx, at: src });
                    }
                }
            }
            Ok(Some(Csg3Node::Primitive(Primitive3::Polyhedron {
                points: points.clone(),
                faces: faces.clone(),
                transform: current,
            })))
        }
        ScadTag::LinearExtrude {
            height,
            center,
            twist_deg,
            scale,
        } => {
            let profile = eval_children_profile(node, cfg, diags)?;
            let profile = match profile {
                Some(p) if !p.is_empty() => p,
                _ => return empty_at_source(cfg, diags, &src),
            };
            if *height <= 0.0 {
                return empty_at_source(cfg, diags, &src);
            }
            let base = if *center {
                current * Mat4::from_translation(lamina_core::Vec3::new(0.0, 0.0, -height / 2.0))
            } else {
                current
            };
            Ok(Some(Csg3Node::Primitive(Primitive3::Extrusion {
                profile,
                height: *height,
                twist_deg: *twist_deg,
                scale: *scale,
                transform: base,
            })))
        }
        ScadTag::Square { .. } | ScadTag::Circle { .. } | ScadTag::Polygon { .. } => {
            match cfg.policy.object_2d_in_3d {
                Policy::Error => Err(GeomError::Object2DIn3D { tag: node.tag_name(), at: src }),
                Policy::Warn => {
                    diags.push(Diagnostic::warning(node, "2D object in 3D context, ignored"));
                    Ok(None)
                }
                Policy::Ignore => Ok(None),
            }
        }
        ScadTag::Union => {
            Ok(Some(Csg3Node::Op(
                BooleanOp::Union,
                build_body(&node.children, current, cfg, diags)?,
            )))
        }
        ScadTag::Difference => Ok(Some(Csg3Node::Op(
            BooleanOp::Difference,
            build_body(&node.children, current, cfg, diags)?,
        ))),
        ScadTag::Intersection => Ok(Some(Csg3Node::Op(
            BooleanOp::Intersection,
            build_body(&node.children, current, cfg, diags)?,
        ))),
        ScadTag::Group => Ok(Some(Csg3Node::Op(
            BooleanOp::Union,
            build_body(&node.children, current, cfg, diags)?,
        ))),
        ScadTag::Translate { v } => {
            let m = current * Mat4::from_translation(*v);
            recurse_transform(node, m, cfg, diags)
        }
        ScadTag::Rotate { angle_deg, axis } => {
            let m = current
                * Mat4::from_axis_angle(
                    cgmath::InnerSpace::normalize(*axis),
                    cgmath::Deg(*angle_deg),
                );
            recurse_transform(node, m, cfg, diags)
        }
        ScadTag::Scale { v } => {
            if v.x == 0.0 || v.y == 0.0 || v.z == 0.0 {
                return match cfg.policy.collapsed_by_transform {
                    Policy::Error => Err(GeomError::CollapsedByTransform { at: src }),
                    Policy::Warn => {
                        diags.push(Diagnostic::warning(node, "geometry collapsed by transform, elided"));
                        Ok(None)
                    }
                    Policy::Ignore => Ok(None),
                };
            }
            let m = current * Mat4::from_nonuniform_scale(v.x, v.y, v.z);
            recurse_transform(node, m, cfg, diags)
        }
        ScadTag::Multmatrix { m } => {
            let combined = current * *m;
            recurse_transform(node, combined, cfg, diags)
        }
        ScadTag::Mirror { v } => {
            let m = current * mirror3d(*v);
            recurse_transform(node, m, cfg, diags)
        }
    }
}

fn recurse_transform(
    node: &ScadNode,
    transform: Mat4,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<Csg3Node>, GeomError> {
    let children = build_body(&node.children, transform, cfg, diags)?;
    if children.is_empty() {
        return Ok(None);
    }
    Ok(Some(Csg3Node::Op(BooleanOp::Union, children)))
}

fn eval_children_profile(
    node: &ScadNode,
    cfg: &Config,
    diags: &mut DiagList,
) -> Result<Option<lamina_core::geo2d::Geometries2D>, GeomError> {
    let mut operands = Vec::new();
    for child in &node.children {
        if let Some(g) = eval_profile2d(child, lamina_core::Mat3::from_scale(1.0), cfg, diags)? {
            operands.push(g);
        }
    }
    if operands.is_empty() {
        return Ok(None);
    }
    Ok(Some(crate::csg2::fold_boolean(
        BooleanOp::Union,
        operands,
        cfg,
    )))
}

fn mirror3d(axis: lamina_core::Vec3) -> Mat4 {
    let n = axis;
    let len2 = n.x * n.x + n.y * n.y + n.z * n.z;
    if len2 <= 0.0 {
        return Mat4::from_scale(1.0);
    }
    // Householder reflection across the plane through the origin
    // perpendicular to `axis`: I - 2 n n^T / |n|^2.
    let f = |i: lamina_core::Scalar, j: lamina_core::Scalar, delta: lamina_core::Scalar| {
        delta - 2.0 * i * j / len2
    };
    Mat4::new(
        f(n.x, n.x, 1.0), f(n.x, n.y, 0.0), f(n.x, n.z, 0.0), 0.0,
        f(n.y, n.x, 0.0), f(n.y, n.y, 1.0), f(n.y, n.z, 0.0), 0.0,
        f(n.z, n.x, 0.0), f(n.z, n.y, 0.0), f(n.z, n.z, 1.0), 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

fn empty_at_source(
    cfg: &Config,
    diags: &mut DiagList,
    src: &SrcRef,
) -> Result<Option<Csg3Node>, GeomError> {
    match cfg.policy.empty_at_source {
        Policy::Error => Err(GeomError::EmptyAtSource { at: src.clone() }),
        Policy::Warn => {
            diags.push(Diagnostic::warning(src.clone(), "empty primitive, elided"));
            Ok(None)
        }
        Policy::Ignore => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_lang::scad::lower_source;
    use lamina_lang::src_ref::SourceBuffer;
    use lamina_lang::syn::parse_source;

    fn build(source: &str, cfg: &Config) -> Result<Csg3Node, GeomError> {
        let buf = SourceBuffer::new(source);
        let syn = parse_source(&buf).expect("parse");
        let scad = lower_source(&syn, false).expect("lower");
        let mut diags = DiagList::default();
        build_csg3(&scad, cfg, &mut diags)
    }

    #[test]
    fn cube_becomes_a_polyhedron_primitive() {
        let cfg = Config::default();
        let tree = build("cube([2,2,2], center=true);", &cfg).expect("build");
        match tree {
            Csg3Node::Op(BooleanOp::Union, children) => {
                assert_eq!(children.len(), 1);
                assert!(matches!(children[0], Csg3Node::Primitive(Primitive3::Polyhedron { .. })));
            }
            _ => panic!("expected a single-child union"),
        }
    }

    #[test]
    fn empty_cube_is_fatal_by_default() {
        let cfg = Config::default();
        let err = build("cube(0);", &cfg).expect_err("should be fatal");
        assert!(matches!(err, GeomError::EmptyAtSource { .. }));
    }

    #[test]
    fn difference_carries_children() {
        let cfg = Config::default();
        let tree = build("difference() { cube(10); translate([5,5,5]) cube(10); }", &cfg)
            .expect("build");
        match tree {
            Csg3Node::Op(BooleanOp::Union, children) => match &children[0] {
                Csg3Node::Op(BooleanOp::Difference, diff_children) => {
                    assert_eq!(diff_children.len(), 2);
                }
                other => panic!("expected difference node, got {other:?}"),
            },
            _ => panic!("expected union-wrapped forest"),
        }
    }

    #[test]
    fn disabled_node_is_dropped() {
        let cfg = Config::default();
        let tree = build("*cube(10);", &cfg).expect("build");
        match tree {
            Csg3Node::Op(BooleanOp::Union, children) => assert!(children.is_empty()),
            _ => panic!("expected empty union"),
        }
    }
}
