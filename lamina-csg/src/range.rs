// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The range/scheduler pass (§4.4): computes the CSG3 tree's bounding box,
//! picks the stack of z-planes, and hands out an atomic "next layer index"
//! dispenser — the concurrency seam described in §5.

use crate::csg3::Csg3Node;
use lamina_core::{BooleanOp, Bounds3, Config, Scalar, Vec3};
use std::sync::atomic::{AtomicUsize, Ordering};

/// The stack of horizontal cutting planes (§3 "Range"): `z_min`, `z_step`,
/// and a `count >= 1` of evenly-spaced layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Lowest layer's z.
    pub z_min: Scalar,
    /// Spacing between consecutive layers.
    pub z_step: Scalar,
    /// Number of layers, always `>= 1`.
    pub count: usize,
}

impl Range {
    /// The z-value of layer `i`, `0 <= i < count`.
    pub fn z_at(&self, i: usize) -> Scalar {
        self.z_min + (i as Scalar) * self.z_step
    }

    /// Choose the range from the CSG3 tree's bounding box and the
    /// configured overrides (§4.4): user overrides take precedence;
    /// otherwise layers are sampled at cell centres,
    /// `z_min = bb.min.z + step/2`, `z_max = bb.max.z`.
    pub fn from_tree(tree: &Csg3Node, cfg: &Config) -> Self {
        let bb = bounds_of(tree, true);
        let z_step = cfg.range.z_step.unwrap_or(1.0);
        let (bb_min, bb_max) = match (bb.z_min(), bb.z_max()) {
            (Some(min), Some(max)) => (min, max),
            _ => (0.0, 0.0),
        };
        let z_min = cfg.range.z_min.unwrap_or(bb_min + z_step / 2.0);
        let z_max = cfg.range.z_max.unwrap_or(bb_max);
        let count = if z_step <= 0.0 {
            1
        } else {
            (1 + ((z_max - z_min) / z_step).floor().max(0.0) as usize).max(1)
        };
        Self { z_min, z_step, count }
    }
}

/// Compute the CSG3 tree's full bounding box (§4.4).
///
/// `include_subtracted` selects between the scheduler's two modes: `true`
/// counts a `difference`'s subtrahend children into the box (the
/// conservative choice, guaranteeing every layer that could possibly carve
/// something out of the base solid is sampled); `false` only considers the
/// base (first) operand of each `difference`, ignoring geometry that is
/// only ever subtracted.
pub fn bounds_of(node: &Csg3Node, include_subtracted: bool) -> Bounds3 {
    match node {
        Csg3Node::Primitive(p) => {
            let (min, max) = p.local_bounds();
            let m = p.transform();
            let mut bb = Bounds3::empty();
            for corner in corners(min, max) {
                use cgmath::{Point3, Transform};
                let world = m.transform_point(Point3::new(corner.x, corner.y, corner.z));
                bb.extend_point(Vec3::new(world.x, world.y, world.z));
            }
            bb
        }
        Csg3Node::Op(BooleanOp::Difference, children) => {
            let mut iter = children.iter();
            let mut bb = match iter.next() {
                Some(first) => bounds_of(first, include_subtracted),
                None => Bounds3::empty(),
            };
            if include_subtracted {
                for child in iter {
                    bb.extend(bounds_of(child, include_subtracted));
                }
            }
            bb
        }
        Csg3Node::Op(BooleanOp::Intersection, children) => {
            intersect_bounds(children, include_subtracted)
        }
        Csg3Node::Op(BooleanOp::Union, children) => {
            let mut bb = Bounds3::empty();
            for child in children {
                bb.extend(bounds_of(child, include_subtracted));
            }
            bb
        }
    }
}

fn intersect_bounds(children: &[Csg3Node], include_subtracted: bool) -> Bounds3 {
    let mut iter = children.iter().map(|c| bounds_of(c, include_subtracted));
    let Some(mut acc) = iter.next() else {
        return Bounds3::empty();
    };
    for bb in iter {
        acc = match (acc.min, acc.max, bb.min, bb.max) {
            (Some(amin), Some(amax), Some(bmin), Some(bmax)) => {
                let min = Vec3::new(amin.x.max(bmin.x), amin.y.max(bmin.y), amin.z.max(bmin.z));
                let max = Vec3::new(amax.x.min(bmax.x), amax.y.min(bmax.y), amax.z.min(bmax.z));
                if min.x > max.x || min.y > max.y || min.z > max.z {
                    Bounds3::empty()
                } else {
                    Bounds3 { min: Some(min), max: Some(max) }
                }
            }
            _ => Bounds3::empty(),
        };
    }
    acc
}

fn corners(min: Vec3, max: Vec3) -> [Vec3; 8] {
    [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ]
}

/// Hands out sequential layer indices `0..count` to worker threads, the
/// only piece of state they all contend on besides the error sink (§5).
#[derive(Debug)]
pub struct LayerDispenser {
    next: AtomicUsize,
    count: usize,
}

impl LayerDispenser {
    /// Create a dispenser for `range.count` layers.
    pub fn new(range: &Range) -> Self {
        Self { next: AtomicUsize::new(0), count: range.count }
    }

    /// Atomically take the next layer index, or `None` once exhausted.
    pub fn next(&self) -> Option<usize> {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        if i < self.count {
            Some(i)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{cube_to_polyhedron, Primitive3};
    use lamina_core::Mat4;

    fn cube_node(size: Vec3, transform: Mat4) -> Csg3Node {
        let (points, faces) = cube_to_polyhedron(size, false);
        Csg3Node::Primitive(Primitive3::Polyhedron { points, faces, transform })
    }

    #[test]
    fn range_from_cube_matches_boundary_scenario_1() {
        let tree = Csg3Node::Op(
            BooleanOp::Union,
            vec![cube_node(Vec3::new(10.0, 10.0, 10.0), Mat4::from_scale(1.0))],
        );
        let mut cfg = Config::default();
        cfg.range.z_step = Some(5.0);
        let range = Range::from_tree(&tree, &cfg);
        assert_eq!(range.count, 2);
        assert!((range.z_at(0) - 2.5).abs() < 1e-9);
        assert!((range.z_at(1) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn dispenser_hands_out_each_index_once() {
        let range = Range { z_min: 0.0, z_step: 1.0, count: 5 };
        let dispenser = LayerDispenser::new(&range);
        let mut seen = Vec::new();
        while let Some(i) = dispenser.next() {
            seen.push(i);
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(dispenser.next(), None);
    }

    #[test]
    fn difference_ignoring_subtracted_uses_only_base() {
        let base = cube_node(Vec3::new(10.0, 10.0, 10.0), Mat4::from_scale(1.0));
        let sub = cube_node(
            Vec3::new(2.0, 2.0, 2.0),
            Mat4::from_translation(Vec3::new(0.0, 0.0, 20.0)),
        );
        let tree = Csg3Node::Op(BooleanOp::Difference, vec![base, sub]);
        let including = bounds_of(&tree, true);
        let ignoring = bounds_of(&tree, false);
        assert!(including.z_max().expect("non-empty") > 15.0);
        assert!(ignoring.z_max().expect("non-empty") < 10.0);
    }
}
