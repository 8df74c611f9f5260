// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The per-layer CSG2 operand tree and its Boolean evaluator (§3 "CSG2
//! operand tree", §4.6 "Boolean evaluator"): isomorphic to the CSG3 tree
//! but materialized into flat polygon leaves, one tree per sliced layer.
//!
//! `geo`'s own `BooleanOps` is only binary, so the "evaluate an arbitrary
//! number of operands simultaneously, up to `max_simultaneous`" contract
//! (§4.6) is realized by partitioning a node's operands into chunks of at
//! most `max_simultaneous`, folding each chunk pairwise, and recursing on
//! the (smaller) list of per-chunk results until one remains — "when a
//! node has more children than the cap, the evaluator partitions children
//! and evaluates in stages."

use crate::csg3::Csg3Node;
use crate::slice::slice_primitive;
use lamina_core::geo2d::Geometries2D;
use lamina_core::{BooleanOp, Config, Epsilon, Scalar};

/// A per-layer CSG2 node: either a flat polygon leaf (a sliced primitive,
/// already in world-space layer coordinates) or a Boolean combinator over
/// child nodes.
#[derive(Debug, Clone)]
pub enum Csg2Node {
    /// A materialized polygon set.
    Leaf(Geometries2D),
    /// A Boolean combinator over an arbitrary number of operands.
    Op(BooleanOp, Vec<Csg2Node>),
}

impl Csg2Node {
    /// Evaluate this node down to a single flat polygon set (§4.6).
    pub fn evaluate(&self, cfg: &Config) -> Geometries2D {
        match self {
            Csg2Node::Leaf(g) => g.clone(),
            Csg2Node::Op(op, children) => {
                let mut operands: Vec<Geometries2D> =
                    children.iter().map(|c| c.evaluate(cfg)).collect();
                // An empty operand only vanishes harmlessly from a union or
                // from difference's subtrahends; dropping one from an
                // intersection would turn "nothing in common" into
                // "whatever's left" (§4.6, §8 "intersection commutes").
                if cfg.optimisation.skip_empty && *op != BooleanOp::Intersection {
                    operands.retain(|g| !g.is_empty());
                }
                fold_boolean(*op, operands, cfg)
            }
        }
    }
}

/// Fold a flat operand list through a single Boolean combinator,
/// partitioning into `cfg.max_simultaneous`-sized chunks and recursing
/// (§4.6). `Difference` is `operands[0]` minus the union of the rest, per
/// the combinator's own semantics (§3 "SUB = difference-of-children").
pub fn fold_boolean(op: BooleanOp, operands: Vec<Geometries2D>, cfg: &Config) -> Geometries2D {
    if operands.is_empty() {
        return Geometries2D::empty();
    }
    match op {
        BooleanOp::Union => balanced_fold(BooleanOp::Union, operands, cfg),
        BooleanOp::Intersection => balanced_fold(BooleanOp::Intersection, operands, cfg),
        BooleanOp::Difference => {
            let mut iter = operands.into_iter();
            let base = iter.next().expect("checked non-empty above");
            let rest: Vec<Geometries2D> = iter.collect();
            if rest.is_empty() {
                return base.snapped(&cfg.epsilon);
            }
            let subtrahend = balanced_fold(BooleanOp::Union, rest, cfg);
            base.boolean_op(&subtrahend, BooleanOp::Difference)
                .snapped(&cfg.epsilon)
        }
    }
}

/// Materialize the CSG2 operand tree for one layer (§4.5/§4.6): isomorphic
/// to the CSG3 combinator tree, with each primitive leaf replaced by its
/// sliced cross-section at `z_layer`.
pub fn slice_tree(tree: &Csg3Node, z_layer: Scalar, eps: &Epsilon) -> Csg2Node {
    match tree {
        Csg3Node::Primitive(p) => Csg2Node::Leaf(slice_primitive(p, z_layer, eps)),
        Csg3Node::Op(op, children) => {
            Csg2Node::Op(*op, children.iter().map(|c| slice_tree(c, z_layer, eps)).collect())
        }
    }
}

/// Commutative-op balanced reduction, capped at `cfg.max_simultaneous`
/// operands combined per stage.
fn balanced_fold(op: BooleanOp, items: Vec<Geometries2D>, cfg: &Config) -> Geometries2D {
    let mut level = items;
    if level.is_empty() {
        return Geometries2D::empty();
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(cfg.max_simultaneous));
        for chunk in level.chunks(cfg.max_simultaneous) {
            let mut acc = chunk[0].clone();
            for g in &chunk[1..] {
                acc = acc.boolean_op(g, op);
            }
            next.push(acc.snapped(&cfg.epsilon));
        }
        level = next;
    }
    level.into_iter().next().unwrap_or_else(Geometries2D::empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};
    use lamina_core::Scalar;

    fn square(min: Scalar, max: Scalar) -> Polygon<Scalar> {
        polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
        ]
    }

    #[test]
    fn union_of_many_operands_respects_cap() {
        let cfg = Config::default();
        let operands: Vec<Geometries2D> = (0..7)
            .map(|i| Geometries2D::single(square(i as Scalar, i as Scalar + 1.0)))
            .collect();
        let result = fold_boolean(BooleanOp::Union, operands, &cfg);
        assert!((result.area() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn difference_subtracts_all_but_first() {
        let cfg = Config::default();
        let base = Geometries2D::single(square(0.0, 10.0));
        let a = Geometries2D::single(square(0.0, 2.0));
        let b = Geometries2D::single(square(8.0, 10.0));
        let result = fold_boolean(BooleanOp::Difference, vec![base, a, b], &cfg);
        assert!((result.area() - 92.0).abs() < 1e-6);
    }

    #[test]
    fn evaluate_tree_of_ops() {
        let cfg = Config::default();
        let tree = Csg2Node::Op(
            BooleanOp::Union,
            vec![
                Csg2Node::Leaf(Geometries2D::single(square(0.0, 5.0))),
                Csg2Node::Leaf(Geometries2D::single(square(4.0, 9.0))),
            ],
        );
        let result = tree.evaluate(&cfg);
        assert!(result.area() > 25.0 && result.area() < 50.0);
    }
}
