// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The per-layer polygon set (§3 "CSG2 operand tree" / "Flat polygon").
//!
//! A vertex array plus a set of closed, oriented paths is exactly a
//! `geo::MultiPolygon` — outer rings CCW, holes CW, which is also `geo`'s
//! own winding convention, so no bespoke representation is needed. This is
//! the teacher's `Geometry2D::Collection` reduced to the one variant this
//! language needs (`core/geo2d/geometry.rs`).

use crate::{Epsilon, Scalar};
use geo::{Area, MultiPolygon, Polygon};

/// A per-layer collection of polygons (possibly with holes).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometries2D(pub MultiPolygon<Scalar>);

impl Geometries2D {
    /// The empty polygon set.
    pub fn empty() -> Self {
        Self(MultiPolygon::new(Vec::new()))
    }

    /// Wrap a single polygon.
    pub fn single(polygon: Polygon<Scalar>) -> Self {
        Self(MultiPolygon::new(vec![polygon]))
    }

    /// True if this polygon set has no area.
    pub fn is_empty(&self) -> bool {
        self.0.0.is_empty()
    }

    /// Unsigned area of all polygons in this set.
    pub fn area(&self) -> Scalar {
        self.0.unsigned_area()
    }

    /// Apply a Boolean combinator against another operand (§4.6).
    pub fn boolean_op(&self, other: &Self, op: crate::BooleanOp) -> Self {
        use geo::BooleanOps;
        Self(self.0.boolean_op(&other.0, op.into()))
    }

    /// Symmetric difference against another operand, used only by the
    /// layer-difference pass (§4.8) — not one of the three CSG2 combinators
    /// (§4.6), so it is kept off the `BooleanOp` enum.
    pub fn xor(&self, other: &Self) -> Self {
        use geo::BooleanOps;
        Self(self.0.boolean_op(&other.0, geo::OpType::Xor))
    }

    /// Snap every vertex to the `pt` grid and drop zero-area rings (§4.6).
    pub fn snapped(&self, eps: &Epsilon) -> Self {
        let polygons: Vec<Polygon<Scalar>> = self
            .0
             .0
            .iter()
            .map(|p| snap_polygon(p, eps))
            .filter(|p| p.unsigned_area() > eps.sqr)
            .collect();
        Self(MultiPolygon::new(polygons))
    }
}

fn snap_line_string(ls: &geo::LineString<Scalar>, eps: &Epsilon) -> geo::LineString<Scalar> {
    let mut coords: Vec<geo::Coord<Scalar>> = ls.0.iter().map(|c| eps.snap_coord(*c)).collect();
    // Fuse consecutive vertices that collapsed onto the same grid cell.
    coords.dedup_by(|a, b| eps.point_eq(*a, *b));
    if coords.len() > 1 && eps.point_eq(coords[0], *coords.last().expect("non-empty")) {
        coords.pop();
    }
    geo::LineString::new(coords)
}

fn snap_polygon(p: &Polygon<Scalar>, eps: &Epsilon) -> Polygon<Scalar> {
    let exterior = snap_line_string(p.exterior(), eps);
    let interiors: Vec<_> = p
        .interiors()
        .iter()
        .map(|r| snap_line_string(r, eps))
        .filter(|r| r.0.len() >= 3)
        .collect();
    Polygon::new(exterior, interiors)
}

impl From<MultiPolygon<Scalar>> for Geometries2D {
    fn from(mp: MultiPolygon<Scalar>) -> Self {
        Self(mp)
    }
}

impl From<Geometries2D> for MultiPolygon<Scalar> {
    fn from(g: Geometries2D) -> Self {
        g.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Coord};

    #[test]
    fn union_is_idempotent() {
        let eps = Epsilon::default();
        let square = Geometries2D::single(polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ]);
        let unioned = square.boolean_op(&square, crate::BooleanOp::Union).snapped(&eps);
        let area_before = square.area();
        let area_after = unioned.area();
        assert!((area_before - area_after).abs() < 1e-6);
    }

    #[test]
    fn snap_drops_zero_area_rings() {
        let eps = Epsilon::new(1.0, 1e-9, 1e-9);
        let degenerate = Geometries2D::single(Polygon::new(
            geo::LineString::new(vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.2, y: 0.0 },
                Coord { x: 0.1, y: 0.2 },
            ]),
            vec![],
        ));
        let snapped = degenerate.snapped(&eps);
        assert!(snapped.is_empty());
    }
}
