// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ring orientation helpers enforcing the CSG2 invariant (§3): outer rings
//! wind counter-clockwise, holes clockwise. Parametric primitive slicing
//! doesn't always know its own handedness up front (an arbitrary affine
//! transform can flip it), so every ring built from scratch is normalized
//! here rather than trusted to come out right by construction.

use lamina_core::Scalar;

/// The shoelace signed area of a coordinate ring (positive for CCW).
pub fn signed_area(coords: &[(Scalar, Scalar)]) -> Scalar {
    let n = coords.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (ax, ay) = coords[i];
        let (bx, by) = coords[(i + 1) % n];
        sum += ax * by - bx * ay;
    }
    sum * 0.5
}

/// Build a polygon (no holes) from a coordinate ring, reversing it first if
/// necessary so the exterior winds CCW.
pub fn ccw_polygon(mut coords: Vec<(Scalar, Scalar)>) -> geo::Polygon<Scalar> {
    if signed_area(&coords) < 0.0 {
        coords.reverse();
    }
    geo::Polygon::new(geo::LineString::from(coords), vec![])
}

/// Re-enforce ring orientation on a polygon whose rings passed through an
/// arbitrary affine transform (which may flip handedness): exterior CCW,
/// each interior CW, decided per-ring rather than assuming the whole
/// polygon flipped uniformly.
pub fn normalize_polygon(p: &geo::Polygon<Scalar>) -> geo::Polygon<Scalar> {
    let ext_coords: Vec<(Scalar, Scalar)> = p.exterior().coords().map(|c| (c.x, c.y)).collect();
    let exterior = orient_ring(ext_coords, true);
    let interiors = p
        .interiors()
        .iter()
        .map(|r| orient_ring(r.coords().map(|c| (c.x, c.y)).collect(), false))
        .collect();
    geo::Polygon::new(exterior, interiors)
}

/// Same, for a whole [`geo::MultiPolygon`].
pub fn normalize_multipolygon(mp: &geo::MultiPolygon<Scalar>) -> geo::MultiPolygon<Scalar> {
    geo::MultiPolygon::new(mp.iter().map(normalize_polygon).collect())
}

fn orient_ring(mut coords: Vec<(Scalar, Scalar)>, ccw: bool) -> geo::LineString<Scalar> {
    let area_positive = signed_area(&coords) > 0.0;
    if area_positive != ccw {
        coords.reverse();
    }
    geo::LineString::from(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_clockwise_rings() {
        let cw = vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
        assert!(signed_area(&cw) < 0.0);
        let p = ccw_polygon(cw);
        assert!(signed_area(&p.exterior().coords().map(|c| (c.x, c.y)).collect::<Vec<_>>()) > 0.0);
    }
}
