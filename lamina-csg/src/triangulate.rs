// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-layer triangulation (§4.7): delegates to `geo::TriangulateEarcut`
//! (`earcut_triangles_raw`), exactly as the teacher's `core/geo3d/extrude.rs`
//! does for its own extrusion end-caps, generalized from "cap a 3D
//! extrusion" to "triangulate a 2D layer polygon." Ear-clipping already
//! satisfies §4.7's three requirements for free: no Steiner points (every
//! output vertex is an earcut input vertex), holes bridged by construction,
//! and union-of-triangles-equals-interior is earcut's own correctness
//! contract. The only thing added here is filtering the occasional
//! sub-epsilon-area sliver earcut emits on collinear input.

use geo::TriangulateEarcut;
use lamina_core::geo2d::Geometries2D;
use lamina_core::{Epsilon, Scalar};

/// A layer's triangulation: a flat vertex array plus index triples into it,
/// every triangle non-degenerate (§4.7).
#[derive(Debug, Clone, Default)]
pub struct Triangles {
    /// Triangulated vertex positions (2D, in the layer's world frame).
    pub vertices: Vec<(Scalar, Scalar)>,
    /// Index triples into `vertices`, one per triangle.
    pub triangles: Vec<[usize; 3]>,
}

/// Triangulate every polygon of a flat layer (§4.7), filtering out
/// non-degenerate triangles below `sqr` epsilon area.
pub fn triangulate_layer(layer: &Geometries2D, eps: &Epsilon) -> Triangles {
    let mut out = Triangles::default();
    for polygon in layer.0.iter() {
        let raw = polygon.earcut_triangles_raw();
        let base = out.vertices.len();
        for xy in raw.vertices.chunks_exact(2) {
            out.vertices.push((xy[0], xy[1]));
        }
        for tri in raw.triangle_indices.chunks_exact(3) {
            let [a, b, c] = [base + tri[0], base + tri[1], base + tri[2]];
            if triangle_area(out.vertices[a], out.vertices[b], out.vertices[c]) > eps.sqr {
                out.triangles.push([a, b, c]);
            }
        }
    }
    out
}

fn triangle_area(a: (Scalar, Scalar), b: (Scalar, Scalar), c: (Scalar, Scalar)) -> Scalar {
    (0.5 * ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1))).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn triangulates_a_square_into_non_degenerate_triangles() {
        let eps = Epsilon::default();
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        let layer = Geometries2D(MultiPolygon::new(vec![square]));
        let tris = triangulate_layer(&layer, &eps);
        assert_eq!(tris.triangles.len(), 2);
        let total: Scalar = tris
            .triangles
            .iter()
            .map(|[a, b, c]| triangle_area(tris.vertices[*a], tris.vertices[*b], tris.vertices[*c]))
            .sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn every_vertex_comes_from_the_input_polygon() {
        let eps = Epsilon::default();
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];
        let layer = Geometries2D(MultiPolygon::new(vec![square.clone()]));
        let tris = triangulate_layer(&layer, &eps);
        let input_coords: Vec<(Scalar, Scalar)> =
            square.exterior().coords().map(|c| (c.x, c.y)).collect();
        for (x, y) in &tris.vertices {
            assert!(input_coords
                .iter()
                .any(|(ix, iy)| (ix - x).abs() < 1e-9 && (iy - y).abs() < 1e-9));
        }
    }
}
