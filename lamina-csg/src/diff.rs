// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The layer-difference pass (§4.8), optional and used only by the WebGL
//! writer: replaces each layer `i` (from the top down) with the symmetric
//! difference between it and layer `i-1`, so coincident faces between
//! adjacent layers disappear from the preview mesh. Layer 0 is unchanged.

use lamina_core::geo2d::Geometries2D;

/// Compute the layer-difference pass over an already-evaluated (§4.6) stack
/// of per-layer flat polygon sets, ascending by layer index.
pub fn layer_differences(layers: &[Geometries2D]) -> Vec<Geometries2D> {
    if layers.is_empty() {
        return Vec::new();
    }
    let mut out = layers.to_vec();
    for i in (1..out.len()).rev() {
        out[i] = layers[i].xor(&layers[i - 1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(min: f64, max: f64) -> Geometries2D {
        Geometries2D(MultiPolygon::new(vec![polygon![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
        ]]))
    }

    #[test]
    fn first_layer_is_unchanged() {
        let layers = vec![square(0.0, 10.0), square(0.0, 10.0)];
        let diffed = layer_differences(&layers);
        assert_eq!(diffed[0], layers[0]);
    }

    #[test]
    fn identical_adjacent_layers_cancel_to_empty() {
        let layers = vec![square(0.0, 10.0), square(0.0, 10.0), square(0.0, 10.0)];
        let diffed = layer_differences(&layers);
        assert!(diffed[1].is_empty());
        assert!(diffed[2].is_empty());
    }

    #[test]
    fn differing_adjacent_layers_leave_the_non_overlapping_region() {
        let layers = vec![square(0.0, 10.0), square(5.0, 15.0)];
        let diffed = layer_differences(&layers);
        assert!((diffed[1].area() - 150.0).abs() < 1e-6);
    }
}
