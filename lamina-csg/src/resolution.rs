// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Round-primitive polygon approximation segment count (§4.2 "Primitive fn
//! resolution"): `min(user_fn, max_fn)` if set, else derived from
//! `$fa`/`$fs` and the primitive's radius.

use lamina_core::Scalar;
use lamina_lang::scad::ResolutionHint;

/// Resolve the number of polygon segments approximating a round primitive
/// of the given radius, given its lexically-scoped `$fn`/`$fa`/`$fs` hint
/// and the configured `max_fn` cap.
pub fn fragments_for(radius: Scalar, hint: &ResolutionHint, max_fn: u32) -> u32 {
    if let Some(fn_) = hint.fn_ {
        return fn_.clamp(3, max_fn);
    }
    // OpenSCAD's own derivation: the smaller of the angular-step (`$fa`,
    // degrees) and arc-step (`$fs`, mm) segment counts, floored at 5.
    let circumference = 2.0 * std::f64::consts::PI * radius;
    let by_angle = (360.0 / hint.fa).ceil();
    let by_size = (circumference / hint.fs).ceil();
    let n = by_angle.min(by_size).max(5.0);
    (n as u32).clamp(3, max_fn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_fn_wins_and_is_clamped_to_max() {
        let hint = ResolutionHint { fn_: Some(500), ..Default::default() };
        assert_eq!(fragments_for(10.0, &hint, 100), 100);
    }

    #[test]
    fn derives_from_fa_fs_when_fn_unset() {
        let hint = ResolutionHint::default();
        let n = fragments_for(10.0, &hint, 360);
        assert!(n >= 5);
    }

    #[test]
    fn small_radius_still_has_a_floor() {
        let hint = ResolutionHint::default();
        let n = fragments_for(0.01, &hint, 360);
        assert!(n >= 5);
    }
}
