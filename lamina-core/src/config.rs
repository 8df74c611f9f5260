// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The configuration surface honoured by the core (§6), gathered into a
//! single immutable struct constructed once by the caller (CLI or test) and
//! threaded by reference through every geometric function — the §9
//! re-architecture of "process-wide epsilons (global state)" generalized to
//! the whole configuration surface, not only the epsilons.

use crate::{Epsilon, Policy, PolicySet, Scalar};

/// Optional user override for the range scheduler (§4.4).
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeOverride {
    /// Override for `z_min`.
    pub z_min: Option<Scalar>,
    /// Override for `z_max`.
    pub z_max: Option<Scalar>,
    /// Override for `z_step`.
    pub z_step: Option<Scalar>,
}

/// Which optional optimisations the CSG2 Boolean evaluator applies (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct OptimisationFlags {
    /// Collapse collinear edges in evaluator output.
    pub drop_collinear: bool,
    /// Skip empty operand paths before evaluating a Boolean expression.
    pub skip_empty: bool,
}

impl Default for OptimisationFlags {
    fn default() -> Self {
        Self {
            drop_collinear: true,
            skip_empty: true,
        }
    }
}

/// The process-wide configuration, immutable once constructed (§5).
#[derive(Debug, Clone)]
pub struct Config {
    /// Range overrides for the z-plane scheduler.
    pub range: RangeOverride,
    /// Cap on `$fn`-resolved polygon-approximation counts (§4.3).
    pub max_fn: u32,
    /// Gap applied between adjacent printed layers by some output writers.
    /// `-1.0` is special-cased per writer (§9 open question): STL treats it
    /// as `0.01`, SCAD/JS treat it as `0.0`. Any other negative value is
    /// passed through unchanged (undocumented upstream, preserved as-is).
    pub layer_gap: Scalar,
    /// Upper bound on simultaneous CSG2 Boolean operands per evaluation
    /// stage (§4.6). Clamped to `[2, MAX_LAZY]` by [`Config::new`].
    pub max_simultaneous: usize,
    /// Optional optimisations for the Boolean evaluator.
    pub optimisation: OptimisationFlags,
    /// Policies for the four downgradable `GeomError` subkinds.
    pub policy: PolicySet,
    /// The three numeric epsilons.
    pub epsilon: Epsilon,
    /// Whether the JS/WebGL writer should randomize per-layer colors.
    pub color_rand: bool,
    /// Number of worker threads for the per-layer data-parallel region
    /// (§5). `0` means "use `std::thread::available_parallelism()`".
    pub worker_threads: usize,
}

/// Implementation-defined hard upper bound on `max_simultaneous` (§4.6).
pub const MAX_LAZY: usize = 10;

impl Config {
    /// Construct a config, clamping `max_simultaneous` into `[2, MAX_LAZY]`.
    pub fn new(
        range: RangeOverride,
        max_fn: u32,
        layer_gap: Scalar,
        max_simultaneous: usize,
        optimisation: OptimisationFlags,
        policy: PolicySet,
        epsilon: Epsilon,
        color_rand: bool,
        worker_threads: usize,
    ) -> Self {
        Self {
            range,
            max_fn,
            layer_gap,
            max_simultaneous: max_simultaneous.clamp(2, MAX_LAZY),
            optimisation,
            policy,
            epsilon,
            color_rand,
            worker_threads,
        }
    }

    /// Resolve `layer_gap` for the STL writer's `-1` special case.
    pub fn layer_gap_for_stl(&self) -> Scalar {
        if self.layer_gap == -1.0 {
            0.01
        } else {
            self.layer_gap
        }
    }

    /// Resolve `layer_gap` for the SCAD/JS writers' `-1` special case.
    pub fn layer_gap_for_scad_js(&self) -> Scalar {
        if self.layer_gap == -1.0 {
            0.0
        } else {
            self.layer_gap
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            range: RangeOverride::default(),
            max_fn: 360,
            layer_gap: -1.0,
            max_simultaneous: MAX_LAZY,
            optimisation: OptimisationFlags::default(),
            policy: PolicySet {
                empty_at_source: Policy::Error,
                collapsed_by_transform: Policy::Error,
                object_3d_in_2d: Policy::Error,
                object_2d_in_3d: Policy::Error,
            },
            epsilon: Epsilon::default(),
            color_rand: false,
            worker_threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_simultaneous_is_clamped() {
        let cfg = Config::new(
            RangeOverride::default(),
            360,
            -1.0,
            1,
            OptimisationFlags::default(),
            PolicySet::default(),
            Epsilon::default(),
            false,
            0,
        );
        assert_eq!(cfg.max_simultaneous, 2);

        let cfg = Config::new(
            RangeOverride::default(),
            360,
            -1.0,
            1000,
            OptimisationFlags::default(),
            PolicySet::default(),
            Epsilon::default(),
            false,
            0,
        );
        assert_eq!(cfg.max_simultaneous, MAX_LAZY);
    }

    #[test]
    fn layer_gap_special_case() {
        let mut cfg = Config::default();
        cfg.layer_gap = -1.0;
        assert_eq!(cfg.layer_gap_for_stl(), 0.01);
        assert_eq!(cfg.layer_gap_for_scad_js(), 0.0);

        cfg.layer_gap = -2.0;
        assert_eq!(cfg.layer_gap_for_stl(), -2.0);
        assert_eq!(cfg.layer_gap_for_scad_js(), -2.0);
    }
}
