// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lexically scoped `$fn`/`$fa`/`$fs` environment (§4.2), threaded through
//! SCAD-lowering recursion: a child call inherits the nearest enclosing
//! value unless it sets its own. This generalizes the teacher's
//! scoped-symbol-environment pattern (`lang/eval/symbols`) down to the
//! three special variables this language actually has.

use lamina_core::Scalar;

/// OpenSCAD's default angle-based fragment step, in degrees.
pub const DEFAULT_FA: Scalar = 12.0;
/// OpenSCAD's default size-based fragment step, in millimeters.
pub const DEFAULT_FS: Scalar = 2.0;

/// The resolution hint baked into a primitive at SCAD-lowering time.
///
/// Per the §9 open question, a user-supplied `$fn=0` is treated identically
/// to "unset" (`None`) here, not as a literal zero-gon, matching the
/// original's observed behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionHint {
    /// Explicit `$fn`, if set and nonzero.
    pub fn_: Option<u32>,
    /// `$fa`, angle step in degrees.
    pub fa: Scalar,
    /// `$fs`, size step in millimeters.
    pub fs: Scalar,
}

impl Default for ResolutionHint {
    fn default() -> Self {
        Self {
            fn_: None,
            fa: DEFAULT_FA,
            fs: DEFAULT_FS,
        }
    }
}

/// A single scope frame: only the keys a call actually set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FnEnvDelta {
    /// `$fn` override, if this call set one (`0` is recorded, then treated
    /// as unset when resolving — see [`ResolutionHint`]).
    pub fn_: Option<u32>,
    /// `$fa` override, if set.
    pub fa: Option<Scalar>,
    /// `$fs` override, if set.
    pub fs: Option<Scalar>,
}

impl ResolutionHint {
    /// Apply a child call's own `$fn`/`$fa`/`$fs` settings, producing the
    /// environment its own children should inherit.
    pub fn apply(&self, delta: FnEnvDelta) -> Self {
        Self {
            fn_: match delta.fn_ {
                Some(0) | None => self.fn_,
                Some(n) => Some(n),
            },
            fa: delta.fa.unwrap_or(self.fa),
            fs: delta.fs.unwrap_or(self.fs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_zero_is_treated_as_unset() {
        let parent = ResolutionHint {
            fn_: Some(6),
            ..Default::default()
        };
        let child = parent.apply(FnEnvDelta {
            fn_: Some(0),
            ..Default::default()
        });
        assert_eq!(child.fn_, Some(6));
    }

    #[test]
    fn child_overrides_only_set_keys() {
        let parent = ResolutionHint {
            fn_: Some(6),
            fa: 12.0,
            fs: 2.0,
        };
        let child = parent.apply(FnEnvDelta {
            fs: Some(0.5),
            ..Default::default()
        });
        assert_eq!(child.fn_, Some(6));
        assert_eq!(child.fa, 12.0);
        assert_eq!(child.fs, 0.5);
    }
}
