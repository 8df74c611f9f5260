// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! User-selectable policy for the four downgradable `GeomError` subkinds
//! (§4.3 empty-primitive policy, §6 configuration surface, §7 error design).

/// How a recoverable geometry condition should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Abort the pipeline with a fatal `GeomError` (default).
    #[default]
    Error,
    /// Emit a warning and continue, eliding the offending node.
    Warn,
    /// Silently elide the offending node.
    Ignore,
}

/// The four independently configurable policies named in §4.3/§6.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicySet {
    /// A primitive that is empty at the source (e.g. `cube(0)`).
    pub empty_at_source: Policy,
    /// A primitive whose geometry is collapsed by a transform (e.g. `scale([0,1,1])`).
    pub collapsed_by_transform: Policy,
    /// A 3D object appearing in a 2D-only context.
    pub object_3d_in_2d: Policy,
    /// A 2D object appearing in a 3D-only context.
    pub object_2d_in_3d: Policy,
}
