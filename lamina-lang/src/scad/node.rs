// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The typed SCAD node (§3 "SCAD node"): a tagged variant over the
//! recognized functor set, per the §9 design note "heterogeneous IR trees
//! via a base object type... Strategy: tagged unions... exhaustive case
//! handling enforced by the compiler."

use crate::scad::env::ResolutionHint;
use crate::src_ref::{SrcRef, SrcReferrer};
use crate::syn::Modifier;
use lamina_core::{Mat4, Scalar, Vec2, Vec3};

/// A recognized functor, typed and with its arguments resolved (§3, §4.2).
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
pub enum ScadTag {
    /// `cube(size)` / `cube([x,y,z])`, optionally `center`.
    Cube {
        /// Edge lengths.
        size: Vec3,
        /// Whether the cube is centered on the origin (else one corner is).
        center: bool,
    },
    /// `sphere(r)`.
    Sphere {
        /// Radius.
        radius: Scalar,
        /// Resolution hint baked in at lowering time.
        resolution: ResolutionHint,
    },
    /// `cylinder(h, r1, r2)`, or `cylinder(h, r)` for a uniform radius.
    Cylinder {
        /// Bottom radius.
        radius_bottom: Scalar,
        /// Top radius.
        radius_top: Scalar,
        /// Height along z.
        height: Scalar,
        /// Whether the cylinder is centered on z=0 (else it spans `[0,height]`).
        center: bool,
        /// Resolution hint baked in at lowering time.
        resolution: ResolutionHint,
    },
    /// `polyhedron(points, faces)`.
    Polyhedron {
        /// Vertex positions.
        points: Vec<Vec3>,
        /// Per-face vertex index lists, each a planar polygon.
        faces: Vec<Vec<usize>>,
    },
    /// `square(size)`, optionally `center`.
    Square {
        /// Edge lengths.
        size: Vec2,
        /// Whether centered on the origin.
        center: bool,
    },
    /// `circle(r)`.
    Circle {
        /// Radius.
        radius: Scalar,
        /// Resolution hint baked in at lowering time.
        resolution: ResolutionHint,
    },
    /// `polygon(points)`.
    Polygon {
        /// Ordered boundary points.
        points: Vec<Vec2>,
    },
    /// `union() { ... }`.
    Union,
    /// `difference() { ... }`: first child minus the rest.
    Difference,
    /// `intersection() { ... }`.
    Intersection,
    /// An implicit or explicit `group() { ... }` (also a bare `{ ... }`
    /// block per §4.1's grammar): union semantics, preserved as its own
    /// tag since it is not a user-written Boolean operator.
    Group,
    /// `translate(v)`.
    Translate {
        /// Translation vector.
        v: Vec3,
    },
    /// `rotate(a, v)`: rotate by angle `a` (degrees) around axis `v`.
    Rotate {
        /// Rotation angle, in degrees.
        angle_deg: Scalar,
        /// Rotation axis (need not be normalized).
        axis: Vec3,
    },
    /// `scale(v)`.
    Scale {
        /// Per-axis scale factors.
        v: Vec3,
    },
    /// `multmatrix(m)`: an explicit 4x4 affine transform.
    Multmatrix {
        /// The transform matrix.
        m: Mat4,
    },
    /// `mirror(v)`: reflect across the plane through the origin
    /// perpendicular to `v`.
    Mirror {
        /// Mirror plane normal.
        v: Vec3,
    },
    /// `linear_extrude(height)`: extrude a 2D profile along z.
    LinearExtrude {
        /// Extrusion height.
        height: Scalar,
        /// Whether the extrusion is centered on z=0.
        center: bool,
        /// Twist applied over the full height, in degrees.
        twist_deg: Scalar,
        /// Uniform scale factor applied at the top of the extrusion.
        scale: Scalar,
    },
}

/// A typed SCAD node: `ScadTag` plus modifiers, children and location.
#[derive(Debug, Clone, PartialEq)]
pub struct ScadNode {
    /// This node's functor tag and resolved attributes.
    pub tag: ScadTag,
    /// Modifier prefixes carried over from the SYN call (§4.1 `mod`).
    pub modifiers: Vec<Modifier>,
    /// Ordered child list.
    pub children: Vec<ScadNode>,
    /// Where it came from.
    pub src_ref: SrcRef,
}

impl SrcReferrer for ScadNode {
    fn src_ref(&self) -> SrcRef {
        self.src_ref.clone()
    }
}

impl ScadNode {
    /// True if this tag is one of the three Boolean combinators (i.e. has
    /// CSG2/CSG3 combinator semantics) rather than `Group`, a primitive or
    /// a transform.
    pub fn is_boolean_op(&self) -> bool {
        matches!(
            self.tag,
            ScadTag::Union | ScadTag::Difference | ScadTag::Intersection
        )
    }

    /// True if the `*` (disable) modifier is present.
    pub fn is_disabled(&self) -> bool {
        self.modifiers.contains(&Modifier::Disable)
    }

    /// This node's functor name, for diagnostics (e.g. `"Cube"`, `"Circle"`).
    pub fn tag_name(&self) -> &'static str {
        (&self.tag).into()
    }
}
