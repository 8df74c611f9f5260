// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! CSG3 primitive leaves (§3 "CSG3 node"): each carries a frozen
//! accumulated affine transform, captured at the point the primitive
//! appeared in the SCAD tree (§4.3).

use lamina_core::{geo2d::Geometries2D, Mat4, Scalar, Vec3};

/// A 3D primitive with its transform folded in. No transform nodes remain
/// in a CSG3 tree (§3 invariant).
#[derive(Debug, Clone)]
pub enum Primitive3 {
    /// A sphere of the given radius, centered at the local origin.
    Sphere {
        /// Radius.
        radius: Scalar,
        /// Resolved polygon-approximation segment count.
        segments: u32,
        /// Accumulated transform, local space to world space.
        transform: Mat4,
    },
    /// A cylinder/cone spanning local `z` in `[0, height]`, radius
    /// linearly interpolated from `radius_bottom` to `radius_top`.
    Cylinder {
        /// Radius at local `z = 0`.
        radius_bottom: Scalar,
        /// Radius at local `z = height`.
        radius_top: Scalar,
        /// Extent along local `z`.
        height: Scalar,
        /// Resolved polygon-approximation segment count.
        segments: u32,
        /// Accumulated transform.
        transform: Mat4,
    },
    /// A generic polyhedron: vertex array plus planar face index lists, in
    /// local space.
    Polyhedron {
        /// Vertex positions, local space.
        points: Vec<Vec3>,
        /// Per-face vertex index lists (CCW winding, viewed from outside).
        faces: Vec<Vec<usize>>,
        /// Accumulated transform.
        transform: Mat4,
    },
    /// An extrusion of a 2D profile along local `z` in `[0, height]`,
    /// optionally twisted and scaled linearly over that range.
    Extrusion {
        /// The profile, already flattened to its own Boolean evaluation,
        /// in the profile's local 2D frame (z = 0 plane).
        profile: Geometries2D,
        /// Extent along local `z`.
        height: Scalar,
        /// Total twist applied over `[0, height]`, in degrees.
        twist_deg: Scalar,
        /// Scale factor applied at local `z = height` (lerped from `1.0`).
        scale: Scalar,
        /// Accumulated transform.
        transform: Mat4,
    },
}

impl Primitive3 {
    /// This primitive's accumulated transform.
    pub fn transform(&self) -> &Mat4 {
        match self {
            Primitive3::Sphere { transform, .. }
            | Primitive3::Cylinder { transform, .. }
            | Primitive3::Polyhedron { transform, .. }
            | Primitive3::Extrusion { transform, .. } => transform,
        }
    }

    /// This primitive's axis-aligned bounding box in its own local space,
    /// before the accumulated transform is applied (§4.4 range scheduler).
    pub fn local_bounds(&self) -> (Vec3, Vec3) {
        match self {
            Primitive3::Sphere { radius, .. } => {
                let r = *radius;
                (Vec3::new(-r, -r, -r), Vec3::new(r, r, r))
            }
            Primitive3::Cylinder { radius_bottom, radius_top, height, .. } => {
                let r = radius_bottom.max(*radius_top);
                (Vec3::new(-r, -r, 0.0), Vec3::new(r, r, *height))
            }
            Primitive3::Polyhedron { points, .. } => {
                let mut min = Vec3::new(Scalar::INFINITY, Scalar::INFINITY, Scalar::INFINITY);
                let mut max = Vec3::new(Scalar::NEG_INFINITY, Scalar::NEG_INFINITY, Scalar::NEG_INFINITY);
                for p in points {
                    min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
                    max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
                }
                (min, max)
            }
            Primitive3::Extrusion { profile, height, .. } => {
                use geo::BoundingRect;
                let (min_xy, max_xy) = match profile.0.bounding_rect() {
                    Some(r) => (r.min(), r.max()),
                    None => (geo::Coord { x: 0.0, y: 0.0 }, geo::Coord { x: 0.0, y: 0.0 }),
                };
                (
                    Vec3::new(min_xy.x, min_xy.y, 0.0),
                    Vec3::new(max_xy.x, max_xy.y, *height),
                )
            }
        }
    }
}

/// Build a cube/box as an explicit polyhedron (§4.2: `cube` has no CSG3
/// primitive of its own — it lowers straight to the generic polyhedron
/// case at build time, same as the cylinder tilt fallback below).
pub fn cube_to_polyhedron(size: Vec3, center: bool) -> (Vec<Vec3>, Vec<Vec<usize>>) {
    let (min, max) = if center {
        (
            Vec3::new(-size.x / 2.0, -size.y / 2.0, -size.z / 2.0),
            Vec3::new(size.x / 2.0, size.y / 2.0, size.z / 2.0),
        )
    } else {
        (Vec3::new(0.0, 0.0, 0.0), size)
    };
    let points = vec![
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    let faces = vec![
        vec![0, 3, 2, 1], // bottom
        vec![4, 5, 6, 7], // top
        vec![0, 1, 5, 4], // front
        vec![1, 2, 6, 5], // right
        vec![2, 3, 7, 6], // back
        vec![3, 0, 4, 7], // left
    ];
    (points, faces)
}

/// Build the side-quad and cap-fan faces of a cylinder/cone as an explicit
/// polyhedron (points + faces), used as the plane-intersection fallback
/// when the frozen transform tilts the primitive's local `z`-axis away
/// from a world horizontal plane (see [`crate::slice`]).
pub fn cylinder_to_polyhedron(
    radius_bottom: Scalar,
    radius_top: Scalar,
    height: Scalar,
    segments: u32,
) -> (Vec<Vec3>, Vec<Vec<usize>>) {
    let n = segments.max(3) as usize;
    let mut points = Vec::with_capacity(2 * n);
    for i in 0..n {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
        points.push(Vec3::new(
            radius_bottom * theta.cos(),
            radius_bottom * theta.sin(),
            0.0,
        ));
    }
    for i in 0..n {
        let theta = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
        points.push(Vec3::new(
            radius_top * theta.cos(),
            radius_top * theta.sin(),
            height,
        ));
    }
    let mut faces = Vec::with_capacity(n + 2);
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, n + j, n + i]);
    }
    faces.push((0..n).rev().collect());
    faces.push((0..n).map(|i| n + i).collect());
    (points, faces)
}
