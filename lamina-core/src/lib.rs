// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! lamina core: the scalar/vector/matrix aliases, the three process-wide
//! epsilons, the configuration surface and the top-level error type shared
//! by every later pass of the pipeline (SYN -> SCAD -> CSG3 -> CSG2 ->
//! CSG2_FLAT -> TRI/DIFF).

#![warn(missing_docs)]

pub mod bounds;
pub mod config;
pub mod epsilon;
pub mod error;
pub mod geo2d;
pub mod policy;

pub use bounds::Bounds3;
pub use config::Config;
pub use epsilon::Epsilon;
pub use error::{Error, Result};
pub use policy::Policy;

/// Integer type used throughout the pipeline.
pub type Integer = i64;
/// Scalar type used throughout the pipeline.
pub type Scalar = f64;
/// 2D vector.
pub type Vec2 = cgmath::Vector2<Scalar>;
/// 3D vector.
pub type Vec3 = cgmath::Vector3<Scalar>;
/// 4D vector (homogeneous coordinates).
pub type Vec4 = cgmath::Vector4<Scalar>;
/// 3x3 matrix.
pub type Mat3 = cgmath::Matrix3<Scalar>;
/// 4x4 matrix, used to carry a primitive's accumulated transform.
pub type Mat4 = cgmath::Matrix4<Scalar>;
/// An angle, in radians.
pub type Angle = cgmath::Rad<Scalar>;

/// Short identifier type (functor names, identifiers).
pub type Id = compact_str::CompactString;

/// Boolean combinator tag, shared by the CSG3 combinator node and the CSG2
/// evaluator (§3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
pub enum BooleanOp {
    /// union(A...): interior = any operand's interior.
    Union,
    /// difference(A, B...): interior = A's interior and not any Bi's interior.
    Difference,
    /// intersection(A...): interior = every operand's interior.
    Intersection,
}

impl From<BooleanOp> for geo::OpType {
    fn from(op: BooleanOp) -> Self {
        match op {
            BooleanOp::Union => geo::OpType::Union,
            BooleanOp::Difference => geo::OpType::Difference,
            BooleanOp::Intersection => geo::OpType::Intersection,
        }
    }
}

impl From<&BooleanOp> for geo::OpType {
    fn from(op: &BooleanOp) -> Self {
        (*op).into()
    }
}
