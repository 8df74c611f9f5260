// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Argument binding: positional-then-keyword binding of a call's
//! `args := arg*` against a functor's declared parameter names (§4.2),
//! followed by coercion of each bound [`crate::syn::Value`] to its expected
//! semantic type. This is the teacher's `ParameterValueList`/`parameter!`
//! pattern (`lang/eval/parameter`) reduced to a plain `&'static [&str]`
//! table per functor, since this language has no user-defined parameter
//! lists to merge at runtime.

use crate::error::ScadError;
use crate::src_ref::{SrcRef, SrcReferrer};
use crate::syn::{Arg, Value, ValueKind};
use lamina_core::{Mat4, Scalar, Vec2, Vec3};
use std::collections::HashMap;

/// Positional-then-keyword argument binder for one call.
pub struct ArgBinder<'a> {
    functor: &'static str,
    call_src_ref: SrcRef,
    bound: HashMap<&'static str, &'a Value>,
}

impl<'a> ArgBinder<'a> {
    /// Bind `args` against the ordered `params` declaration for `functor`.
    ///
    /// Positional arguments fill `params` in order; keyword arguments
    /// overwrite by name. A keyword name not present in `params` is
    /// [`ScadError::UnknownArgument`]; supplying the same parameter twice
    /// (positionally-then-keyword, or keyword-then-keyword) is
    /// [`ScadError::DuplicateArgument`].
    pub fn bind(
        functor: &'static str,
        args: &'a [Arg],
        params: &'static [&'static str],
        call_src_ref: SrcRef,
    ) -> Result<Self, ScadError> {
        let mut bound: HashMap<&'static str, &'a Value> = HashMap::new();
        let mut next_positional = 0usize;
        for arg in args {
            match &arg.name {
                None => {
                    let Some(name) = params.get(next_positional).copied() else {
                        return Err(ScadError::UnknownArgument {
                            functor: functor.to_string(),
                            name: format!("<positional #{next_positional}>"),
                            at: arg.src_ref.clone(),
                        });
                    };
                    next_positional += 1;
                    if bound.insert(name, &arg.value).is_some() {
                        return Err(ScadError::DuplicateArgument {
                            functor: functor.to_string(),
                            name: name.to_string(),
                            at: arg.src_ref.clone(),
                        });
                    }
                }
                Some(kw) => {
                    // `$fn`/`$fa`/`$fs` are handled by the resolution
                    // environment, not by per-functor parameter tables.
                    if kw.starts_with('$') {
                        continue;
                    }
                    let Some(name) = params.iter().copied().find(|p| *p == kw) else {
                        return Err(ScadError::UnknownArgument {
                            functor: functor.to_string(),
                            name: kw.clone(),
                            at: arg.src_ref.clone(),
                        });
                    };
                    if bound.insert(name, &arg.value).is_some() {
                        return Err(ScadError::DuplicateArgument {
                            functor: functor.to_string(),
                            name: name.to_string(),
                            at: arg.src_ref.clone(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            functor,
            call_src_ref,
            bound,
        })
    }

    fn require(&self, name: &'static str) -> Result<&'a Value, ScadError> {
        self.bound
            .get(name)
            .copied()
            .ok_or_else(|| ScadError::MissingArgument {
                functor: self.functor.to_string(),
                name: name.to_string(),
                at: self.call_src_ref.clone(),
            })
    }

    /// Fetch `$fn`/`$fa`/`$fs` given as a keyword on this call, if any
    /// (looked up directly, bypassing the positional/keyword param table
    /// since these are always keyword-only).
    pub fn special(args: &'a [Arg], name: &str) -> Option<&'a Value> {
        args.iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }

    /// A required scalar parameter.
    pub fn scalar(&self, name: &'static str) -> Result<Scalar, ScadError> {
        coerce_scalar(self.functor, name, self.require(name)?)
    }

    /// An optional scalar parameter, falling back to `default`.
    pub fn scalar_or(&self, name: &'static str, default: Scalar) -> Result<Scalar, ScadError> {
        match self.bound.get(name) {
            Some(v) => coerce_scalar(self.functor, name, v),
            None => Ok(default),
        }
    }

    /// A required boolean parameter.
    pub fn bool_or(&self, name: &'static str, default: bool) -> Result<bool, ScadError> {
        match self.bound.get(name) {
            Some(v) => coerce_bool(self.functor, name, v),
            None => Ok(default),
        }
    }

    /// A 3-vector parameter, accepting a scalar `s` as shorthand for
    /// `[s, s, s]` (OpenSCAD's `cube(10)` convention) when `scalar_splat`.
    pub fn vec3(&self, name: &'static str, scalar_splat: bool) -> Result<Vec3, ScadError> {
        coerce_vec3(self.functor, name, self.require(name)?, scalar_splat)
    }

    /// A 3-vector parameter with a default.
    pub fn vec3_or(
        &self,
        name: &'static str,
        scalar_splat: bool,
        default: Vec3,
    ) -> Result<Vec3, ScadError> {
        match self.bound.get(name) {
            Some(v) => coerce_vec3(self.functor, name, v, scalar_splat),
            None => Ok(default),
        }
    }

    /// A 2-vector parameter, with the same scalar-splat convention as
    /// [`Self::vec3`].
    pub fn vec2(&self, name: &'static str, scalar_splat: bool) -> Result<Vec2, ScadError> {
        coerce_vec2(self.functor, name, self.require(name)?, scalar_splat)
    }

    /// A 2-vector parameter with a default.
    pub fn vec2_or(
        &self,
        name: &'static str,
        scalar_splat: bool,
        default: Vec2,
    ) -> Result<Vec2, ScadError> {
        match self.bound.get(name) {
            Some(v) => coerce_vec2(self.functor, name, v, scalar_splat),
            None => Ok(default),
        }
    }

    /// A required polygon path: an array of 2-vectors.
    pub fn path(&self, name: &'static str) -> Result<Vec<Vec2>, ScadError> {
        coerce_path(self.functor, name, self.require(name)?)
    }

    /// A required array of 3-vectors (`polyhedron`'s `points`).
    pub fn points3(&self, name: &'static str) -> Result<Vec<Vec3>, ScadError> {
        coerce_points3(self.functor, name, self.require(name)?)
    }

    /// A required face-index list (`polyhedron`'s `faces`): an array of
    /// arrays of non-negative integers.
    pub fn face_list(&self, name: &'static str) -> Result<Vec<Vec<usize>>, ScadError> {
        coerce_face_list(self.functor, name, self.require(name)?)
    }

    /// A required 4x4 matrix, given as a 4-row, 4-column array of arrays
    /// (`multmatrix`'s convention).
    pub fn matrix4(&self, name: &'static str) -> Result<Mat4, ScadError> {
        coerce_matrix4(self.functor, name, self.require(name)?)
    }
}

fn type_mismatch(functor: &str, name: &str, expected: &str, value: &Value) -> ScadError {
    ScadError::TypeMismatch {
        functor: functor.to_string(),
        name: name.to_string(),
        expected: expected.to_string(),
        found: describe_kind(&value.kind),
        at: value.src_ref(),
    }
}

fn describe_kind(kind: &ValueKind) -> String {
    match kind {
        ValueKind::Integer(_) => "integer".to_string(),
        ValueKind::Number(_) => "number".to_string(),
        ValueKind::Str(_) => "string".to_string(),
        ValueKind::Ident(s) => format!("identifier `{s}`"),
        ValueKind::Range { .. } => "range".to_string(),
        ValueKind::Array(items) => format!("array of {} items", items.len()),
    }
}

fn coerce_scalar(functor: &str, name: &str, value: &Value) -> Result<Scalar, ScadError> {
    match &value.kind {
        ValueKind::Integer(i) => Ok(*i as Scalar),
        ValueKind::Number(n) => Ok(*n),
        _ => Err(type_mismatch(functor, name, "a number", value)),
    }
}

fn coerce_bool(functor: &str, name: &str, value: &Value) -> Result<bool, ScadError> {
    match &value.kind {
        ValueKind::Ident(s) if s == "true" => Ok(true),
        ValueKind::Ident(s) if s == "false" => Ok(false),
        ValueKind::Integer(i) => Ok(*i != 0),
        _ => Err(type_mismatch(functor, name, "a boolean", value)),
    }
}

fn coerce_vec3(
    functor: &str,
    name: &str,
    value: &Value,
    scalar_splat: bool,
) -> Result<Vec3, ScadError> {
    match &value.kind {
        ValueKind::Array(items) if items.len() == 3 => Ok(Vec3::new(
            coerce_scalar(functor, name, &items[0])?,
            coerce_scalar(functor, name, &items[1])?,
            coerce_scalar(functor, name, &items[2])?,
        )),
        ValueKind::Integer(_) | ValueKind::Number(_) if scalar_splat => {
            let s = coerce_scalar(functor, name, value)?;
            Ok(Vec3::new(s, s, s))
        }
        _ => Err(type_mismatch(functor, name, "a 3-vector", value)),
    }
}

fn coerce_vec2(
    functor: &str,
    name: &str,
    value: &Value,
    scalar_splat: bool,
) -> Result<Vec2, ScadError> {
    match &value.kind {
        ValueKind::Array(items) if items.len() == 2 => Ok(Vec2::new(
            coerce_scalar(functor, name, &items[0])?,
            coerce_scalar(functor, name, &items[1])?,
        )),
        ValueKind::Integer(_) | ValueKind::Number(_) if scalar_splat => {
            let s = coerce_scalar(functor, name, value)?;
            Ok(Vec2::new(s, s))
        }
        _ => Err(type_mismatch(functor, name, "a 2-vector", value)),
    }
}

fn coerce_path(functor: &str, name: &str, value: &Value) -> Result<Vec<Vec2>, ScadError> {
    match &value.kind {
        ValueKind::Array(items) => items
            .iter()
            .map(|v| coerce_vec2(functor, name, v, false))
            .collect(),
        _ => Err(type_mismatch(functor, name, "a polygon path", value)),
    }
}

fn coerce_points3(functor: &str, name: &str, value: &Value) -> Result<Vec<Vec3>, ScadError> {
    match &value.kind {
        ValueKind::Array(items) => items
            .iter()
            .map(|v| coerce_vec3(functor, name, v, false))
            .collect(),
        _ => Err(type_mismatch(functor, name, "an array of 3-vectors", value)),
    }
}

fn coerce_face_list(
    functor: &str,
    name: &str,
    value: &Value,
) -> Result<Vec<Vec<usize>>, ScadError> {
    match &value.kind {
        ValueKind::Array(faces) => faces
            .iter()
            .map(|face| match &face.kind {
                ValueKind::Array(indices) => indices
                    .iter()
                    .map(|i| match &i.kind {
                        ValueKind::Integer(n) if *n >= 0 => Ok(*n as usize),
                        _ => Err(type_mismatch(functor, name, "a face index list", i)),
                    })
                    .collect(),
                _ => Err(type_mismatch(functor, name, "a face index list", face)),
            })
            .collect(),
        _ => Err(type_mismatch(functor, name, "a face list", value)),
    }
}

fn coerce_matrix4(functor: &str, name: &str, value: &Value) -> Result<Mat4, ScadError> {
    match &value.kind {
        ValueKind::Array(rows) if rows.len() == 4 => {
            let mut m = [[0.0; 4]; 4];
            for (r, row) in rows.iter().enumerate() {
                match &row.kind {
                    ValueKind::Array(cols) if cols.len() == 4 => {
                        for (c, col) in cols.iter().enumerate() {
                            m[r][c] = coerce_scalar(functor, name, col)?;
                        }
                    }
                    _ => return Err(type_mismatch(functor, name, "a 4x4 matrix", row)),
                }
            }
            // cgmath::Matrix4 is column-major; `m` above was filled
            // row-major (matching the source's `[[row]...]` literal shape).
            Ok(Mat4::new(
                m[0][0], m[1][0], m[2][0], m[3][0], m[0][1], m[1][1], m[2][1], m[3][1], m[0][2],
                m[1][2], m[2][2], m[3][2], m[0][3], m[1][3], m[2][3], m[3][3],
            ))
        }
        _ => Err(type_mismatch(functor, name, "a 4x4 matrix", value)),
    }
}
