// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Geometry and Boolean-evaluation errors (§7 GeomError, BooleanError).

use lamina_lang::src_ref::SrcRef;
use lamina_lang::{LexError, ParseError, ScadError};
use thiserror::Error;

/// Any error the whole pipeline (§2 "source text -> ... -> EMITTED") can
/// raise, unifying each pass's own error enum the way `lamina_core::Error`
/// unifies pass errors for collaborators outside this crate (§7).
#[derive(Debug, Error, Clone)]
pub enum PipelineError {
    /// A lexical error (§7 LexError), surfaced transparently.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// A parse error (§7 ParseError).
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A SCAD-lowering error (§7 SCADError).
    #[error(transparent)]
    Scad(#[from] ScadError),
    /// A geometry error (§7 GeomError).
    #[error(transparent)]
    Geom(#[from] GeomError),
}

impl PipelineError {
    /// This error's primary source location.
    pub fn src_ref(&self) -> SrcRef {
        match self {
            PipelineError::Lex(e) => e.src_ref(),
            PipelineError::Parse(e) => e.src_ref(),
            PipelineError::Scad(e) => e.src_ref(),
            PipelineError::Geom(e) => e.src_ref(),
        }
    }
}

/// The four downgradable `GeomError` subkinds (§4.3, §6, §7), plus a
/// handful of non-downgradable geometry failures.
#[derive(Debug, Error, Clone)]
pub enum GeomError {
    /// A primitive is empty at the source (e.g. `cube(0)`).
    #[error("empty primitive")]
    EmptyAtSource {
        /// Where.
        at: SrcRef,
    },
    /// A transform collapsed a primitive's geometry (e.g. `scale([0,1,1])`).
    #[error("geometry collapsed by transform")]
    CollapsedByTransform {
        /// Where.
        at: SrcRef,
    },
    /// A 3D object appeared where only 2D objects are valid.
    #[error("{tag} is a 3D object, invalid in a 2D context")]
    Object3DIn2D {
        /// The offending functor's name (e.g. `"Cube"`).
        tag: &'static str,
        /// Where.
        at: SrcRef,
    },
    /// A 2D object appeared where only 3D objects are valid.
    #[error("{tag} is a 2D object, invalid in a 3D context")]
    Object2DIn3D {
        /// The offending functor's name (e.g. `"Circle"`).
        tag: &'static str,
        /// Where.
        at: SrcRef,
    },
    /// A polyhedron face's vertex index was out of range.
    #[error("polyhedron face references out-of-range vertex index {index}")]
    DegenerateFace {
        /// The offending index.
        index: usize,
        /// Where.
        at: SrcRef,
    },
    /// A polyhedron face's vertices were not coplanar beyond `eq` epsilon.
    #[error("polyhedron face is not planar")]
    NonPlanarFace {
        /// Where.
        at: SrcRef,
    },
}

impl GeomError {
    /// This error's primary source location.
    pub fn src_ref(&self) -> SrcRef {
        match self {
            GeomError::EmptyAtSource { at }
            | GeomError::CollapsedByTransform { at }
            | GeomError::Object3DIn2D { at, .. }
            | GeomError::Object2DIn3D { at, .. }
            | GeomError::DegenerateFace { at, .. }
            | GeomError::NonPlanarFace { at } => at.clone(),
        }
    }
}

/// The CSG2 Boolean evaluator could not robustly resolve an intersection
/// within the configured epsilons (§4.6, §7).
#[derive(Debug, Error, Clone)]
#[error("boolean evaluation could not resolve geometry within epsilon")]
pub struct BooleanError {
    /// Where the offending operand came from, if known.
    pub at: SrcRef,
}
