// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Output writers (§6 "External interfaces"): one trait per output kind,
//! mirroring the teacher's `export/{stl,svg}/writer.rs` split between a
//! thin low-level writer (this crate) and a caller that drives it from a
//! tree walk (`lamina_csg::run_pipeline`'s result, here, rather than an
//! `ObjectNode` tree). Kept thin and non-production-faithful to the real
//! STL/SCAD/PostScript/WebGL formats per §1's explicit non-goal; each
//! writer below is the minimal implementation that round-trips the
//! boundary scenarios (§8) end to end.

#![warn(missing_docs)]

pub mod ir_dump;
pub mod postscript;
pub mod scad;
pub mod stl;
pub mod webgl;

pub use ir_dump::IrDumpWriter;
pub use postscript::PostscriptWriter;
pub use scad::ScadWriter;
pub use stl::StlWriter;
pub use webgl::WebglWriter;
