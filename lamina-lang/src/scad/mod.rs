// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! SCAD lowering (§4.2, §3 "SCAD node"): resolves functor names, binds and
//! coerces arguments, and threads the `$fn`/`$fa`/`$fs` environment.

pub mod env;
mod lower;
mod node;
mod param;

pub use env::{FnEnvDelta, ResolutionHint, DEFAULT_FA, DEFAULT_FS};
pub use lower::lower_source;
pub use node::{ScadNode, ScadTag};
pub use param::ArgBinder;
