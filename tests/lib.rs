// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Integration tests for the lamina slicing pipeline: the boundary
//! scenarios, round-trip laws and quantified invariants that exercise more
//! than one crate at once, rather than a single pass in isolation (those
//! live next to the code they test, as `#[cfg(test)]` modules in
//! `lamina-lang`/`lamina-csg`/`lamina-export`).

#[cfg(test)]
mod boundary_scenarios;
#[cfg(test)]
mod invariants;
#[cfg(test)]
mod round_trip;
