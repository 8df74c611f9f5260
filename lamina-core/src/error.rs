// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The top-level error type (§7), unifying each pass's own error enum
//! through `#[from]`, the way the teacher's crates each carry a `*Error`
//! enum composed by the binary crate.

use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Any error a pipeline stage can produce (§7 Error kinds).
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error surfaced transparently from a collaborator.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A pass-specific error with no further structure at this layer; each
    /// pass crate (`lamina-lang`, `lamina-csg`) defines its own richer error
    /// enum and converts it to a `String` at the crate boundary so
    /// `lamina-core` does not need to depend on them.
    #[error("{0}")]
    Pass(String),
}

impl Error {
    /// Wrap a pass-specific error (already rendered to a message) as a
    /// pipeline-fatal error.
    pub fn pass(message: impl Into<String>) -> Self {
        Self::Pass(message.into())
    }
}
