// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

/// Line and column within a source file (1-based, per §6 Diagnostics).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineCol {
    /// Line number (1..).
    pub line: u32,
    /// Column number (1..), a byte offset within the line.
    pub col: u32,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
