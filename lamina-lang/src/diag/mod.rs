// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Diagnostics with source code references (§6 Diagnostics, §7 user-visible
//! rendering). Adapted from the teacher's `lang/diag`, which already
//! implements exactly the `<pre>Error: <message>\n<post>` contract §7 asks
//! for.

mod level;

pub use level::Level;

use crate::src_ref::{SourceBuffer, SrcRef, SrcReferrer};

/// A diagnostic message carrying a source code reference.
#[derive(Debug)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Primary source location.
    pub primary: SrcRef,
    /// Optional secondary source location (§6: "one or two source locations").
    pub secondary: Option<SrcRef>,
}

impl Diagnostic {
    /// Build an error diagnostic.
    pub fn error(primary: impl SrcReferrer, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            primary: primary.src_ref(),
            secondary: None,
        }
    }

    /// Build a warning diagnostic.
    pub fn warning(primary: impl SrcReferrer, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
            primary: primary.src_ref(),
            secondary: None,
        }
    }

    /// Attach a secondary location.
    pub fn with_secondary(mut self, secondary: impl SrcReferrer) -> Self {
        self.secondary = Some(secondary.src_ref());
        self
    }

    /// Render as `<pre>Error: <message>\n<post>` with a caret under the
    /// primary location, derived from the preserved source buffer (§7).
    pub fn pretty_print(&self, w: &mut dyn std::fmt::Write, source: &SourceBuffer) -> std::fmt::Result {
        writeln!(w, "{}: {}", self.level, self.message)?;
        match &self.primary.0 {
            None => {}
            Some(inner) => {
                let line_text = source.line(inner.at.line).unwrap_or("<no line>");
                writeln!(w, "     |")?;
                writeln!(w, "{: >4} | {}", inner.at.line, line_text)?;
                let col = inner.at.col as usize;
                let caret_len = inner.range.len().max(1).min(line_text.len().saturating_sub(col - 1).max(1));
                writeln!(
                    w,
                    "     | {}{}",
                    " ".repeat(col.saturating_sub(1)),
                    "^".repeat(caret_len)
                )?;
            }
        }
        Ok(())
    }
}

/// An ordered collection of diagnostics, the first fatal one of which
/// terminates the pipeline (§7: "Only the first fatal error is reported").
#[derive(Debug, Default)]
pub struct DiagList(Vec<Diagnostic>);

impl DiagList {
    /// Push a diagnostic.
    pub fn push(&mut self, diag: Diagnostic) {
        self.0.push(diag);
    }

    /// True if any pushed diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| matches!(d.level, Level::Error))
    }

    /// Pretty-print every diagnostic in order.
    pub fn pretty_print(&self, w: &mut dyn std::fmt::Write, source: &SourceBuffer) -> std::fmt::Result {
        for diag in &self.0 {
            diag.pretty_print(w, source)?;
        }
        Ok(())
    }
}

impl std::ops::Deref for DiagList {
    type Target = Vec<Diagnostic>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::src_ref::SourceBuffer;

    #[test]
    fn pretty_print_matches_contract() {
        let source = SourceBuffer::new("cube(0);\n");
        let src_ref = source.src_ref(0..4);
        let diag = Diagnostic::error(src_ref, "empty primitive");
        let mut out = String::new();
        diag.pretty_print(&mut out, &source).expect("fmt");
        assert!(out.starts_with("error: empty primitive\n"));
        assert!(out.contains("cube(0);"));
        assert!(out.contains("^^^^"));
    }
}
