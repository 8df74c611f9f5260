// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Source code reference.
//!
//! Per the §9 design note "Combinator trees referring to parent/sibling
//! source locations": every IR node stores only an opaque location handle —
//! a byte range into the preserved source buffer, plus its resolved line
//! and column — never a pointer to a parent or sibling node. The source
//! buffer itself lives outside `SrcRef` and is supplied separately when
//! rendering a diagnostic.

mod line_col;

pub use line_col::LineCol;

/// Elements holding a source code reference implement this trait.
pub trait SrcReferrer {
    /// Return this element's source code reference.
    fn src_ref(&self) -> SrcRef;
}

impl SrcReferrer for SrcRef {
    fn src_ref(&self) -> SrcRef {
        self.clone()
    }
}

impl<T: SrcReferrer> SrcReferrer for &T {
    fn src_ref(&self) -> SrcRef {
        (*self).src_ref()
    }
}

/// A reference into a source file: a byte range plus its resolved
/// line/column. `None` means "no location" (synthetic nodes).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SrcRef(pub Option<SrcRefInner>);

/// The non-empty payload of a [`SrcRef`].
#[derive(Clone, Debug, PartialEq)]
pub struct SrcRefInner {
    /// Byte range within the preserved source buffer.
    pub range: std::ops::Range<usize>,
    /// Resolved line/column of `range.start`.
    pub at: LineCol,
}

impl SrcRef {
    /// Create a new source reference.
    pub fn new(range: std::ops::Range<usize>, at: LineCol) -> Self {
        Self(Some(SrcRefInner { range, at }))
    }

    /// The synthetic "no location" reference.
    pub fn none() -> Self {
        Self(None)
    }

    /// Byte length of the referenced range, or `0` if synthetic.
    pub fn len(&self) -> usize {
        self.0.as_ref().map(|s| s.range.len()).unwrap_or(0)
    }

    /// True if this reference names zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge two references into the smallest range spanning both.
    pub fn merge(a: &SrcRef, b: &SrcRef) -> SrcRef {
        match (&a.0, &b.0) {
            (Some(a), Some(b)) => {
                let start = a.range.start.min(b.range.start);
                let end = a.range.end.max(b.range.end);
                let at = if a.range.start <= b.range.start {
                    a.at
                } else {
                    b.at
                };
                SrcRef::new(start..end, at)
            }
            (Some(a), None) => SrcRef(Some(a.clone())),
            (None, Some(b)) => SrcRef(Some(b.clone())),
            (None, None) => SrcRef::none(),
        }
    }
}

impl std::fmt::Display for SrcRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(s) => write!(f, "{}", s.at),
            None => write!(f, "<no ref>"),
        }
    }
}

/// Packs a value together with the source reference it was parsed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Refer<T> {
    /// The value.
    pub value: T,
    /// Where it came from.
    pub src_ref: SrcRef,
}

impl<T> Refer<T> {
    /// Create a `Refer` without a source reference.
    pub fn none(value: T) -> Self {
        Self {
            value,
            src_ref: SrcRef::none(),
        }
    }

    /// Create a `Refer` with a source reference.
    pub fn new(value: T, src_ref: SrcRef) -> Self {
        Self { value, src_ref }
    }

    /// Map the inner value, keeping the source reference.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Refer<U> {
        Refer {
            value: f(self.value),
            src_ref: self.src_ref,
        }
    }
}

impl<T> std::ops::Deref for Refer<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> SrcReferrer for Refer<T> {
    fn src_ref(&self) -> SrcRef {
        self.src_ref.clone()
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Refer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

/// Preserved source buffer: the original bytes (untouched, for diagnostics)
/// and its line-start table for `LineCol` resolution.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: std::sync::Arc<str>,
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    /// Wrap source text, precomputing line-start offsets.
    pub fn new(text: impl Into<std::sync::Arc<str>>) -> Self {
        let text: std::sync::Arc<str> = text.into();
        let mut line_starts = vec![0usize];
        for (i, b) in text.as_bytes().iter().enumerate() {
            if *b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    /// The full preserved text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Resolve a byte offset to a 1-based [`LineCol`].
    pub fn line_col(&self, offset: usize) -> LineCol {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        LineCol {
            line: (line_idx + 1) as u32,
            col: (offset - line_start + 1) as u32,
        }
    }

    /// The text of a single 1-based line, without its trailing newline.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = (line_number as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|e| e.saturating_sub(1))
            .unwrap_or(self.text.len());
        self.text.get(start..end)
    }

    /// Build a [`SrcRef`] for a byte range within this buffer.
    pub fn src_ref(&self, range: std::ops::Range<usize>) -> SrcRef {
        let at = self.line_col(range.start);
        SrcRef::new(range, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_resolves_correctly() {
        let buf = SourceBuffer::new("cube(10);\ntranslate([1,0,0])\n  cube(1);\n");
        assert_eq!(buf.line_col(0), LineCol { line: 1, col: 1 });
        assert_eq!(buf.line_col(10), LineCol { line: 2, col: 1 });
        assert_eq!(buf.line(2), Some("translate([1,0,0])"));
    }

    #[test]
    fn merge_spans_both_refs() {
        let buf = SourceBuffer::new("0123456789");
        let a = buf.src_ref(2..4);
        let b = buf.src_ref(6..8);
        let merged = SrcRef::merge(&a, &b);
        assert_eq!(merged.0.expect("some").range, 2..8);
    }
}
