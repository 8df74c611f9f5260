// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lexer, parser and SCAD-lowering errors (§7).

use crate::src_ref::SrcRef;
use thiserror::Error;

/// Errors raised while tokenising (§7 LexError).
#[derive(Debug, Error, Clone)]
pub enum LexError {
    /// A double-quoted string was never closed.
    #[error("unterminated string literal")]
    UnterminatedString {
        /// Where the string started.
        at: SrcRef,
    },
    /// A `/* ... */` comment was never closed.
    #[error("unterminated block comment")]
    UnterminatedComment {
        /// Where the comment started.
        at: SrcRef,
    },
    /// A byte outside the recognized token set was encountered.
    #[error("unexpected byte {byte:#04x}")]
    UnexpectedByte {
        /// The offending byte.
        byte: u8,
        /// Where it occurred.
        at: SrcRef,
    },
    /// Two multi-character tokens abutted without intervening whitespace or
    /// punctuation (§4.1/§9), e.g. `9.9foo`.
    #[error("token must be separated by whitespace or punctuation")]
    AbuttedTokens {
        /// Where the second token started.
        at: SrcRef,
    },
    /// A numeric literal's digits could not be parsed.
    #[error("invalid numeric literal: {message}")]
    InvalidNumber {
        /// Parse failure description.
        message: String,
        /// Where the literal occurred.
        at: SrcRef,
    },
    /// An invalid backslash escape inside a string literal.
    #[error("invalid escape sequence")]
    InvalidEscape {
        /// Where the escape occurred.
        at: SrcRef,
    },
}

impl LexError {
    /// This error's primary source location.
    pub fn src_ref(&self) -> SrcRef {
        match self {
            LexError::UnterminatedString { at }
            | LexError::UnterminatedComment { at }
            | LexError::UnexpectedByte { at, .. }
            | LexError::AbuttedTokens { at }
            | LexError::InvalidNumber { at, .. }
            | LexError::InvalidEscape { at } => at.clone(),
        }
    }
}

/// Errors raised while building the SYN tree (§7 ParseError).
#[derive(Debug, Error, Clone)]
pub enum ParseError {
    /// A lexical error, surfaced transparently.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// The parser expected one thing and found another.
    #[error("expected {expected}, found {found}")]
    Expected {
        /// What was expected (human-readable).
        expected: String,
        /// What was actually found (human-readable).
        found: String,
        /// Where.
        at: SrcRef,
    },
    /// A range or array literal contained a malformed step.
    #[error("malformed range literal")]
    MalformedRange {
        /// Where.
        at: SrcRef,
    },
}

impl ParseError {
    /// This error's primary source location.
    pub fn src_ref(&self) -> SrcRef {
        match self {
            ParseError::Lex(e) => e.src_ref(),
            ParseError::Expected { at, .. } => at.clone(),
            ParseError::MalformedRange { at } => at.clone(),
        }
    }
}

/// Errors raised while lowering SYN to SCAD (§7 SCADError).
#[derive(Debug, Error, Clone)]
pub enum ScadError {
    /// The call's functor name is not one of the recognized functors.
    #[error("unknown functor `{name}`")]
    UnknownFunctor {
        /// The offending name.
        name: String,
        /// Where.
        at: SrcRef,
    },
    /// A keyword argument's name does not match any parameter of this
    /// functor.
    #[error("unknown argument `{name}` for `{functor}`")]
    UnknownArgument {
        /// Functor name.
        functor: String,
        /// Offending argument name.
        name: String,
        /// Where.
        at: SrcRef,
    },
    /// A required parameter was not supplied, positionally or by keyword.
    #[error("missing required argument `{name}` for `{functor}`")]
    MissingArgument {
        /// Functor name.
        functor: String,
        /// Missing parameter name.
        name: String,
        /// Where.
        at: SrcRef,
    },
    /// An argument's value could not be coerced to the parameter's expected
    /// type.
    #[error("argument `{name}` of `{functor}` expected {expected}, found {found}")]
    TypeMismatch {
        /// Functor name.
        functor: String,
        /// Parameter name.
        name: String,
        /// Expected semantic type, human-readable.
        expected: String,
        /// What was actually found, human-readable.
        found: String,
        /// Where.
        at: SrcRef,
    },
    /// A keyword argument was supplied more than once.
    #[error("duplicate argument `{name}` for `{functor}`")]
    DuplicateArgument {
        /// Functor name.
        functor: String,
        /// Duplicated parameter name.
        name: String,
        /// Where.
        at: SrcRef,
    },
}

impl ScadError {
    /// This error's primary source location.
    pub fn src_ref(&self) -> SrcRef {
        match self {
            ScadError::UnknownFunctor { at, .. }
            | ScadError::UnknownArgument { at, .. }
            | ScadError::MissingArgument { at, .. }
            | ScadError::TypeMismatch { at, .. }
            | ScadError::DuplicateArgument { at, .. } => at.clone(),
        }
    }
}
