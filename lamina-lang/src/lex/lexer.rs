// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The tokeniser (§4.1).
//!
//! Per §9's design note on destructive lexing, this lexer never mutates
//! the source it reads: the preserved [`SourceBuffer`] is also the working
//! buffer, and a token is nothing more than an `(offset, len)` handle
//! (carried as a [`SrcRef`]) plus, for literals, an already-parsed value.
//! There is therefore nothing to NUL-terminate and no second copy to keep
//! in sync. The observable behavior §4.1 asks for — two multi-character
//! tokens may not abut without intervening whitespace or punctuation — is
//! enforced directly by the scanners below rather than falling out of
//! buffer mutation.

use crate::error::LexError;
use crate::lex::token::{Token, TokenKind};
use crate::src_ref::SourceBuffer;

/// Tokenise a whole source buffer, discarding comments and whitespace.
/// The returned stream always ends with one [`TokenKind::Eof`] token.
pub fn tokenize(source: &SourceBuffer) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = matches!(tok.kind, TokenKind::Eof);
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

struct Lexer<'s> {
    source: &'s SourceBuffer,
    bytes: &'s [u8],
    pos: usize,
}

fn is_ident_start(b: u8) -> bool {
    b == b'$' || b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl<'s> Lexer<'s> {
    fn new(source: &'s SourceBuffer) -> Self {
        Self {
            source,
            bytes: source.text().as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn src_ref(&self, range: std::ops::Range<usize>) -> crate::src_ref::SrcRef {
        self.source.src_ref(range)
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => {
                                return Err(LexError::UnterminatedComment {
                                    at: self.src_ref(start..self.pos),
                                })
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.pos += 2;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(b) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, self.src_ref(start..start)));
        };

        if is_ident_start(b) {
            return self.scan_ident(start);
        }
        if b.is_ascii_digit() || (b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
            return self.scan_number(start);
        }
        // §4.1 Tokens: "floating-point literal (with optional sign...)" —
        // a leading `+`/`-` is part of the numeric token when immediately
        // followed by a digit or a `.digit`, never a standalone operator
        // (this grammar has no arithmetic expressions).
        if (b == b'+' || b == b'-')
            && self
                .peek_at(1)
                .is_some_and(|n| n.is_ascii_digit() || (n == b'.' && self.peek_at(2).is_some_and(|n2| n2.is_ascii_digit())))
        {
            return self.scan_number(start);
        }
        if b == b'"' {
            return self.scan_string(start);
        }
        if (32..=126).contains(&b) {
            self.pos += 1;
            return Ok(Token::new(
                TokenKind::Punct(b as char),
                self.src_ref(start..self.pos),
            ));
        }
        self.pos += 1;
        Err(LexError::UnexpectedByte {
            byte: b,
            at: self.src_ref(start..self.pos),
        })
    }

    fn scan_ident(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 1; // the `$`/alpha/underscore start byte
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        let text = &self.bytes[start..self.pos];
        let text = std::str::from_utf8(text).expect("ascii-subset identifier is valid utf8");
        Ok(Token::new(
            TokenKind::Ident(text.to_string()),
            self.src_ref(start..self.pos),
        ))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token, LexError> {
        let mut is_float = false;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|b| b.is_ascii_digit() || !is_ident_continue(b)) {
            // A trailing `.` that is not followed by an identifier char is a
            // decimal point (`10.` and `10.5` both parse; `10.foo` does not
            // reach here because `.` followed by an ident-continue byte that
            // is not a digit is handled by the abutted-token check below).
            if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) || !self.peek_at(1).is_some_and(is_ident_continue) {
                is_float = true;
                self.pos += 1;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                is_float = true;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }

        // §4.1/§9: a number may not directly abut an identifier-continuation
        // byte, e.g. `9.9foo` is a lex error.
        if self.peek().is_some_and(is_ident_continue) {
            let abut_start = self.pos;
            while self.peek().is_some_and(is_ident_continue) {
                self.pos += 1;
            }
            return Err(LexError::AbuttedTokens {
                at: self.src_ref(abut_start..self.pos),
            });
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("valid utf8");
        let src_ref = self.src_ref(start..self.pos);
        if is_float {
            text.parse::<f64>()
                .map(|v| Token::new(TokenKind::Float(v), src_ref.clone()))
                .map_err(|e| LexError::InvalidNumber {
                    message: e.to_string(),
                    at: src_ref,
                })
        } else {
            text.parse::<i64>()
                .map(|v| Token::new(TokenKind::Int(v), src_ref.clone()))
                .map_err(|e| LexError::InvalidNumber {
                    message: e.to_string(),
                    at: src_ref,
                })
        }
    }

    fn scan_string(&mut self, start: usize) -> Result<Token, LexError> {
        self.pos += 1; // opening quote
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(LexError::UnterminatedString {
                        at: self.src_ref(start..self.pos),
                    })
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    let esc_start = self.pos - 1;
                    match self.bump() {
                        Some(b'n') => value.push('\n'),
                        Some(b't') => value.push('\t'),
                        Some(b'r') => value.push('\r'),
                        Some(b'\\') => value.push('\\'),
                        Some(b'"') => value.push('"'),
                        Some(_) | None => {
                            return Err(LexError::InvalidEscape {
                                at: self.src_ref(esc_start..self.pos),
                            })
                        }
                    }
                }
                Some(b) => value.push(b as char),
            }
        }
        Ok(Token::new(
            TokenKind::Str(value),
            self.src_ref(start..self.pos),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let buf = SourceBuffer::new(src);
        tokenize(&buf)
            .expect("lex ok")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_call_with_args() {
        let ks = kinds("cube(10);");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident("cube".into()),
                TokenKind::Punct('('),
                TokenKind::Int(10),
                TokenKind::Punct(')'),
                TokenKind::Punct(';'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn abutted_number_and_ident_is_an_error() {
        let buf = SourceBuffer::new("9.9foo");
        let err = tokenize(&buf).unwrap_err();
        assert!(matches!(err, LexError::AbuttedTokens { .. }));
    }

    #[test]
    fn dollar_prefixed_identifiers() {
        let ks = kinds("$fn");
        assert_eq!(ks, vec![TokenKind::Ident("$fn".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let buf = SourceBuffer::new("\"abc");
        let err = tokenize(&buf).unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn line_comment_is_discarded() {
        let ks = kinds("cube(1); // a comment\nsphere(2);");
        assert!(ks.iter().any(|k| matches!(k, TokenKind::Ident(s) if s == "sphere")));
    }

    #[test]
    fn block_comment_is_discarded() {
        let ks = kinds("cube(1); /* block\ncomment */ sphere(2);");
        assert!(ks.iter().any(|k| matches!(k, TokenKind::Ident(s) if s == "sphere")));
    }

    #[test]
    fn negative_numbers_in_arrays() {
        let ks = kinds("[-5, 0.5]");
        assert_eq!(
            ks,
            vec![
                TokenKind::Punct('['),
                TokenKind::Int(-5),
                TokenKind::Punct(','),
                TokenKind::Float(0.5),
                TokenKind::Punct(']'),
                TokenKind::Eof,
            ]
        );
    }
}
