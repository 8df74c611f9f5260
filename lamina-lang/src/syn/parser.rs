// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Recursive-descent SYN parser (§4.1).
//!
//! Grammar (restated from §4.1):
//!
//! ```text
//! body    := call*
//! call    := mod* (ident '(' args ')' | '{' body '}') tail
//! tail    := ';' | '{' body '}' | call
//! args    := ε | arg (',' arg)*
//! arg     := ident '=' value | value
//! value   := INT | FLOAT | STRING | IDENT | '[' range_or_array ']'
//! range_or_array := ε | value (':' value (':' value)? | (',' value)*)
//! mod     := '*' | '%' | '!' | '#'
//! ```
//!
//! Only the first error is reported; the parser does not attempt recovery
//! (§4.1 "subsequent tokens are not consumed").

use crate::error::ParseError;
use crate::lex::{tokenize, Token, TokenKind};
use crate::src_ref::{SourceBuffer, SrcRef};
use crate::syn::{Arg, Call, Modifier, SynNode, Value, ValueKind};

/// Parse a whole source buffer into the top-level `body := call*` sequence.
pub fn parse_source(source: &SourceBuffer) -> Result<Vec<SynNode>, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let body = parser.parse_body()?;
    parser.expect_eof()?;
    Ok(body)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek().is_punct(c)
    }

    fn describe(tok: &Token) -> String {
        match &tok.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Punct(c) => format!("`{c}`"),
            TokenKind::Int(v) => format!("integer `{v}`"),
            TokenKind::Float(v) => format!("float `{v}`"),
            TokenKind::Str(s) => format!("string {s:?}"),
            TokenKind::Ident(s) => format!("identifier `{s}`"),
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<SrcRef, ParseError> {
        if self.is_punct(c) {
            Ok(self.bump().src_ref)
        } else {
            let tok = self.peek().clone();
            Err(ParseError::Expected {
                expected: format!("`{c}`"),
                found: Self::describe(&tok),
                at: tok.src_ref,
            })
        }
    }

    fn expect_ident(&mut self) -> Result<(String, SrcRef), ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                let tok = self.bump();
                Ok((name, tok.src_ref))
            }
            _ => {
                let tok = self.peek().clone();
                Err(ParseError::Expected {
                    expected: "identifier".to_string(),
                    found: Self::describe(&tok),
                    at: tok.src_ref,
                })
            }
        }
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        if self.is_eof() {
            Ok(())
        } else {
            let tok = self.peek().clone();
            Err(ParseError::Expected {
                expected: "end of input".to_string(),
                found: Self::describe(&tok),
                at: tok.src_ref,
            })
        }
    }

    /// `body := call*`
    fn parse_body(&mut self) -> Result<Vec<SynNode>, ParseError> {
        let mut calls = Vec::new();
        while !self.is_eof() && !self.is_punct('}') {
            calls.push(SynNode::Call(self.parse_call()?));
        }
        Ok(calls)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut mods = Vec::new();
        loop {
            let m = match self.peek().kind {
                TokenKind::Punct('*') => Modifier::Disable,
                TokenKind::Punct('%') => Modifier::Background,
                TokenKind::Punct('!') => Modifier::Root,
                TokenKind::Punct('#') => Modifier::Highlight,
                _ => break,
            };
            self.bump();
            mods.push(m);
        }
        mods
    }

    /// `call := mod* (ident '(' args ')' | '{' body '}') tail`
    fn parse_call(&mut self) -> Result<Call, ParseError> {
        let start = self.peek().src_ref.clone();
        let modifiers = self.parse_modifiers();

        let (name, mut args, mut end_ref) = if self.is_punct('{') {
            // An unnamed group: `{ body }` lowers to the implicit `group`
            // functor with no arguments.
            (String::new(), Vec::new(), start.clone())
        } else {
            let (name, name_ref) = self.expect_ident()?;
            self.expect_punct('(')?;
            let args = self.parse_args()?;
            let close = self.expect_punct(')')?;
            (name, args, SrcRef::merge(&name_ref, &close))
        };
        let _ = &mut args;

        let body = self.parse_tail(&mut end_ref)?;
        let src_ref = SrcRef::merge(&start, &end_ref);

        Ok(Call {
            name,
            modifiers,
            args,
            body,
            src_ref,
        })
    }

    /// `tail := ';' | '{' body '}' | call`
    fn parse_tail(&mut self, end_ref: &mut SrcRef) -> Result<Vec<SynNode>, ParseError> {
        if self.is_punct(';') {
            let semi = self.bump();
            *end_ref = SrcRef::merge(end_ref, &semi.src_ref);
            Ok(Vec::new())
        } else if self.is_punct('{') {
            self.bump();
            let body = self.parse_body()?;
            let close = self.expect_punct('}')?;
            *end_ref = SrcRef::merge(end_ref, &close);
            Ok(body)
        } else {
            let child = self.parse_call()?;
            *end_ref = SrcRef::merge(end_ref, &child.src_ref.clone());
            Ok(vec![SynNode::Call(child)])
        }
    }

    /// `args := ε | arg (',' arg)*`
    fn parse_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args = Vec::new();
        if self.is_punct(')') {
            return Ok(args);
        }
        args.push(self.parse_arg()?);
        while self.is_punct(',') {
            self.bump();
            args.push(self.parse_arg()?);
        }
        Ok(args)
    }

    /// `arg := ident '=' value | value`
    fn parse_arg(&mut self) -> Result<Arg, ParseError> {
        // `ident '=' value` only when the identifier is immediately followed
        // by `=` (not `==`, which this grammar has no use for, and not a
        // bare identifier value such as `true`).
        if let TokenKind::Ident(name) = self.peek().kind.clone() {
            if matches!(self.tokens.get(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Punct('='))) {
                let name_tok = self.bump();
                self.bump(); // '='
                let value = self.parse_value()?;
                let src_ref = SrcRef::merge(&name_tok.src_ref, &value.src_ref.clone());
                return Ok(Arg {
                    name: Some(name),
                    value,
                    src_ref,
                });
            }
        }
        let value = self.parse_value()?;
        let src_ref = value.src_ref.clone();
        Ok(Arg {
            name: None,
            value,
            src_ref,
        })
    }

    /// `value := INT | FLOAT | STRING | IDENT | '[' range_or_array ']'`
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Int(v) => {
                self.bump();
                Ok(Value {
                    kind: ValueKind::Integer(v),
                    src_ref: tok.src_ref,
                })
            }
            TokenKind::Float(v) => {
                self.bump();
                Ok(Value {
                    kind: ValueKind::Number(v),
                    src_ref: tok.src_ref,
                })
            }
            TokenKind::Str(s) => {
                self.bump();
                Ok(Value {
                    kind: ValueKind::Str(s),
                    src_ref: tok.src_ref,
                })
            }
            TokenKind::Ident(s) => {
                self.bump();
                Ok(Value {
                    kind: ValueKind::Ident(s),
                    src_ref: tok.src_ref,
                })
            }
            TokenKind::Punct('[') => self.parse_bracketed(),
            _ => Err(ParseError::Expected {
                expected: "value".to_string(),
                found: Self::describe(&tok),
                at: tok.src_ref,
            }),
        }
    }

    /// `'[' range_or_array ']'`
    fn parse_bracketed(&mut self) -> Result<Value, ParseError> {
        let open = self.expect_punct('[')?;
        if self.is_punct(']') {
            let close = self.bump();
            return Ok(Value {
                kind: ValueKind::Array(Vec::new()),
                src_ref: SrcRef::merge(&open, &close.src_ref),
            });
        }
        let first = self.parse_value()?;
        if self.is_punct(':') {
            self.bump();
            let second = self.parse_value()?;
            let (step, end) = if self.is_punct(':') {
                self.bump();
                let third = self.parse_value()?;
                (Some(Box::new(second)), third)
            } else {
                (None, second)
            };
            let close = self.expect_punct(']')?;
            let end_ref = end.src_ref.clone();
            return Ok(Value {
                kind: ValueKind::Range {
                    start: Box::new(first),
                    step,
                    end: Box::new(end),
                },
                src_ref: SrcRef::merge(&open, &SrcRef::merge(&end_ref, &close)),
            });
        }
        let mut items = vec![first];
        while self.is_punct(',') {
            self.bump();
            items.push(self.parse_value()?);
        }
        let close = self.expect_punct(']')?;
        Ok(Value {
            kind: ValueKind::Array(items),
            src_ref: SrcRef::merge(&open, &close),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Vec<SynNode> {
        let buf = SourceBuffer::new(src);
        parse_source(&buf).expect("parse ok")
    }

    #[test]
    fn parses_simple_call() {
        let body = parse("cube(10);");
        assert_eq!(body.len(), 1);
        match &body[0] {
            SynNode::Call(c) => {
                assert_eq!(c.name, "cube");
                assert_eq!(c.args.len(), 1);
                assert!(c.body.is_empty());
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn parses_nested_block() {
        let body = parse("difference() { cube(10); translate([5,0,0]) cube(10); }");
        let SynNode::Call(c) = &body[0] else {
            panic!("call")
        };
        assert_eq!(c.name, "difference");
        assert_eq!(c.body.len(), 2);
    }

    #[test]
    fn parses_chained_tail_call() {
        let body = parse("translate([1,2,3]) cube(1);");
        let SynNode::Call(c) = &body[0] else {
            panic!("call")
        };
        assert_eq!(c.name, "translate");
        assert_eq!(c.body.len(), 1);
        let SynNode::Call(inner) = &c.body[0] else {
            panic!("call")
        };
        assert_eq!(inner.name, "cube");
    }

    #[test]
    fn parses_keyword_args_and_modifiers() {
        let body = parse("%sphere(r=10, $fn=8);");
        let SynNode::Call(c) = &body[0] else {
            panic!("call")
        };
        assert_eq!(c.modifiers, vec![Modifier::Background]);
        assert_eq!(c.args[0].name.as_deref(), Some("r"));
        assert_eq!(c.args[1].name.as_deref(), Some("$fn"));
    }

    #[test]
    fn parses_range_literal() {
        let body = parse("foo(a=[0:2:10]);");
        let SynNode::Call(c) = &body[0] else {
            panic!("call")
        };
        match &c.args[0].value.kind {
            ValueKind::Range { step, .. } => assert!(step.is_some()),
            other => panic!("expected range, got {other:?}"),
        }
    }

    #[test]
    fn unnamed_group_block() {
        let body = parse("{ cube(1); cube(2); }");
        let SynNode::Call(c) = &body[0] else {
            panic!("call")
        };
        assert!(c.name.is_empty());
        assert_eq!(c.body.len(), 2);
    }

    #[test]
    fn unclosed_paren_is_parse_error() {
        let buf = SourceBuffer::new("cube(10;");
        let err = parse_source(&buf).unwrap_err();
        assert!(matches!(err, ParseError::Expected { .. }));
    }
}
