// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tokeniser (§4.1).

mod lexer;
mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind};
