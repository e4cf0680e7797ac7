// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Loss-less rendering: journal tokens back to source text.
//!
//! Because every token carries its own whitespace and [`crate::cst::File`]
//! retains the complete token stream, rendering is a single concatenation
//! pass — no pretty-printing layer is involved. For every input `s`,
//! `render_file(&parse(s).file) == s`, diagnostics or not.
//!
//! # Example
//!
//! ```
//! use tally_core::source_analysis::parse;
//! use tally_core::unparse::render_file;
//!
//! let source = "2024-06-12 Cafe\n  Expenses:Coffee  $4.50\n";
//! let result = parse(source);
//! assert_eq!(render_file(&result.file), source);
//! ```

use crate::cst::File;
use crate::source_analysis::Token;

/// Concatenates the outer text of `tokens` in order.
#[must_use]
pub fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.iter().map(Token::outer_len).sum());
    for token in tokens {
        out.push_str(token.leading_ws());
        out.push_str(token.inner_text());
        out.push_str(token.trailing_ws());
    }
    out
}

/// Renders a parsed file back to its exact source text.
#[must_use]
pub fn render_file(file: &File) -> String {
    render_tokens(&file.tokens)
}
