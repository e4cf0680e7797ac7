// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for journal files.
//!
//! The parser is a stateful facade over the [`Lexer`] with single-token
//! lookahead. It is designed for IDE use:
//!
//! - **Error recovery is mandatory** — `parse` always produces a [`File`]
//! - **Multiple errors** — report all diagnostics, don't stop at the first
//! - **Precise spans** — every diagnostic points at exact source bytes
//! - **Loss-less** — every consumed token is retained, so the file renders
//!   back to the original buffer
//!
//! # Structure
//!
//! This module holds the parser state, the token-level primitives the
//! grammar is written in (`expect`, `skip_if`, `slurp_until`, …), and the
//! top-level Ready/Panic loop. The productions themselves — one per
//! syntactic category — live in the `grammar` submodule as further
//! `impl Parser` blocks.
//!
//! # Error recovery
//!
//! Productions return `Result`; the first failure inside a production
//! short-circuits (via `?`) back to the file loop, which records the
//! diagnostic and enters panic mode: `synchronize` discards
//! tokens until the next unindented start of line. Transactions are
//! line-terminated and postings must be indented, so line-based
//! resynchronization keeps one malformed line from cascading.
//!
//! # Usage
//!
//! ```
//! use tally_core::source_analysis::parse;
//!
//! let result = parse("2024-06-12 Grocery Store\n  Expenses:Food  $50.23\n  Assets:Checking\n");
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.file.items.len(), 1);
//! assert!(result.accounts.contains("Expenses:Food"));
//! assert!(result.payees.contains("Grocery Store"));
//! ```

use ecow::eco_format;

use crate::cst::{File, Item};

use super::{
    Group, GroupBuilder, Lexer, ParseDiagnostic, Span, SymbolTable, Token, TokenKind,
};

mod grammar;

/// The outcome of one grammar production.
///
/// Sequencing productions with `?` is the uniform way failures propagate:
/// each step hands its value to the next, and the first `Err` aborts the
/// enclosing item.
pub(crate) type Production<T> = Result<T, ParseDiagnostic>;

/// Everything a parse pass produces.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The parsed file, including every token for loss-less rendering.
    pub file: File,
    /// Diagnostics in discovery order (left-to-right source order).
    pub diagnostics: Vec<ParseDiagnostic>,
    /// Account name → span of first declaration.
    pub accounts: SymbolTable,
    /// Payee name → span of first declaration.
    pub payees: SymbolTable,
}

/// Parses journal source text.
///
/// Never fails: syntax errors become diagnostics and the parser resumes at
/// the next unindented line, so the returned file still contains the items
/// on either side of each error.
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    Parser::new(Lexer::new(source)).parse()
}

/// The parser state.
///
/// Owns the lexer, the diagnostic list, and the two symbol tables for the
/// duration of a parse; `parse` moves all of them into the returned
/// [`ParseResult`].
pub(crate) struct Parser<'src> {
    /// The token source.
    lexer: Lexer<'src>,
    /// Every token consumed so far, in lexer order.
    tokens: Vec<Token>,
    /// Accumulated diagnostics.
    diagnostics: Vec<ParseDiagnostic>,
    /// Declared account names.
    pub(super) accounts: SymbolTable,
    /// Declared payee names.
    pub(super) payees: SymbolTable,
}

impl<'src> Parser<'src> {
    /// Creates a parser over the given lexer.
    pub(crate) fn new(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            accounts: SymbolTable::new(),
            payees: SymbolTable::new(),
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    /// Returns the next token without consuming it.
    pub(super) fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    /// Returns the kind of the next token.
    pub(super) fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind()
    }

    /// Consumes and returns the next token, retaining a copy for the
    /// file's token stream.
    pub(super) fn next(&mut self) -> Token {
        let token = self.lexer.next_token();
        self.tokens.push(token.clone());
        token
    }

    /// Returns the most recently consumed token, if any.
    pub(super) fn previous(&self) -> Option<&Token> {
        self.lexer.previous()
    }

    /// Returns `true` if the next token's kind is one of `kinds`.
    pub(super) fn peek_is(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek_kind())
    }

    /// Consumes and returns the next token iff its kind is one of `kinds`.
    pub(super) fn skip_if(&mut self, kinds: &[TokenKind]) -> Option<Token> {
        if self.peek_is(kinds) {
            Some(self.next())
        } else {
            None
        }
    }

    /// Consumes the next token and requires its kind to be one of `kinds`.
    ///
    /// The offending token *is* consumed on mismatch — this guarantees the
    /// parser makes progress — and the error carries its span. At end of
    /// input nothing is consumed and the error is `UnexpectedEof`.
    pub(super) fn expect(&mut self, kinds: &[TokenKind], what: &str) -> Production<Token> {
        if self.peek().is_eof() {
            let span = self.peek().span();
            return Err(ParseDiagnostic::unexpected_eof(
                eco_format!("expected {what}, found end of input"),
                span,
            ));
        }
        let token = self.next();
        if kinds.contains(&token.kind()) {
            Ok(token)
        } else {
            Err(ParseDiagnostic::unexpected_token(
                eco_format!("expected {what}, found {}", token.kind()),
                token.span(),
            ))
        }
    }

    /// Expects an identifier token with exactly the given text.
    pub(super) fn expect_identifier(&mut self, name: &str) -> Production<Token> {
        let token = self.expect(&[TokenKind::Identifier], name)?;
        if token.inner_text() == name {
            Ok(token)
        } else {
            Err(ParseDiagnostic::unexpected_token(
                eco_format!("expected '{name}', found '{}'", token.inner_text()),
                token.span(),
            ))
        }
    }

    /// Expects a number token whose text is a plain decimal integer.
    pub(super) fn expect_integer(&mut self) -> Production<Token> {
        let token = self.expect(&[TokenKind::Number], "integer")?;
        if token.inner_text().bytes().all(|b| b.is_ascii_digit()) {
            Ok(token)
        } else {
            Err(ParseDiagnostic::invalid_integer(
                eco_format!("expected integer, found '{}'", token.inner_text()),
                token.span(),
            ))
        }
    }

    /// Consumes the line terminator. Returns the newline token, or `None`
    /// at end of input (which is left unconsumed for the file loop).
    pub(super) fn expect_end_of_line(&mut self) -> Production<Option<Token>> {
        if self.peek().is_eof() {
            return Ok(None);
        }
        let token = self.next();
        if token.kind() == TokenKind::Newline {
            Ok(Some(token))
        } else {
            Err(ParseDiagnostic::unexpected_token(
                eco_format!("expected end of line, found {}", token.kind()),
                token.span(),
            ))
        }
    }

    // ========================================================================
    // Space and line queries
    // ========================================================================

    /// Requires a hard space between the previous token and the next one.
    pub(super) fn expect_hard_space(&mut self) -> Production<()> {
        let span = self.peek().span();
        let peek_hard = self.peek().begins_with_hard_space();
        let prev_hard = self.previous().is_some_and(Token::ends_with_hard_space);
        if prev_hard || peek_hard {
            Ok(())
        } else {
            Err(ParseDiagnostic::unexpected_token(
                "expected a hard space (a tab or two spaces)",
                span,
            ))
        }
    }

    /// Requires end-of-line or any space (hard or soft) between the
    /// previous token and the next one. Consumes nothing.
    pub(super) fn inline_space(&mut self) -> Production<()> {
        if !self.line_has_next() {
            return Ok(());
        }
        let span = self.peek().span();
        let peek_spaced = self.peek().begins_with_space();
        let prev_spaced = self.previous().is_some_and(Token::ends_with_space);
        if prev_spaced || peek_spaced {
            Ok(())
        } else {
            Err(ParseDiagnostic::unexpected_token("expected a space", span))
        }
    }

    /// Returns `true` if the next token is neither a newline nor `Eof`.
    pub(super) fn line_has_next(&mut self) -> bool {
        !self.peek_kind().ends_line()
    }

    /// Returns `true` if the next token starts an indented continuation
    /// line: the previous token was a newline (or the stream has just
    /// started) and whitespace sits between it and the next token.
    pub(super) fn next_is_indented(&mut self) -> bool {
        if self.peek().is_eof() {
            return false;
        }
        let peek_spaced = self.peek().begins_with_space();
        match self.previous() {
            None => peek_spaced,
            Some(prev) if prev.kind() == TokenKind::Newline => {
                prev.ends_with_space() || peek_spaced
            }
            Some(_) => false,
        }
    }

    // ========================================================================
    // Slurps
    // ========================================================================

    /// Collects tokens up to (not including) any of `stops` or the line
    /// end. Fails if zero tokens were collected.
    pub(super) fn slurp_until(&mut self, stops: &[TokenKind]) -> Production<Group> {
        let mut builder = GroupBuilder::new();
        while self.line_has_next() && !self.peek_is(stops) {
            builder.push(self.next());
        }
        match builder.build() {
            Some(group) => Ok(group),
            None => Err(self.empty_slurp_error()),
        }
    }

    /// Collects tokens up to the line end. Fails if zero were collected.
    pub(super) fn slurp(&mut self) -> Production<Group> {
        self.slurp_until(&[])
    }

    /// Collects tokens until one borders a hard space, stopping at the
    /// line end. The token that *ends* with a hard space is included; a
    /// token that *begins* with one is not. Fails if zero were collected.
    pub(super) fn slurp_until_hard_space(&mut self) -> Production<Group> {
        let mut builder = GroupBuilder::new();
        while self.line_has_next() {
            if self.peek().begins_with_hard_space() {
                break;
            }
            let token = self.next();
            let ends_hard = token.ends_with_hard_space();
            builder.push(token);
            if ends_hard {
                break;
            }
        }
        match builder.build() {
            Some(group) => Ok(group),
            None => Err(self.empty_slurp_error()),
        }
    }

    /// The error for a slurp that collected nothing: `UnexpectedEof` when
    /// the line (or input) ended, `UnexpectedToken` otherwise.
    fn empty_slurp_error(&mut self) -> ParseDiagnostic {
        let kind = self.peek_kind();
        let span = self.peek().span();
        if kind.ends_line() {
            ParseDiagnostic::unexpected_eof("expected at least one token before the line end", span)
        } else {
            ParseDiagnostic::unexpected_token(
                eco_format!("expected at least one token before {kind}"),
                span,
            )
        }
    }

    /// Collects tokens until a run of identifier tokens spells `words` at
    /// consecutive positions. Tokens that start a partial match are
    /// buffered and flow into the body if the run breaks.
    ///
    /// Returns the body (None when empty) and the matched word tokens.
    /// Reaching end of input without a match is `UnexpectedEof`.
    pub(super) fn until_sequence(
        &mut self,
        words: &[&str],
    ) -> Production<(Option<Group>, Vec<Token>)> {
        debug_assert!(!words.is_empty());
        let mut body = GroupBuilder::new();
        let mut run: Vec<Token> = Vec::new();
        loop {
            if self.peek().is_eof() {
                let span = self.peek().span();
                return Err(ParseDiagnostic::unexpected_eof(
                    eco_format!("expected '{}' before end of input", words.join(" ")),
                    span,
                ));
            }
            let token = self.next();
            let continues_run =
                token.kind() == TokenKind::Identifier && token.inner_text() == words[run.len()];
            if continues_run {
                run.push(token);
                if run.len() == words.len() {
                    return Ok((body.build(), run));
                }
            } else {
                for buffered in run.drain(..) {
                    body.push(buffered);
                }
                // The breaking token may itself start a new run.
                if token.kind() == TokenKind::Identifier && token.inner_text() == words[0] {
                    run.push(token);
                } else {
                    body.push(token);
                }
            }
        }
    }

    /// Runs `body` for each indented continuation line, requiring an
    /// end-of-line after each, and collects the results.
    pub(super) fn while_indented<T>(
        &mut self,
        mut body: impl FnMut(&mut Self) -> Production<T>,
    ) -> Production<Vec<T>> {
        let mut items = Vec::new();
        while self.next_is_indented() {
            let item = body(self)?;
            self.expect_end_of_line()?;
            items.push(item);
        }
        Ok(items)
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    /// Records `error` and advances to the next unindented start of line
    /// (or end of input), discarding the remainder of the malformed item.
    pub(super) fn synchronize(&mut self, error: ParseDiagnostic) {
        self.diagnostics.push(error);
        loop {
            if self.peek().is_eof() {
                return;
            }
            let indented = self.next_is_indented();
            let at_line_start = self
                .previous()
                .is_none_or(|prev| prev.kind() == TokenKind::Newline);
            if at_line_start && !indented {
                return;
            }
            self.next();
        }
    }

    // ========================================================================
    // File loop
    // ========================================================================

    /// Parses the whole buffer, transferring the parser's state into the
    /// returned [`ParseResult`].
    pub(crate) fn parse(mut self) -> ParseResult {
        let mut items = Vec::new();

        loop {
            if self.peek().is_eof() {
                break;
            }
            if self.next_is_indented() {
                let span = self.peek().span();
                self.synchronize(ParseDiagnostic::leading_space(span));
                continue;
            }
            if self.peek_kind() == TokenKind::Newline {
                // A blank line separates items; keep the token, emit nothing.
                self.next();
                continue;
            }

            let outcome = match self.peek_kind() {
                TokenKind::Number => self.parse_transaction().map(Item::Transaction),
                TokenKind::Comment => self.parse_comment().map(Item::Comment),
                TokenKind::Identifier => self.parse_directive_item(),
                kind => {
                    let token = self.next();
                    Err(ParseDiagnostic::unexpected_token(
                        eco_format!("expected a transaction, directive, or comment, found {kind}"),
                        token.span(),
                    ))
                }
            };

            match outcome {
                Ok(item) => items.push(item),
                Err(error) => self.synchronize(error),
            }
        }

        // Consume the virtual Eof so whitespace-only buffers round-trip.
        let eof = self.next();
        debug_assert!(eof.is_eof());

        let span = items
            .iter()
            .map(Item::span)
            .reduce(Span::merge)
            .unwrap_or_default();

        ParseResult {
            file: File {
                items,
                tokens: self.tokens,
                span,
            },
            diagnostics: self.diagnostics,
            accounts: self.accounts,
            payees: self.payees,
        }
    }
}
