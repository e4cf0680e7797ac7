// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for journal lexical analysis.
//!
//! Each token carries its inner text plus the whitespace runs immediately
//! before and after it, so that concatenating `outer_text` over a token
//! stream reproduces the source buffer byte-for-byte. Comments are
//! first-class tokens (not trivia): the grammar attaches them to
//! transactions and postings.
//!
//! # Hard and soft spaces
//!
//! The journal grammar treats a whitespace run containing a tab or two or
//! more consecutive spaces as a **hard space** — the delimiter between an
//! account and its amount, and between the runs of a multi-word payee. A
//! single space is a **soft space** and separates tokens only. Hardness is
//! a property query on the token's attached whitespace, not a separate
//! token.

use ecow::EcoString;

use super::Span;

/// The kind of a token, not including its text or location.
///
/// This is the closed set of syntactic elements in the journal language.
/// Whitespace never appears as a token kind: the lexer absorbs it onto the
/// adjacent tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A line break: `\n` or `\r\n`.
    Newline,
    /// A comment: `;` anywhere on a line, or one of `; # % * |` at the
    /// start of a line, through to the line end.
    Comment,
    /// A double-quoted string on a single line: `"..."`.
    String,
    /// A number: digits optionally grouped by `.` or `,` (e.g. `1,000.00`).
    Number,
    /// `=`
    Equal,
    /// `~`
    Tilde,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `-`
    Hyphen,
    /// `/`
    Slash,
    /// `*`
    Star,
    /// `!`
    Bang,
    /// `:`
    Colon,
    /// `@`
    At,
    /// A run of ASCII letters: `account`, `alias`, `apply`, …
    Identifier,
    /// Any other single non-whitespace character.
    Symbol,
    /// The virtual end-of-input marker. Zero-length; may carry leftover
    /// whitespace as leading so that whitespace-only buffers round-trip.
    Eof,
}

impl TokenKind {
    /// Returns `true` if this is the end-of-input marker.
    #[must_use]
    pub const fn is_eof(self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns `true` if this token ends a line (`Newline` or `Eof`).
    #[must_use]
    pub const fn ends_line(self) -> bool {
        matches!(self, Self::Newline | Self::Eof)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Newline => "newline",
            Self::Comment => "comment",
            Self::String => "string",
            Self::Number => "number",
            Self::Equal => "'='",
            Self::Tilde => "'~'",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::LeftBrace => "'{'",
            Self::RightBrace => "'}'",
            Self::LeftBracket => "'['",
            Self::RightBracket => "']'",
            Self::Hyphen => "'-'",
            Self::Slash => "'/'",
            Self::Star => "'*'",
            Self::Bang => "'!'",
            Self::Colon => "':'",
            Self::At => "'@'",
            Self::Identifier => "identifier",
            Self::Symbol => "symbol",
            Self::Eof => "end of input",
        };
        write!(f, "{name}")
    }
}

/// Returns `true` if a whitespace run counts as a hard space: it contains a
/// tab or at least two consecutive spaces.
#[must_use]
pub fn is_hard_space(ws: &str) -> bool {
    ws.contains('\t') || ws.contains("  ")
}

/// A token with its inner text, attached whitespace, and source offset.
///
/// Invariants:
///
/// - `offset` points at the first byte of `leading_ws`;
/// - the source bytes at `offset` are exactly
///   `leading_ws ++ inner_text ++ trailing_ws`.
///
/// Tokens are cheap to clone ([`EcoString`] text) and own their text, so a
/// parse tree built from them is self-contained relative to the source
/// buffer.
///
/// # Examples
///
/// ```
/// use tally_core::source_analysis::{Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier, "alias", "", "  ", 0);
/// assert_eq!(token.outer_text(), "alias  ");
/// assert!(token.ends_with_hard_space());
/// assert_eq!(token.span().as_range(), 0..5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    inner: EcoString,
    leading_ws: EcoString,
    trailing_ws: EcoString,
    offset: u32,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(
        kind: TokenKind,
        inner: impl Into<EcoString>,
        leading_ws: impl Into<EcoString>,
        trailing_ws: impl Into<EcoString>,
        offset: u32,
    ) -> Self {
        Self {
            kind,
            inner: inner.into(),
            leading_ws: leading_ws.into(),
            trailing_ws: trailing_ws.into(),
            offset,
        }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the token text without attached whitespace.
    #[must_use]
    pub fn inner_text(&self) -> &str {
        &self.inner
    }

    /// Returns the whitespace run preceding the token text.
    #[must_use]
    pub fn leading_ws(&self) -> &str {
        &self.leading_ws
    }

    /// Returns the whitespace run following the token text.
    #[must_use]
    pub fn trailing_ws(&self) -> &str {
        &self.trailing_ws
    }

    /// Returns the byte offset of the first byte of `leading_ws`.
    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Returns the token text with its attached whitespace.
    #[must_use]
    pub fn outer_text(&self) -> EcoString {
        let mut text = EcoString::with_capacity(self.outer_len());
        text.push_str(&self.leading_ws);
        text.push_str(&self.inner);
        text.push_str(&self.trailing_ws);
        text
    }

    /// Returns the byte length of `outer_text`.
    #[must_use]
    pub fn outer_len(&self) -> usize {
        self.leading_ws.len() + self.inner.len() + self.trailing_ws.len()
    }

    /// Returns the span of the inner text (whitespace excluded).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "token and whitespace lengths fit in u32"
    )]
    #[must_use]
    pub fn span(&self) -> Span {
        let start = self.offset + self.leading_ws.len() as u32;
        Span::new(start, start + self.inner.len() as u32)
    }

    /// Returns the span including the attached whitespace.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "token and whitespace lengths fit in u32"
    )]
    #[must_use]
    pub fn outer_span(&self) -> Span {
        Span::new(self.offset, self.offset + self.outer_len() as u32)
    }

    /// Returns `true` if any whitespace precedes the token text.
    #[must_use]
    pub fn begins_with_space(&self) -> bool {
        !self.leading_ws.is_empty()
    }

    /// Returns `true` if any whitespace follows the token text.
    #[must_use]
    pub fn ends_with_space(&self) -> bool {
        !self.trailing_ws.is_empty()
    }

    /// Returns `true` if the leading whitespace is a hard space.
    #[must_use]
    pub fn begins_with_hard_space(&self) -> bool {
        is_hard_space(&self.leading_ws)
    }

    /// Returns `true` if the trailing whitespace is a hard space.
    #[must_use]
    pub fn ends_with_hard_space(&self) -> bool {
        is_hard_space(&self.trailing_ws)
    }

    /// Returns `true` if this is the zero-length end-of-input marker.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind.is_eof()
    }
}
