// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for journal source text.
//!
//! The lexer is hand-written for control over whitespace attachment and
//! error recovery. It never fails: every byte of input lands in exactly one
//! token's `outer_text`, so concatenating the stream reproduces the buffer.
//!
//! # Whitespace attachment
//!
//! Internally the lexer scans whitespace runs (`[ \t]+`) like any other
//! piece of text, but they never surface as tokens. A run between two
//! tokens becomes the *trailing* whitespace of the first; a run at the very
//! start of the buffer becomes the *leading* whitespace of the first token
//! (or of the virtual `Eof` token for whitespace-only input). This choice
//! is deterministic and observable: the parser asks `previous` whether it
//! `ends_with_hard_space` to find the account/amount boundary.
//!
//! # Context sensitivity
//!
//! `;` opens a comment anywhere on a line. The additional comment leaders
//! `# % * |` open a comment only when they sit at the start of a line
//! (offset 0 or immediately after a newline, with no intervening
//! whitespace); elsewhere `*` is the cleared flag and the rest are plain
//! symbol tokens.
//!
//! # Example
//!
//! ```
//! use tally_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("1/2 Coffee\n");
//! let kinds: Vec<_> = tokens.iter().map(|t| t.kind()).collect();
//! assert_eq!(kinds, vec![
//!     TokenKind::Number,
//!     TokenKind::Slash,
//!     TokenKind::Number,
//!     TokenKind::Identifier,
//!     TokenKind::Newline,
//!     TokenKind::Eof,
//! ]);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{Span, Token, TokenKind};

/// Tokenizes the entire source, returning every token up to and including
/// the virtual `Eof` marker.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// A lexer over journal source text.
///
/// The lexer hands out [`Token`]s one at a time with a single token of
/// lookahead ([`Lexer::peek`]) and remembers the most recently consumed
/// token ([`Lexer::previous`]). Once the buffer is exhausted it keeps
/// returning a zero-length `Eof` token; the [`Iterator`] implementation
/// yields that `Eof` once and then terminates.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// True when the next character sits at offset 0 or directly after a
    /// newline, with no whitespace in between.
    at_line_start: bool,
    /// One cooked token of lookahead.
    peeked: Option<Token>,
    /// The most recently consumed token.
    previous: Option<Token>,
    /// Set once the iterator has yielded `Eof`.
    exhausted: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("position", &self.position)
            .field("remaining", &self.source.get(self.position..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            at_line_start: true,
            peeked: None,
            previous: None,
            exhausted: false,
        }
    }

    /// Returns the source buffer this lexer reads from.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            let token = self.read_token();
            self.peeked = Some(token);
        }
        self.peeked.as_ref().expect("lookahead was just filled")
    }

    /// Consumes and returns the next token, updating `previous`.
    ///
    /// Past the end of input this returns a fresh zero-length `Eof` token
    /// whose offset is the end of the buffer.
    pub fn next_token(&mut self) -> Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.read_token(),
        };
        self.previous = Some(token.clone());
        token
    }

    /// Returns the most recently consumed token, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Token> {
        self.previous.as_ref()
    }

    /// Returns `true` if the next token is not `Eof`.
    pub fn has_next(&mut self) -> bool {
        !self.peek().is_eof()
    }

    // ========================================================================
    // Character helpers
    // ========================================================================

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming (n=0 is the same as
    /// `peek_char`).
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "buffer offsets fit in u32"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        span.text(self.source)
    }

    // ========================================================================
    // Token assembly
    // ========================================================================

    /// Consumes a run of spaces and tabs, returning it as a string.
    fn take_inline_ws(&mut self) -> EcoString {
        let start = self.current_position();
        self.advance_while(|c| matches!(c, ' ' | '\t'));
        let text = self.text_for(Span::new(start, self.current_position()));
        EcoString::from(text)
    }

    /// Reads one cooked token: leading whitespace, the token text, then
    /// trailing whitespace.
    fn read_token(&mut self) -> Token {
        let offset = self.current_position();

        let leading = self.take_inline_ws();
        if !leading.is_empty() {
            self.at_line_start = false;
        }

        let start = self.current_position();
        let Some(c) = self.peek_char() else {
            // Virtual end-of-input marker; leftover whitespace (possible
            // only when the buffer held nothing else) rides along as
            // leading so the stream still round-trips.
            return Token::new(TokenKind::Eof, "", leading, "", offset);
        };

        let kind = self.scan_token(c, self.at_line_start);
        self.at_line_start = kind == TokenKind::Newline;

        let inner = self.text_for(Span::new(start, self.current_position()));
        let trailing = self.take_inline_ws();
        if !trailing.is_empty() {
            self.at_line_start = false;
        }

        Token::new(kind, inner, leading, trailing, offset)
    }

    /// Scans one raw token starting at `c`. First match wins.
    fn scan_token(&mut self, c: char, line_start: bool) -> TokenKind {
        match c {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            '\r' if self.peek_char_n(1) == Some('\n') => {
                self.advance(); // \r
                self.advance(); // \n
                TokenKind::Newline
            }

            ';' => self.scan_comment(),
            '#' | '%' | '|' if line_start => self.scan_comment(),
            '*' if line_start => self.scan_comment(),

            '"' => self.scan_string_or_symbol(),

            '0'..='9' => self.scan_number(),

            '=' => self.single(TokenKind::Equal),
            '~' => self.single(TokenKind::Tilde),
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            '[' => self.single(TokenKind::LeftBracket),
            ']' => self.single(TokenKind::RightBracket),
            '-' => self.single(TokenKind::Hyphen),
            '/' => self.single(TokenKind::Slash),
            '*' => self.single(TokenKind::Star),
            '!' => self.single(TokenKind::Bang),
            ':' => self.single(TokenKind::Colon),
            '@' => self.single(TokenKind::At),

            'a'..='z' | 'A'..='Z' => self.scan_identifier(),

            // Any other character is a one-character symbol token. There is
            // no error token: downstream grammar decides what to do with it.
            _ => self.single(TokenKind::Symbol),
        }
    }

    /// Consumes one character and returns `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Scans a comment through to (not including) the line end.
    fn scan_comment(&mut self) -> TokenKind {
        self.advance_while(|c| c != '\n' && c != '\r');
        TokenKind::Comment
    }

    /// Scans `"[^"\n]*"`. If no closing quote appears before the line end,
    /// the opening quote alone becomes a symbol token — mirroring regex
    /// alternation where the string rule simply fails to match.
    fn scan_string_or_symbol(&mut self) -> TokenKind {
        let mut probe = self.chars.clone();
        probe.next(); // opening quote
        let mut terminated = false;
        let mut chars_to_consume = 1usize;
        for (_, c) in probe {
            chars_to_consume += 1;
            match c {
                '"' => {
                    terminated = true;
                    break;
                }
                '\n' | '\r' => break,
                _ => {}
            }
        }

        if terminated {
            for _ in 0..chars_to_consume {
                self.advance();
            }
            TokenKind::String
        } else {
            self.advance();
            TokenKind::Symbol
        }
    }

    /// Scans digits optionally grouped by `.` or `,` — each separator must
    /// be followed by another digit to be part of the number.
    fn scan_number(&mut self) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());
        while matches!(self.peek_char(), Some('.' | ','))
            && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.advance(); // separator
            self.advance_while(|c| c.is_ascii_digit());
        }
        TokenKind::Number
    }

    /// Scans a run of ASCII letters.
    fn scan_identifier(&mut self) -> TokenKind {
        self.advance_while(|c| c.is_ascii_alphabetic());
        TokenKind::Identifier
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.exhausted = true;
        }
        Some(token)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).iter().map(Token::kind).collect()
    }

    fn render(source: &str) -> String {
        lex(source).iter().map(|t| t.outer_text().to_string()).collect()
    }

    #[test]
    fn empty_input_yields_only_eof() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert_eq!(tokens[0].outer_text(), "");
    }

    #[test]
    fn whitespace_only_input_rides_on_eof() {
        let tokens = lex(" \t ");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
        assert_eq!(tokens[0].leading_ws(), " \t ");
        assert_eq!(tokens[0].offset(), 0);
    }

    #[test]
    fn date_lexes_as_numbers_and_separators() {
        assert_eq!(
            kinds("2024-06-12"),
            vec![
                TokenKind::Number,
                TokenKind::Hyphen,
                TokenKind::Number,
                TokenKind::Hyphen,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn grouped_number_is_one_token() {
        let tokens = lex("1,000.00");
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].inner_text(), "1,000.00");
    }

    #[test]
    fn number_does_not_absorb_trailing_separator() {
        // "12." — the dot is not followed by a digit, so it stays separate.
        let tokens = lex("12.");
        assert_eq!(tokens[0].kind(), TokenKind::Number);
        assert_eq!(tokens[0].inner_text(), "12");
        assert_eq!(tokens[1].kind(), TokenKind::Symbol);
        assert_eq!(tokens[1].inner_text(), ".");
    }

    #[test]
    fn whitespace_between_tokens_trails_the_first() {
        let tokens = lex("a b");
        assert_eq!(tokens[0].trailing_ws(), " ");
        assert_eq!(tokens[1].leading_ws(), "");
    }

    #[test]
    fn hard_space_is_observable_on_the_previous_token() {
        let tokens = lex("Assets  42");
        assert!(tokens[0].ends_with_hard_space());
        assert!(!tokens[1].begins_with_space());
    }

    #[test]
    fn leading_buffer_whitespace_attaches_to_first_token() {
        let tokens = lex("  x");
        assert_eq!(tokens[0].leading_ws(), "  ");
        assert!(tokens[0].begins_with_hard_space());
        assert_eq!(tokens[0].offset(), 0);
    }

    #[test]
    fn indent_after_newline_trails_the_newline() {
        let tokens = lex("a\n  b");
        let newline = &tokens[1];
        assert_eq!(newline.kind(), TokenKind::Newline);
        assert_eq!(newline.trailing_ws(), "  ");
        assert_eq!(tokens[2].leading_ws(), "");
    }

    #[test]
    fn semicolon_comment_anywhere() {
        let tokens = lex("a ; note\n");
        assert_eq!(tokens[1].kind(), TokenKind::Comment);
        assert_eq!(tokens[1].inner_text(), "; note");
    }

    #[test]
    fn line_start_comment_leaders() {
        for source in ["# note", "% note", "| note", "* note"] {
            let tokens = lex(source);
            assert_eq!(tokens[0].kind(), TokenKind::Comment, "for {source:?}");
            assert_eq!(tokens[0].inner_text(), source);
        }
    }

    #[test]
    fn star_mid_line_is_a_star() {
        let tokens = lex("1 * x");
        assert_eq!(tokens[1].kind(), TokenKind::Star);
    }

    #[test]
    fn hash_mid_line_is_a_symbol() {
        let tokens = lex("1 # x");
        assert_eq!(tokens[1].kind(), TokenKind::Symbol);
    }

    #[test]
    fn indented_star_is_not_a_comment() {
        // Whitespace before the leader disqualifies the line-start rule.
        let tokens = lex("  * x");
        assert_eq!(tokens[0].kind(), TokenKind::Star);
    }

    #[test]
    fn comment_after_newline_is_at_line_start() {
        let tokens = lex("a\n# note");
        assert_eq!(tokens[2].kind(), TokenKind::Comment);
    }

    #[test]
    fn string_on_one_line() {
        let tokens = lex("\"hello world\"");
        assert_eq!(tokens[0].kind(), TokenKind::String);
        assert_eq!(tokens[0].inner_text(), "\"hello world\"");
    }

    #[test]
    fn unterminated_string_is_a_symbol_quote() {
        let tokens = lex("\"oops\n");
        assert_eq!(tokens[0].kind(), TokenKind::Symbol);
        assert_eq!(tokens[0].inner_text(), "\"");
        assert_eq!(tokens[1].kind(), TokenKind::Identifier);
        assert_eq!(tokens[1].inner_text(), "oops");
    }

    #[test]
    fn crlf_is_one_newline_token() {
        let tokens = lex("a\r\nb");
        assert_eq!(tokens[1].kind(), TokenKind::Newline);
        assert_eq!(tokens[1].inner_text(), "\r\n");
    }

    #[test]
    fn lone_carriage_return_is_a_symbol() {
        let tokens = lex("a\rb");
        assert_eq!(tokens[1].kind(), TokenKind::Symbol);
        assert_eq!(tokens[1].inner_text(), "\r");
    }

    #[test]
    fn trailing_whitespace_attaches_to_last_token() {
        let tokens = lex("a  ");
        assert_eq!(tokens[0].trailing_ws(), "  ");
        let eof = tokens.last().unwrap();
        assert!(eof.is_eof());
        assert_eq!(eof.leading_ws(), "");
    }

    #[test]
    fn eof_offset_is_buffer_end() {
        let tokens = lex("ab\n");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.offset(), 3);
        assert!(eof.span().is_empty());
    }

    #[test]
    fn iterator_terminates_after_eof() {
        let mut lexer = Lexer::new("x");
        assert_eq!(
            Iterator::next(&mut lexer).map(|t| t.kind()),
            Some(TokenKind::Identifier)
        );
        assert_eq!(Iterator::next(&mut lexer).map(|t| t.kind()), Some(TokenKind::Eof));
        assert_eq!(Iterator::next(&mut lexer), None);
    }

    #[test]
    fn next_token_past_the_end_keeps_returning_eof() {
        let mut lexer = Lexer::new("x");
        let _ = lexer.next_token();
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn previous_tracks_consumed_tokens() {
        let mut lexer = Lexer::new("a b");
        assert!(lexer.previous().is_none());
        let _ = lexer.next_token();
        assert_eq!(lexer.previous().unwrap().inner_text(), "a");
    }

    #[test]
    fn peek_is_idempotent() {
        let mut lexer = Lexer::new("a b");
        assert_eq!(lexer.peek().inner_text(), "a");
        assert_eq!(lexer.peek().inner_text(), "a");
        assert_eq!(lexer.next_token().inner_text(), "a");
        assert_eq!(lexer.peek().inner_text(), "b");
    }

    #[test]
    fn outer_text_round_trips() {
        let samples = [
            "",
            "   ",
            "2024-06-12 Grocery Store\n  Expenses:Food  $50.23\n  Assets:Checking\n",
            "; top comment\n\n2024/1/2 * (42) Cafe\t; tab\n",
            "alias Foo=Bar=Baz\n",
            "comment\n  anything at all\nend comment\n",
            "\"unterminated\nnext line\r\n",
            "unicode £ → ok\n",
        ];
        for source in samples {
            assert_eq!(render(source), *source, "round-trip failed for {source:?}");
        }
    }

    #[test]
    fn offset_invariant_holds() {
        let source = "2024-06-12 * Payee ; n\n  A:B  -1,5 EUR\n";
        for token in lex(source) {
            let start = token.offset() as usize;
            let end = start + token.outer_len();
            assert_eq!(&source[start..end], token.outer_text().as_str());
        }
    }
}
