// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token groups: non-empty runs of tokens with a combined span.
//!
//! The grammar frequently needs "a run of tokens with a span" — a payee, a
//! commodity, a directive argument. [`Group`] models that run and is
//! constructed non-empty: [`GroupBuilder::build`] returns `None` for an
//! empty build, so "absent group" is `Option<Group>` rather than a group
//! with no span.

use ecow::EcoString;

use super::{Span, Token};

/// A non-empty ordered sequence of tokens.
///
/// # Examples
///
/// ```
/// use tally_core::source_analysis::{GroupBuilder, Token, TokenKind};
///
/// let mut builder = GroupBuilder::new();
/// builder.push(Token::new(TokenKind::Identifier, "Grocery", "", " ", 0));
/// builder.push(Token::new(TokenKind::Identifier, "Store", "", "", 8));
/// let group = builder.build().expect("two tokens were pushed");
/// assert_eq!(group.inner_text(), "Grocery Store");
/// assert_eq!(group.span().as_range(), 0..13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    tokens: Vec<Token>,
}

impl Group {
    /// Creates a group from a token sequence known to be non-empty.
    ///
    /// This is the one constructor that bypasses [`GroupBuilder`]'s
    /// emptiness check; callers must justify non-emptiness at the call
    /// site (e.g. the date production has already consumed at least three
    /// tokens).
    ///
    /// # Panics
    ///
    /// Panics if `tokens` is empty — that is a logic bug in the caller,
    /// not bad input.
    #[must_use]
    pub fn new_unchecked(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty(), "Group must contain at least one token");
        Self { tokens }
    }

    /// Returns the tokens of this group.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the first token.
    #[must_use]
    pub fn first(&self) -> &Token {
        &self.tokens[0]
    }

    /// Returns the last token.
    #[must_use]
    pub fn last(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Returns the number of tokens in the group (at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns the combined span of the group's tokens (whitespace
    /// excluded at both ends).
    #[must_use]
    pub fn span(&self) -> Span {
        self.tokens
            .iter()
            .skip(1)
            .fold(self.first().span(), |acc, t| acc.merge(t.span()))
    }

    /// Returns the group text with the group's own leading and trailing
    /// whitespace trimmed. Interior whitespace is preserved exactly.
    #[must_use]
    pub fn inner_text(&self) -> EcoString {
        if self.tokens.len() == 1 {
            return self.first().inner_text().into();
        }
        let mut text = EcoString::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                text.push_str(token.leading_ws());
            }
            text.push_str(token.inner_text());
            if i + 1 < self.tokens.len() {
                text.push_str(token.trailing_ws());
            }
        }
        text
    }

    /// Consumes the group, returning its tokens. Used when runs are
    /// concatenated into a larger group.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Returns the full group text including whitespace at both ends.
    #[must_use]
    pub fn outer_text(&self) -> EcoString {
        let mut text = EcoString::new();
        for token in &self.tokens {
            text.push_str(&token.outer_text());
        }
        text
    }
}

/// Incremental builder for a [`Group`].
///
/// `build` returns `None` when nothing was pushed, which removes the
/// empty-group class of bugs from span derivation.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    tokens: Vec<Token>,
}

impl GroupBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token to the group under construction.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Returns `true` if nothing has been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the number of tokens pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Finishes the build, returning `None` if the group would be empty.
    #[must_use]
    pub fn build(self) -> Option<Group> {
        if self.tokens.is_empty() {
            None
        } else {
            Some(Group { tokens: self.tokens })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::TokenKind;

    fn ident(text: &str, leading: &str, trailing: &str, offset: u32) -> Token {
        Token::new(TokenKind::Identifier, text, leading, trailing, offset)
    }

    #[test]
    fn empty_build_returns_none() {
        assert!(GroupBuilder::new().build().is_none());
    }

    #[test]
    fn single_token_group() {
        let mut builder = GroupBuilder::new();
        builder.push(ident("Assets", " ", "  ", 0));
        let group = builder.build().unwrap();
        assert_eq!(group.inner_text(), "Assets");
        assert_eq!(group.span(), Span::new(1, 7));
    }

    #[test]
    fn inner_text_trims_ends_only() {
        // " Expenses : Food  " — interior soft spaces survive, outer
        // whitespace does not.
        let mut builder = GroupBuilder::new();
        builder.push(ident("Expenses", " ", " ", 0));
        builder.push(Token::new(TokenKind::Colon, ":", "", " ", 10));
        builder.push(ident("Food", "", "  ", 12));
        let group = builder.build().unwrap();
        assert_eq!(group.inner_text(), "Expenses : Food");
        assert_eq!(group.outer_text(), " Expenses : Food  ");
    }

    #[test]
    fn span_covers_all_tokens() {
        let mut builder = GroupBuilder::new();
        builder.push(ident("a", "", " ", 0));
        builder.push(ident("b", "", "", 2));
        let group = builder.build().unwrap();
        assert_eq!(group.span(), Span::new(0, 3));
        assert_eq!(group.len(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one token")]
    fn new_unchecked_rejects_empty() {
        let _ = Group::new_unchecked(Vec::new());
    }
}
