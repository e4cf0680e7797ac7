// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Concrete syntax tree for journal files.
//!
//! The tree is *loss-less*: nodes keep the tokens they were parsed from
//! (with attached whitespace), and [`File`] additionally owns the complete
//! token stream in lexer order, so the original buffer can be recovered
//! byte-for-byte — see [`crate::unparse`].
//!
//! Every node exposes `span()`, derived from its constituent tokens and
//! groups, for diagnostics and IDE features. Nodes never hold
//! back-references to parents.

use std::collections::BTreeMap;

use ecow::EcoString;

use crate::source_analysis::{Group, Span, Token, TokenKind};

/// A calendar date as written: two or three integers separated by `/` or
/// `-`. Component ranges are not validated here; the lexical shape is all
/// the parser accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Date {
    /// The integer and separator tokens, in source order.
    pub raw: Group,
}

impl Date {
    /// Returns the date text, e.g. `2024-06-12`.
    #[must_use]
    pub fn text(&self) -> EcoString {
        self.raw.inner_text()
    }

    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.raw.span()
    }
}

/// A secondary date following `=` on a transaction header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxDate {
    /// The `=` token.
    pub equal: Token,
    /// The date after the `=`.
    pub date: Date,
}

impl AuxDate {
    /// Returns the source span, `=` included.
    #[must_use]
    pub fn span(&self) -> Span {
        self.equal.span().merge(self.date.span())
    }
}

/// A transaction code in parentheses, e.g. `(INV-42)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// The `(` token.
    pub open: Token,
    /// The tokens between the parentheses.
    pub contents: Group,
    /// The `)` token.
    pub close: Token,
}

impl Code {
    /// Returns the code text without the parentheses.
    #[must_use]
    pub fn text(&self) -> EcoString {
        self.contents.inner_text()
    }

    /// Returns the source span, parentheses included.
    #[must_use]
    pub fn span(&self) -> Span {
        self.open.span().merge(self.close.span())
    }
}

/// An amount: a number with an optional sign and an optional commodity on
/// either side. Which commodity slot is populated records the unit
/// placement (`$5` vs `5 USD`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    /// The `-` token, if the amount is negative.
    pub minus: Option<Token>,
    /// The number token.
    pub number: Token,
    /// Commodity written before the number, e.g. `$`.
    pub pre_commodity: Option<Group>,
    /// Commodity written after the number, e.g. `USD`.
    pub post_commodity: Option<Group>,
}

impl Amount {
    /// Returns the digits as written.
    #[must_use]
    pub fn number_text(&self) -> &str {
        self.number.inner_text()
    }

    /// Returns `true` if a minus sign was present.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.minus.is_some()
    }

    /// Returns the commodity text, from whichever side it was written on.
    #[must_use]
    pub fn commodity_text(&self) -> Option<EcoString> {
        self.pre_commodity
            .as_ref()
            .or(self.post_commodity.as_ref())
            .map(Group::inner_text)
    }

    /// Returns the source span over sign, number, and commodity.
    #[must_use]
    pub fn span(&self) -> Span {
        let mut span = self.number.span();
        if let Some(minus) = &self.minus {
            span = span.merge(minus.span());
        }
        if let Some(pre) = &self.pre_commodity {
            span = span.merge(pre.span());
        }
        if let Some(post) = &self.post_commodity {
            span = span.merge(post.span());
        }
        span
    }
}

/// How a surrounded account posts against the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKind {
    /// `(Account)` — excluded from balancing.
    Virtual,
    /// `[Account]` — must still balance.
    BalancedVirtual,
}

impl VirtualKind {
    /// Returns the kind implied by an opening delimiter token.
    ///
    /// # Panics
    ///
    /// Panics on any token other than `(` or `[` — the account production
    /// only reaches this with one of those two.
    #[must_use]
    pub fn for_open_token(open: &Token) -> Self {
        match open.kind() {
            TokenKind::LeftParen => Self::Virtual,
            TokenKind::LeftBracket => Self::BalancedVirtual,
            kind => unreachable!("virtual account opened by {kind}"),
        }
    }
}

/// An account reference inside a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    /// A plain account name, e.g. `Expenses:Food`.
    Bare {
        /// The tokens of the account name.
        name: Group,
    },
    /// A virtual account surrounded by `(...)` or `[...]`.
    Surrounded {
        /// The opening `(` or `[`.
        open: Token,
        /// The tokens of the account name.
        name: Group,
        /// The matching `)` or `]`.
        close: Token,
        /// Balancing behavior keyed by the opening delimiter.
        virtual_kind: VirtualKind,
    },
}

impl AccountRef {
    /// Returns the account name without surrounding delimiters.
    #[must_use]
    pub fn name(&self) -> EcoString {
        match self {
            Self::Bare { name } | Self::Surrounded { name, .. } => name.inner_text(),
        }
    }

    /// Returns the virtual kind, or `None` for a bare account.
    #[must_use]
    pub fn virtual_kind(&self) -> Option<VirtualKind> {
        match self {
            Self::Bare { .. } => None,
            Self::Surrounded { virtual_kind, .. } => Some(*virtual_kind),
        }
    }

    /// Returns the source span, delimiters included for the surrounded
    /// form.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Bare { name } => name.span(),
            Self::Surrounded { open, close, .. } => open.span().merge(close.span()),
        }
    }
}

/// A transaction payee. May span several hard-space-separated runs; they
/// all belong to the same group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payee {
    /// The payee tokens.
    pub raw: Group,
}

impl Payee {
    /// Returns the payee text with interior spacing preserved.
    #[must_use]
    pub fn name(&self) -> EcoString {
        self.raw.inner_text()
    }

    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.raw.span()
    }
}

/// A comment, attached to a transaction, a posting, or the file itself.
///
/// Tag extraction (`:tag:`, `key: value`) is deliberately not performed;
/// the maps are present and deterministically empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// The comment token.
    pub token: Token,
    /// The leader character (`;`, `#`, `%`, `*`, or `|`).
    pub comment_char: char,
    /// The text after the leader character.
    pub body: EcoString,
    /// Plain tags. Always empty; extraction is an open extension.
    pub tags: BTreeMap<EcoString, EcoString>,
    /// Typed tags. Always empty; extraction is an open extension.
    pub typed_tags: BTreeMap<EcoString, EcoString>,
}

impl Comment {
    /// Builds a comment node from its token.
    ///
    /// # Panics
    ///
    /// Panics if the token text is empty — the lexer's comment rule always
    /// consumes at least the leader character.
    #[must_use]
    pub fn from_token(token: Token) -> Self {
        let mut chars = token.inner_text().chars();
        let comment_char = chars
            .next()
            .expect("comment token starts with its leader character");
        let body = EcoString::from(chars.as_str());
        Self {
            token,
            comment_char,
            body,
            tags: BTreeMap::new(),
            typed_tags: BTreeMap::new(),
        }
    }

    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.token.span()
    }
}

/// An account/amount entry inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// The account being posted to.
    pub account: AccountRef,
    /// The amount, if one was written. When present, the source separated
    /// it from the account with a hard space.
    pub amount: Option<Amount>,
    /// Comments attached to this posting: a trailing comment on the same
    /// line and/or indented comment lines after it.
    pub comments: Vec<Comment>,
}

impl Posting {
    /// Returns the source span over account, amount, and comments.
    #[must_use]
    pub fn span(&self) -> Span {
        let mut span = self.account.span();
        if let Some(amount) = &self.amount {
            span = span.merge(amount.span());
        }
        if let Some(last) = self.comments.last() {
            span = span.merge(last.span());
        }
        span
    }
}

/// A transaction: a dated header line plus indented postings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The primary date.
    pub date: Date,
    /// The auxiliary date after `=`, if any.
    pub aux_date: Option<AuxDate>,
    /// The `*` flag token, if the transaction is cleared.
    pub cleared: Option<Token>,
    /// The `!` flag token, if the transaction is pending. Mutually
    /// exclusive with `cleared`.
    pub pending: Option<Token>,
    /// The transaction code in parentheses, if any.
    pub code: Option<Code>,
    /// The payee, if any.
    pub payee: Option<Payee>,
    /// Comments attached to the header (trailing) or to the transaction
    /// body before any posting.
    pub comments: Vec<Comment>,
    /// The postings, in source order.
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Returns `true` if the `*` flag was present.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.cleared.is_some()
    }

    /// Returns `true` if the `!` flag was present.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns the source span from the date to the last posting or
    /// comment.
    #[must_use]
    pub fn span(&self) -> Span {
        let mut span = self.date.span();
        if let Some(aux) = &self.aux_date {
            span = span.merge(aux.span());
        }
        for token in [&self.cleared, &self.pending].into_iter().flatten() {
            span = span.merge(token.span());
        }
        if let Some(code) = &self.code {
            span = span.merge(code.span());
        }
        if let Some(payee) = &self.payee {
            span = span.merge(payee.span());
        }
        if let Some(last) = self.comments.last() {
            span = span.merge(last.span());
        }
        if let Some(last) = self.postings.last() {
            span = span.merge(last.span());
        }
        span
    }
}

/// A key/value line indented under a standard directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDirective {
    /// The key identifier.
    pub key: Token,
    /// Everything after the key up to the line end, if anything.
    pub value: Option<Group>,
}

impl SubDirective {
    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        match &self.value {
            Some(value) => self.key.span().merge(value.span()),
            None => self.key.span(),
        }
    }
}

/// A standard directive: an identifier, an optional argument, and zero or
/// more indented sub-directives, e.g.
///
/// ```text
/// account Expenses:Food
///   note groceries and dining
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The directive name.
    pub name: Token,
    /// The argument tokens up to the line end, if any.
    pub argument: Option<Group>,
    /// Indented key/value lines.
    pub sub_directives: Vec<SubDirective>,
}

impl Directive {
    /// Returns the source span over name, argument, and sub-directives.
    #[must_use]
    pub fn span(&self) -> Span {
        let mut span = self.name.span();
        if let Some(argument) = &self.argument {
            span = span.merge(argument.span());
        }
        if let Some(last) = self.sub_directives.last() {
            span = span.merge(last.span());
        }
        span
    }
}

/// An `apply` directive, e.g. `apply account Expenses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apply {
    /// The `apply` token.
    pub keyword: Token,
    /// What is being applied (`account`, `tag`, …).
    pub name: Token,
    /// The arguments up to the line end, if any.
    pub args: Option<Group>,
}

impl Apply {
    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        let end = self
            .args
            .as_ref()
            .map_or_else(|| self.name.span(), Group::span);
        self.keyword.span().merge(end)
    }
}

/// An `end` directive, e.g. `end apply account`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct End {
    /// The `end` token.
    pub keyword: Token,
    /// The optional `apply` token.
    pub apply: Option<Token>,
    /// The name of the block being ended.
    pub name: Token,
}

impl End {
    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.keyword.span().merge(self.name.span())
    }
}

/// An `alias` directive: `alias name = value`. The value may itself
/// contain `=`; only the first one splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// The `alias` token.
    pub keyword: Token,
    /// The left-hand side.
    pub name: Group,
    /// The first `=` token.
    pub equal: Token,
    /// The right-hand side, through to the line end.
    pub value: Group,
}

impl Alias {
    /// Returns the source span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.keyword.span().merge(self.value.span())
    }
}

/// A block comment directive: `comment … end comment` or
/// `test … end test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDirective {
    /// The opening `comment` or `test` token.
    pub name: Token,
    /// The raw text between the opening line and the terminator.
    pub body: EcoString,
    /// The terminating `end` token.
    pub end_keyword: Token,
    /// The terminating name token (matches `name`).
    pub end_name: Token,
}

impl CommentDirective {
    /// Returns the source span from the opening name to the closing name.
    #[must_use]
    pub fn span(&self) -> Span {
        self.name.span().merge(self.end_name.span())
    }
}

/// A top-level item in a journal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A transaction with postings.
    Transaction(Transaction),
    /// A standard directive.
    Directive(Directive),
    /// An `apply` directive.
    Apply(Apply),
    /// An `end` directive.
    End(End),
    /// An `alias` directive.
    Alias(Alias),
    /// A `comment`/`test` block.
    CommentDirective(CommentDirective),
    /// A standalone comment line.
    Comment(Comment),
}

impl Item {
    /// Returns the source span of the item.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Self::Transaction(t) => t.span(),
            Self::Directive(d) => d.span(),
            Self::Apply(a) => a.span(),
            Self::End(e) => e.span(),
            Self::Alias(a) => a.span(),
            Self::CommentDirective(c) => c.span(),
            Self::Comment(c) => c.span(),
        }
    }
}

/// A parsed journal file.
///
/// `items` holds the successfully parsed top-level children; `tokens`
/// holds every cooked token the lexer produced (in lexer order, `Eof`
/// included), which makes the file renderable byte-for-byte even when
/// some lines failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Top-level children in source order.
    pub items: Vec<Item>,
    /// The complete token stream, `Eof` included.
    pub tokens: Vec<Token>,
    /// Span over all children (empty for an empty file).
    pub span: Span,
}

impl File {
    /// Returns `true` if the file has no parsed children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
