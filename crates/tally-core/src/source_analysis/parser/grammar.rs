// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Grammar productions for the journal language.
//!
//! One function per syntactic category, each a pure function of the parser
//! state returning a [`Production`]. Failures short-circuit with `?` back
//! to the file loop, which records the diagnostic and resynchronizes.
//!
//! Hard spaces are the load-bearing delimiter here: they separate an
//! account from its amount and the runs of a multi-word payee. Soft
//! (single) spaces only separate tokens.

use ecow::EcoString;

use crate::cst::{
    AccountRef, Alias, Amount, Apply, AuxDate, Code, Comment, CommentDirective, Date, Directive,
    End, Item, Payee, Posting, SubDirective, Transaction, VirtualKind,
};
use crate::source_analysis::{Group, ParseDiagnostic, TokenKind};

use super::{Parser, Production};

/// Token kinds that terminate a commodity slurp inside an amount.
const AMOUNT_STOPS: &[TokenKind] = &[TokenKind::Hyphen, TokenKind::Number, TokenKind::Comment];

impl Parser<'_> {
    // ========================================================================
    // Dates
    // ========================================================================

    /// Parses a date: two or three integers joined by `/` or `-`. The
    /// second separator, if present, must match the first. Component
    /// ranges are not checked.
    pub(super) fn parse_date(&mut self) -> Production<Date> {
        let mut tokens = Vec::new();
        tokens.push(self.expect_integer()?);

        let separator = self.expect(&[TokenKind::Slash, TokenKind::Hyphen], "date separator")?;
        let separator_kind = separator.kind();
        tokens.push(separator);
        tokens.push(self.expect_integer()?);

        if self.peek_is(&[TokenKind::Slash, TokenKind::Hyphen]) {
            if self.peek_kind() != separator_kind {
                let span = self.peek().span();
                return Err(ParseDiagnostic::invalid_date(
                    "date separators must match",
                    span,
                ));
            }
            tokens.push(self.next());
            tokens.push(self.expect_integer()?);
        }

        // At least three tokens were pushed above.
        Ok(Date {
            raw: Group::new_unchecked(tokens),
        })
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Parses a transaction: the dated header line, then indented postings
    /// and comments.
    pub(super) fn parse_transaction(&mut self) -> Production<Transaction> {
        let date = self.parse_date()?;

        let aux_date = if self.peek_is(&[TokenKind::Equal]) {
            let equal = self.next();
            let date = self.parse_date()?;
            Some(AuxDate { equal, date })
        } else {
            None
        };

        self.inline_space()?;

        let mut cleared = None;
        let mut pending = None;
        if let Some(token) = self.skip_if(&[TokenKind::Star]) {
            cleared = Some(token);
        } else if let Some(token) = self.skip_if(&[TokenKind::Bang]) {
            pending = Some(token);
        }
        // Cleared xor pending: a second flag is a syntax error.
        if (cleared.is_some() || pending.is_some())
            && self.peek_is(&[TokenKind::Star, TokenKind::Bang])
        {
            let span = self.peek().span();
            return Err(ParseDiagnostic::unexpected_token(
                "a transaction may carry only one of '*' and '!'",
                span,
            ));
        }

        self.inline_space()?;

        let code = if self.peek_is(&[TokenKind::LeftParen]) {
            Some(self.parse_code()?)
        } else {
            None
        };

        self.inline_space()?;

        let payee = if self.line_has_next() && !self.peek_is(&[TokenKind::Comment]) {
            Some(self.parse_payee()?)
        } else {
            None
        };

        let mut comments = Vec::new();
        if let Some(token) = self.skip_if(&[TokenKind::Comment]) {
            comments.push(Comment::from_token(token));
        }
        self.expect_end_of_line()?;

        let mut postings: Vec<Posting> = Vec::new();
        while self.next_is_indented() {
            if self.peek_is(&[TokenKind::Comment]) {
                let comment = self.parse_comment()?;
                // Indented comments belong to the posting above them, or
                // to the transaction when no posting has appeared yet.
                match postings.last_mut() {
                    Some(posting) => posting.comments.push(comment),
                    None => comments.push(comment),
                }
            } else {
                let posting = self.parse_posting()?;
                self.expect_end_of_line()?;
                postings.push(posting);
            }
        }

        Ok(Transaction {
            date,
            aux_date,
            cleared,
            pending,
            code,
            payee,
            comments,
            postings,
        })
    }

    /// Parses a transaction code: `(` contents `)`.
    fn parse_code(&mut self) -> Production<Code> {
        let open = self.next();
        let contents = self.slurp_until(&[TokenKind::RightParen])?;
        let close = self.expect(&[TokenKind::RightParen], "')'")?;
        Ok(Code {
            open,
            contents,
            close,
        })
    }

    /// Parses a payee. The first hard-space-less run is required; further
    /// runs on the same line join the same group, so hard spaces may occur
    /// *inside* a payee name. Registers the payee symbol on success.
    fn parse_payee(&mut self) -> Production<Payee> {
        let first = self.slurp_until_hard_space()?;
        let mut tokens = first.into_tokens();
        while self.line_has_next() && !self.peek_is(&[TokenKind::Comment]) {
            let run = self.slurp_until_hard_space()?;
            tokens.extend(run.into_tokens());
        }

        // The first run put at least one token in.
        let raw = Group::new_unchecked(tokens);
        self.payees.add(raw.inner_text(), raw.span());
        Ok(Payee { raw })
    }

    // ========================================================================
    // Postings
    // ========================================================================

    /// Parses a posting: an account reference, an optional amount, and an
    /// optional trailing comment.
    pub(super) fn parse_posting(&mut self) -> Production<Posting> {
        let account = self.parse_account_ref()?;

        let amount = if self.line_has_next() && !self.peek_is(&[TokenKind::Comment]) {
            Some(self.parse_amount()?)
        } else {
            None
        };

        let mut comments = Vec::new();
        if let Some(token) = self.skip_if(&[TokenKind::Comment]) {
            comments.push(Comment::from_token(token));
        }

        Ok(Posting {
            account,
            amount,
            comments,
        })
    }

    /// Parses an account reference and registers it in the account table.
    ///
    /// `(` or `[` opens a virtual account: the contents run to the
    /// *matching* close, which must be present. Anything else is a bare
    /// account running to the next hard space or line end.
    pub(super) fn parse_account_ref(&mut self) -> Production<AccountRef> {
        if let Some(open) = self.skip_if(&[TokenKind::LeftParen, TokenKind::LeftBracket]) {
            let (close_kind, close_text) = match open.kind() {
                TokenKind::LeftParen => (TokenKind::RightParen, "')'"),
                TokenKind::LeftBracket => (TokenKind::RightBracket, "']'"),
                kind => unreachable!("virtual account opened by {kind}"),
            };
            let name = match self.slurp_until(&[close_kind]) {
                Ok(group) => group,
                Err(error) => {
                    return Err(ParseDiagnostic::invalid_account(
                        "expected an account name",
                        error.span,
                    ));
                }
            };
            let close = self.expect(&[close_kind], close_text)?;
            let virtual_kind = VirtualKind::for_open_token(&open);
            self.accounts.add(name.inner_text(), name.span());
            Ok(AccountRef::Surrounded {
                open,
                name,
                close,
                virtual_kind,
            })
        } else {
            let name = match self.slurp_until_hard_space() {
                Ok(group) => group,
                Err(error) => {
                    return Err(ParseDiagnostic::invalid_account(
                        "expected an account name",
                        error.span,
                    ));
                }
            };
            self.accounts.add(name.inner_text(), name.span());
            Ok(AccountRef::Bare { name })
        }
    }

    /// Parses an amount. A hard space must separate it from the account.
    ///
    /// The commodity may sit on either side of the number (`$5` vs
    /// `5 USD`); whichever slot is populated records the placement. A
    /// single `-` is accepted before the commodity or before the number,
    /// but not both.
    pub(super) fn parse_amount(&mut self) -> Production<Amount> {
        self.expect_hard_space()?;

        let mut minus = self.skip_if(&[TokenKind::Hyphen]);

        if self.peek_is(&[TokenKind::Number]) {
            let number = self.next();
            let post_commodity = if self.line_has_next() && !self.peek_is(AMOUNT_STOPS) {
                Some(self.slurp_until(AMOUNT_STOPS)?)
            } else {
                None
            };
            Ok(Amount {
                minus,
                number,
                pre_commodity: None,
                post_commodity,
            })
        } else if self.line_has_next() {
            let pre_commodity = Some(self.slurp_until(AMOUNT_STOPS)?);
            if minus.is_none() {
                minus = self.skip_if(&[TokenKind::Hyphen]);
            }
            let number = self.expect(&[TokenKind::Number], "amount")?;
            Ok(Amount {
                minus,
                number,
                pre_commodity,
                post_commodity: None,
            })
        } else {
            // Line ended where a number was required; expect reports it.
            let number = self.expect(&[TokenKind::Number], "amount")?;
            Ok(Amount {
                minus,
                number,
                pre_commodity: None,
                post_commodity: None,
            })
        }
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Parses a standalone comment line.
    pub(super) fn parse_comment(&mut self) -> Production<Comment> {
        let token = self.expect(&[TokenKind::Comment], "comment")?;
        let comment = Comment::from_token(token);
        self.expect_end_of_line()?;
        Ok(comment)
    }

    // ========================================================================
    // Directives
    // ========================================================================

    /// Dispatches a top-level directive by its leading identifier.
    pub(super) fn parse_directive_item(&mut self) -> Production<Item> {
        let name: EcoString = self.peek().inner_text().into();
        match name.as_str() {
            "alias" => self.parse_alias().map(Item::Alias),
            "apply" => self.parse_apply().map(Item::Apply),
            "end" => self.parse_end().map(Item::End),
            "comment" | "test" => self.parse_comment_block().map(Item::CommentDirective),
            _ => self.parse_standard_directive().map(Item::Directive),
        }
    }

    /// Parses `alias name = value`. The name runs to the first `=`; the
    /// value runs to the line end and may itself contain `=`.
    fn parse_alias(&mut self) -> Production<Alias> {
        let keyword = self.next();
        let name = self.slurp_until(&[TokenKind::Equal])?;
        let equal = self.expect(&[TokenKind::Equal], "'='")?;
        let value = self.slurp()?;
        self.expect_end_of_line()?;
        Ok(Alias {
            keyword,
            name,
            equal,
            value,
        })
    }

    /// Parses `apply <name> [args…]`.
    fn parse_apply(&mut self) -> Production<Apply> {
        let keyword = self.next();
        let name = self.expect(&[TokenKind::Identifier], "name after 'apply'")?;
        let args = if self.line_has_next() {
            Some(self.slurp()?)
        } else {
            None
        };
        self.expect_end_of_line()?;
        Ok(Apply {
            keyword,
            name,
            args,
        })
    }

    /// Parses `end [apply] <name>`.
    fn parse_end(&mut self) -> Production<End> {
        let keyword = self.next();
        let apply = if self.peek_kind() == TokenKind::Identifier
            && self.peek().inner_text() == "apply"
        {
            Some(self.expect_identifier("apply")?)
        } else {
            None
        };
        let name = self.expect(&[TokenKind::Identifier], "block name")?;
        self.expect_end_of_line()?;
        Ok(End {
            keyword,
            apply,
            name,
        })
    }

    /// Parses a `comment …` / `test …` block. The body runs until the
    /// first lexical `end <name>` identifier run — which may sit mid-line.
    /// The newline that terminated the opening line contributes its
    /// trailing whitespace to the body, so indentation survives.
    fn parse_comment_block(&mut self) -> Production<CommentDirective> {
        let name = self.next();
        let eol = self.expect_end_of_line()?;

        let terminator: EcoString = name.inner_text().into();
        let (body_group, mut run) = self.until_sequence(&["end", terminator.as_str()])?;

        let (Some(end_name), Some(end_keyword)) = (run.pop(), run.pop()) else {
            unreachable!("terminator run holds one token per word")
        };

        let mut body = EcoString::new();
        if let Some(newline) = &eol {
            body.push_str(newline.trailing_ws());
        }
        if let Some(group) = &body_group {
            body.push_str(&group.outer_text());
        }

        Ok(CommentDirective {
            name,
            body,
            end_keyword,
            end_name,
        })
    }

    /// Parses a standard directive: name, optional argument to the line
    /// end, then indented `key [value]` sub-directives.
    fn parse_standard_directive(&mut self) -> Production<Directive> {
        let name = self.next();
        let argument = if self.line_has_next() {
            Some(self.slurp()?)
        } else {
            None
        };
        self.expect_end_of_line()?;

        let sub_directives = self.while_indented(|parser| {
            let key = parser.expect(&[TokenKind::Identifier], "sub-directive key")?;
            let value = if parser.line_has_next() {
                Some(parser.slurp()?)
            } else {
                None
            };
            Ok(SubDirective { key, value })
        })?;

        Ok(Directive {
            name,
            argument,
            sub_directives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::parser::parse;
    use crate::source_analysis::{DiagnosticKind, Span};

    fn single_item(source: &str) -> Item {
        let result = parse(source);
        assert!(
            result.diagnostics.is_empty(),
            "unexpected diagnostics for {source:?}: {:?}",
            result.diagnostics
        );
        assert_eq!(result.file.items.len(), 1, "expected one item in {source:?}");
        result.file.items.into_iter().next().unwrap()
    }

    fn single_transaction(source: &str) -> Transaction {
        match single_item(source) {
            Item::Transaction(txn) => txn,
            other => panic!("expected transaction, got {other:?}"),
        }
    }

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    #[test]
    fn simple_transaction() {
        let source = "2024-06-12 Grocery Store\n  Expenses:Food  $50.23\n  Assets:Checking\n";
        let result = parse(source);
        assert!(result.diagnostics.is_empty());

        let Item::Transaction(txn) = &result.file.items[0] else {
            panic!("expected transaction");
        };
        assert_eq!(txn.date.text(), "2024-06-12");
        assert_eq!(txn.payee.as_ref().unwrap().name(), "Grocery Store");
        assert_eq!(txn.postings.len(), 2);

        let first = &txn.postings[0];
        assert_eq!(first.account.name(), "Expenses:Food");
        let amount = first.amount.as_ref().unwrap();
        assert_eq!(amount.number_text(), "50.23");
        assert_eq!(amount.commodity_text().as_deref(), Some("$"));
        assert!(amount.pre_commodity.is_some());
        assert!(amount.post_commodity.is_none());

        let second = &txn.postings[1];
        assert_eq!(second.account.name(), "Assets:Checking");
        assert!(second.amount.is_none());

        assert!(result.accounts.contains("Expenses:Food"));
        assert!(result.accounts.contains("Assets:Checking"));
        assert!(result.payees.contains("Grocery Store"));
    }

    #[test]
    fn both_flags_are_rejected() {
        let result = parse("2024-06-12 *! Test Payee\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedToken),
            "expected an UnexpectedToken diagnostic, got {:?}",
            result.diagnostics
        );
    }

    #[test]
    fn flags_in_either_order_are_rejected() {
        for source in ["2024-06-12 !* P\n", "2024-06-12 * ! P\n"] {
            let result = parse(source);
            assert!(!result.diagnostics.is_empty(), "no diagnostic for {source:?}");
        }
    }

    #[test]
    fn single_flags_are_accepted() {
        let cleared = single_transaction("2024-06-12 * Payee\n");
        assert!(cleared.is_cleared());
        assert!(!cleared.is_pending());

        let pending = single_transaction("2024-06-12 ! Payee\n");
        assert!(pending.is_pending());
        assert!(!pending.is_cleared());
    }

    #[test]
    fn aux_date_after_equal() {
        let txn = single_transaction("2024-06-12=2024-06-14 Payee\n");
        let aux = txn.aux_date.as_ref().unwrap();
        assert_eq!(aux.date.text(), "2024-06-14");
        assert_eq!(txn.date.text(), "2024-06-12");
    }

    #[test]
    fn transaction_code_in_parentheses() {
        let txn = single_transaction("2024-06-12 * (INV-42) Cafe\n");
        assert_eq!(txn.code.as_ref().unwrap().text(), "INV-42");
        assert_eq!(txn.payee.as_ref().unwrap().name(), "Cafe");
    }

    #[test]
    fn empty_code_is_an_error() {
        let result = parse("2024-06-12 () Cafe\n");
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn payee_spans_hard_space_runs() {
        let txn = single_transaction("2024-06-12 Alpha  Beta\n");
        assert_eq!(txn.payee.as_ref().unwrap().name(), "Alpha  Beta");
    }

    #[test]
    fn header_comment_attaches_to_transaction() {
        let txn = single_transaction("2024-06-12 Payee ; note :tag:\n");
        assert_eq!(txn.comments.len(), 1);
        assert_eq!(txn.comments[0].comment_char, ';');
        assert_eq!(txn.comments[0].body, " note :tag:");
        assert!(txn.comments[0].tags.is_empty());
    }

    #[test]
    fn transaction_without_payee() {
        let txn = single_transaction("2024-06-12\n  A:B  $1\n  A:C\n");
        assert!(txn.payee.is_none());
        assert_eq!(txn.postings.len(), 2);
    }

    #[test]
    fn indented_comment_attaches_to_previous_posting() {
        let source = "2024-06-12 P\n  A:B  $1\n  ; about A:B\n  A:C\n";
        let txn = single_transaction(source);
        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].comments.len(), 1);
        assert_eq!(txn.postings[0].comments[0].body, " about A:B");
        assert!(txn.postings[1].comments.is_empty());
    }

    #[test]
    fn indented_comment_before_postings_attaches_to_transaction() {
        let source = "2024-06-12 P\n  ; header note\n  A:B  $1\n";
        let txn = single_transaction(source);
        assert_eq!(txn.comments.len(), 1);
        assert_eq!(txn.postings.len(), 1);
    }

    #[test]
    fn indented_blank_line_inside_transaction_is_an_error() {
        // The indent makes the blank line a continuation, and a
        // continuation that is not a comment must be a posting.
        let source = "2024-06-12 P\n  A:B  $1\n  \n2024-06-14 Q\n";
        let result = parse(source);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::InvalidAccount);
        // The transaction that follows the blank line still parses.
        assert_eq!(result.file.items.len(), 1);
    }

    #[test]
    fn posting_trailing_comment() {
        let source = "2024-06-12 P\n  A:B  $1 ; same line\n";
        let txn = single_transaction(source);
        assert_eq!(txn.postings[0].comments.len(), 1);
        assert_eq!(txn.postings[0].comments[0].body, " same line");
    }

    // ------------------------------------------------------------------
    // Dates
    // ------------------------------------------------------------------

    #[test]
    fn two_component_date() {
        let txn = single_transaction("2024/06 Payee\n");
        assert_eq!(txn.date.text(), "2024/06");
        assert_eq!(txn.date.raw.len(), 3);
    }

    #[test]
    fn mismatched_date_separators_are_invalid() {
        let result = parse("2024-06/12 Payee\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::InvalidDate),
            "expected InvalidDate, got {:?}",
            result.diagnostics
        );
    }

    #[test]
    fn non_integer_date_component_is_invalid() {
        let result = parse("2024.5-06-12 Payee\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::InvalidInteger),
            "expected InvalidInteger, got {:?}",
            result.diagnostics
        );
    }

    // ------------------------------------------------------------------
    // Amounts
    // ------------------------------------------------------------------

    #[test]
    fn post_commodity_amount() {
        let txn = single_transaction("2024-06-12 P\n  A:B  5 USD\n");
        let amount = txn.postings[0].amount.as_ref().unwrap();
        assert_eq!(amount.number_text(), "5");
        assert_eq!(amount.commodity_text().as_deref(), Some("USD"));
        assert!(amount.post_commodity.is_some());
    }

    #[test]
    fn negative_amount_with_pre_commodity() {
        let txn = single_transaction("2024-06-12 P\n  A:B  $-5\n");
        let amount = txn.postings[0].amount.as_ref().unwrap();
        assert!(amount.is_negative());
        assert_eq!(amount.commodity_text().as_deref(), Some("$"));
    }

    #[test]
    fn minus_before_pre_commodity() {
        let txn = single_transaction("2024-06-12 P\n  A:B  -$5\n");
        let amount = txn.postings[0].amount.as_ref().unwrap();
        assert!(amount.is_negative());
        assert_eq!(amount.commodity_text().as_deref(), Some("$"));
        assert_eq!(amount.number_text(), "5");
    }

    #[test]
    fn bare_negative_amount() {
        let txn = single_transaction("2024-06-12 P\n  A:B  -1,5\n");
        let amount = txn.postings[0].amount.as_ref().unwrap();
        assert!(amount.is_negative());
        assert_eq!(amount.number_text(), "1,5");
        assert_eq!(amount.commodity_text(), None);
    }

    #[test]
    fn soft_space_keeps_the_rest_in_the_account() {
        // A single space is not a delimiter: the whole line is the
        // account name and there is no amount.
        let result = parse("2024-06-12 P\n  A:B $5\n");
        assert!(result.diagnostics.is_empty());
        let Item::Transaction(txn) = &result.file.items[0] else {
            panic!("expected transaction");
        };
        let posting = &txn.postings[0];
        assert_eq!(posting.account.name(), "A:B $5");
        assert!(posting.amount.is_none());
    }

    #[test]
    fn amount_missing_number_is_reported() {
        let result = parse("2024-06-12 P\n  A:B  $\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedToken),
            "got {:?}",
            result.diagnostics
        );
    }

    // ------------------------------------------------------------------
    // Virtual accounts
    // ------------------------------------------------------------------

    #[test]
    fn bracketed_virtual_posting() {
        let source = "2024-06-12 X\n  [Assets:V]  $1\n";
        let result = parse(source);
        assert!(result.diagnostics.is_empty());
        let Item::Transaction(txn) = &result.file.items[0] else {
            panic!("expected transaction");
        };
        let posting = &txn.postings[0];
        match &posting.account {
            AccountRef::Surrounded {
                open,
                close,
                virtual_kind,
                ..
            } => {
                assert_eq!(open.kind(), TokenKind::LeftBracket);
                assert_eq!(close.kind(), TokenKind::RightBracket);
                assert_eq!(*virtual_kind, VirtualKind::BalancedVirtual);
            }
            AccountRef::Bare { .. } => panic!("expected surrounded account"),
        }
        assert_eq!(posting.account.name(), "Assets:V");
        let amount = posting.amount.as_ref().unwrap();
        assert_eq!(amount.number_text(), "1");
        assert_eq!(amount.commodity_text().as_deref(), Some("$"));
        assert!(result.accounts.contains("Assets:V"));
    }

    #[test]
    fn parenthesized_virtual_posting() {
        let txn = single_transaction("2024-06-12 X\n  (Equity:Budget)\n");
        assert_eq!(
            txn.postings[0].account.virtual_kind(),
            Some(VirtualKind::Virtual)
        );
    }

    #[test]
    fn unclosed_virtual_account_is_reported() {
        let result = parse("2024-06-12 X\n  [Assets:V  $1\n");
        assert!(!result.diagnostics.is_empty());
    }

    // ------------------------------------------------------------------
    // Directives
    // ------------------------------------------------------------------

    #[test]
    fn alias_with_equal_inside_value() {
        let Item::Alias(alias) = single_item("alias Foo=Bar=Baz\n") else {
            panic!("expected alias");
        };
        assert_eq!(alias.name.inner_text(), "Foo");
        assert_eq!(alias.value.inner_text(), "Bar=Baz");
    }

    #[test]
    fn alias_errors() {
        let empty_lhs = parse("alias =Bar\n");
        assert!(
            empty_lhs
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedToken)
        );

        let bare = parse("alias\n");
        assert!(
            bare.diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedEof)
        );

        let empty_rhs = parse("alias Foo=\n");
        assert!(
            empty_rhs
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::UnexpectedEof)
        );
    }

    #[test]
    fn apply_directive() {
        let Item::Apply(apply) = single_item("apply account Projects:X\n") else {
            panic!("expected apply");
        };
        assert_eq!(apply.name.inner_text(), "account");
        assert_eq!(apply.args.as_ref().unwrap().inner_text(), "Projects:X");
    }

    #[test]
    fn end_apply_directive() {
        let Item::End(end) = single_item("end apply account\n") else {
            panic!("expected end");
        };
        assert!(end.apply.is_some());
        assert_eq!(end.name.inner_text(), "account");
    }

    #[test]
    fn end_without_apply() {
        let Item::End(end) = single_item("end tag\n") else {
            panic!("expected end");
        };
        assert!(end.apply.is_none());
        assert_eq!(end.name.inner_text(), "tag");
    }

    #[test]
    fn standard_directive_with_sub_directives() {
        let source = "account Expenses:Food\n  note groceries, dining\n  payee ^(?i)market\n";
        let Item::Directive(directive) = single_item(source) else {
            panic!("expected directive");
        };
        assert_eq!(directive.name.inner_text(), "account");
        assert_eq!(
            directive.argument.as_ref().unwrap().inner_text(),
            "Expenses:Food"
        );
        assert_eq!(directive.sub_directives.len(), 2);
        assert_eq!(directive.sub_directives[0].key.inner_text(), "note");
        assert_eq!(
            directive.sub_directives[0].value.as_ref().unwrap().inner_text(),
            "groceries, dining"
        );
        assert_eq!(directive.sub_directives[1].key.inner_text(), "payee");
    }

    #[test]
    fn directive_without_argument() {
        let Item::Directive(directive) = single_item("python\n") else {
            panic!("expected directive");
        };
        assert!(directive.argument.is_none());
        assert!(directive.sub_directives.is_empty());
    }

    // ------------------------------------------------------------------
    // Comment blocks
    // ------------------------------------------------------------------

    #[test]
    fn comment_block_directive() {
        let source = "comment\n  anything $ ~ 1/2 goes\nend comment\n";
        let Item::CommentDirective(block) = single_item(source) else {
            panic!("expected comment block");
        };
        assert_eq!(block.name.inner_text(), "comment");
        assert_eq!(block.end_name.inner_text(), "comment");
        assert_eq!(block.body, "  anything $ ~ 1/2 goes\n");
    }

    #[test]
    fn test_block_directive() {
        let source = "test\n  assert something\nend test\n";
        let Item::CommentDirective(block) = single_item(source) else {
            panic!("expected test block");
        };
        assert_eq!(block.name.inner_text(), "test");
        assert_eq!(block.end_name.inner_text(), "test");
        assert_eq!(block.body, "  assert something\n");
    }

    #[test]
    fn comment_block_with_text_on_opening_line_is_an_error() {
        // The opening line must end after the directive name.
        let result = parse("test balance\nend test\n");
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn comment_block_terminates_at_first_lexical_run() {
        // The inline `end comment` terminates the block; the rest of the
        // line parses as ordinary items.
        let source = "comment\n  text end comment inline\nend comment\n";
        let result = parse(source);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let Item::CommentDirective(block) = &result.file.items[0] else {
            panic!("expected comment block");
        };
        assert_eq!(block.body, "  text ");
        assert_eq!(block.end_name.inner_text(), "comment");
    }

    #[test]
    fn unterminated_comment_block() {
        let source = "account Before\ncomment\nnever closed\n";
        let result = parse(source);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::UnexpectedEof);
        // The preceding child still parses.
        assert_eq!(result.file.items.len(), 1);
    }

    #[test]
    fn comment_block_with_empty_body() {
        let Item::CommentDirective(block) = single_item("comment\nend comment\n") else {
            panic!("expected comment block");
        };
        assert_eq!(block.body, "");
    }

    // ------------------------------------------------------------------
    // Standalone comments
    // ------------------------------------------------------------------

    #[test]
    fn standalone_comment_lines() {
        let source = "; semicolon\n# hash\n% percent\n| pipe\n* star\n";
        let result = parse(source);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.file.items.len(), 5);
        let chars: Vec<char> = result
            .file
            .items
            .iter()
            .map(|item| match item {
                Item::Comment(c) => c.comment_char,
                other => panic!("expected comment, got {other:?}"),
            })
            .collect();
        assert_eq!(chars, vec![';', '#', '%', '|', '*']);
    }

    // ------------------------------------------------------------------
    // Symbol tables
    // ------------------------------------------------------------------

    #[test]
    fn first_declaration_span_is_kept() {
        let source = "2024-06-12 P\n  A:B  $1\n2024-06-13 P\n  A:B  $2\n";
        let result = parse(source);
        assert!(result.diagnostics.is_empty());
        let span = result.accounts.get("A:B").unwrap();
        let Item::Transaction(first) = &result.file.items[0] else {
            panic!("expected transaction");
        };
        assert_eq!(span, first.postings[0].account.span());
    }

    #[test]
    fn payee_registration_uses_inner_text() {
        let result = parse("2024-06-12 Corner Shop\n");
        assert!(result.diagnostics.is_empty());
        assert_eq!(
            result.payees.get("Corner Shop"),
            Some(Span::new(11, 22))
        );
    }
}
