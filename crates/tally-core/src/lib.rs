// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tally core: a fault-tolerant, loss-less parser for ledger-style
//! plain-text journals.
//!
//! Given source text, [`source_analysis::parse`] produces a concrete
//! syntax tree, a diagnostic list, and symbol tables of declared accounts
//! and payees. Two properties shape the whole design:
//!
//! - **Loss-less**: every byte of input is preserved — whitespace rides on
//!   the adjacent tokens — so spans are exact and
//!   [`unparse::render_file`] recovers the buffer byte-for-byte.
//! - **Fault-tolerant**: parsing continues after errors with line-level
//!   resynchronization, so one pass reports every diagnostic and the tree
//!   still contains the items around each failure.
//!
//! The crate serves two consumers: the `tally` command-line
//! validator/converter and the `tally-lsp` editor language service (see
//! [`language_service`]).
//!
//! # Example
//!
//! ```
//! use tally_core::source_analysis::parse;
//!
//! let source = "2024-06-12 Grocery Store\n  Expenses:Food  $50.23\n  Assets:Checking\n";
//! let result = parse(source);
//!
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.file.items.len(), 1);
//! assert!(result.accounts.contains("Assets:Checking"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cst;
pub mod language_service;
pub mod source_analysis;
pub mod unparse;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::cst::{File, Item, Posting, Transaction};
    pub use crate::language_service::{JournalIndex, Position};
    pub use crate::source_analysis::{ParseDiagnostic, ParseResult, Span, parse};
    pub use crate::unparse::render_file;
}
