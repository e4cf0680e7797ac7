// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Language service API for IDE integration.
//!
//! The parser is the language service: it already produces exact spans,
//! per-pass diagnostics, and the account/payee symbol tables, so the query
//! layer here is a thin cache on top of [`parse`].
//!
//! On every edit the consumer replaces the file's content with
//! [`JournalIndex::update_file`], which reparses the buffer — the parser
//! targets single-file interactive reparses, not incrementality.
//!
//! # Usage
//!
//! ```
//! use tally_core::language_service::JournalIndex;
//! use camino::Utf8PathBuf;
//!
//! let mut index = JournalIndex::new();
//! let file = Utf8PathBuf::from("main.journal");
//! index.update_file(file.clone(), "2024-06-12 Cafe\n  Expenses:Coffee  $4\n".to_string());
//!
//! assert!(index.diagnostics(&file).is_empty());
//! assert_eq!(index.document_symbols(&file).len(), 2); // one account, one payee
//! ```

mod value_objects;

pub use value_objects::{
    ByteOffset, Completion, CompletionKind, DocumentSymbol, DocumentSymbolKind, Location, Position,
};

use std::collections::HashMap;

use camino::Utf8PathBuf;

use crate::cst::{Item, Transaction};
use crate::source_analysis::{ParseDiagnostic, ParseResult, Span, parse};

/// A cache of parsed journal files, queried by the editor integration.
#[derive(Debug, Clone, Default)]
pub struct JournalIndex {
    files: HashMap<Utf8PathBuf, FileData>,
}

#[derive(Debug, Clone)]
struct FileData {
    /// The source text as of the last update.
    source: String,
    /// The parse of that text.
    result: ParseResult,
}

impl JournalIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the content of `file` and reparses it.
    pub fn update_file(&mut self, file: Utf8PathBuf, content: String) {
        let result = parse(&content);
        self.files.insert(
            file,
            FileData {
                source: content,
                result,
            },
        );
    }

    /// Removes `file` from the index.
    pub fn remove_file(&mut self, file: &Utf8PathBuf) {
        self.files.remove(file);
    }

    /// Returns the cached source text for `file`, if known.
    #[must_use]
    pub fn source(&self, file: &Utf8PathBuf) -> Option<&str> {
        self.files.get(file).map(|data| data.source.as_str())
    }

    /// Returns the cached parse result for `file`, if known.
    #[must_use]
    pub fn result(&self, file: &Utf8PathBuf) -> Option<&ParseResult> {
        self.files.get(file).map(|data| &data.result)
    }

    /// Returns the diagnostics for `file` (empty for unknown files).
    #[must_use]
    pub fn diagnostics(&self, file: &Utf8PathBuf) -> &[ParseDiagnostic] {
        self.files
            .get(file)
            .map_or(&[], |data| data.result.diagnostics.as_slice())
    }

    /// Returns the outline for `file`: every declared account and payee at
    /// its first declaration, accounts first, each group sorted by name.
    #[must_use]
    pub fn document_symbols(&self, file: &Utf8PathBuf) -> Vec<DocumentSymbol> {
        let Some(data) = self.files.get(file) else {
            return Vec::new();
        };
        let mut symbols = Vec::new();
        for name in data.result.accounts.sorted_names() {
            let span = data
                .result
                .accounts
                .get(&name)
                .expect("sorted_names returns declared names");
            symbols.push(DocumentSymbol {
                name,
                kind: DocumentSymbolKind::Account,
                span,
            });
        }
        for name in data.result.payees.sorted_names() {
            let span = data
                .result
                .payees
                .get(&name)
                .expect("sorted_names returns declared names");
            symbols.push(DocumentSymbol {
                name,
                kind: DocumentSymbolKind::Payee,
                span,
            });
        }
        symbols
    }

    /// Returns completion candidates for `file`: all declared account and
    /// payee names.
    #[must_use]
    pub fn completions(&self, file: &Utf8PathBuf) -> Vec<Completion> {
        let Some(data) = self.files.get(file) else {
            return Vec::new();
        };
        let mut completions = Vec::new();
        for name in data.result.accounts.sorted_names() {
            completions.push(Completion {
                label: name,
                kind: CompletionKind::Account,
            });
        }
        for name in data.result.payees.sorted_names() {
            completions.push(Completion {
                label: name,
                kind: CompletionKind::Payee,
            });
        }
        completions
    }

    /// Returns the first-declaration location of the account or payee
    /// under `position`, if any.
    #[must_use]
    pub fn definition(&self, file: &Utf8PathBuf, position: Position) -> Option<Location> {
        let data = self.files.get(file)?;
        let offset = position.to_byte_offset(&data.source)?.get();

        for item in &data.result.file.items {
            let Item::Transaction(txn) = item else {
                continue;
            };
            if let Some(span) = Self::definition_in_transaction(txn, offset, &data.result) {
                return Some(Location::new(file.clone(), span));
            }
        }
        None
    }

    /// Looks for an account or payee occurrence covering `offset` inside
    /// one transaction, resolving it through the symbol tables.
    fn definition_in_transaction(
        txn: &Transaction,
        offset: u32,
        result: &ParseResult,
    ) -> Option<Span> {
        if let Some(payee) = &txn.payee {
            if payee.span().contains_offset(offset) {
                return result.payees.get(&payee.name());
            }
        }
        for posting in &txn.postings {
            let account = &posting.account;
            if account.span().contains_offset(offset) {
                return result.accounts.get(&account.name());
            }
        }
        None
    }
}
