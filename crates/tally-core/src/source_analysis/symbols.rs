// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Symbol tables for declared accounts and payees.
//!
//! The parser records the first occurrence of every account name and payee
//! it sees. Re-adding an existing name is a no-op, so each entry holds the
//! span of the *first* declaration — the target for go-to-definition.

use std::collections::HashMap;

use ecow::EcoString;

use super::Span;

/// A map from symbol name to the span of its first declaration.
///
/// # Examples
///
/// ```
/// use tally_core::source_analysis::{Span, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// table.add("Assets:Checking", Span::new(10, 25));
/// table.add("Assets:Checking", Span::new(40, 55)); // no-op
/// assert_eq!(table.get("Assets:Checking"), Some(Span::new(10, 25)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<EcoString, Span>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` at `span` unless the name is already present.
    /// The first writer wins.
    pub fn add(&mut self, name: impl Into<EcoString>, span: Span) {
        self.entries.entry(name.into()).or_insert(span);
    }

    /// Returns `true` if `name` has been declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the span of the first declaration of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Span> {
        self.entries.get(name).copied()
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no names have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, span)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&EcoString, Span)> {
        self.entries.iter().map(|(name, span)| (name, *span))
    }

    /// Returns all names, sorted. Useful for deterministic listings.
    #[must_use]
    pub fn sorted_names(&self) -> Vec<EcoString> {
        let mut names: Vec<EcoString> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writer_wins() {
        let mut table = SymbolTable::new();
        table.add("Groceries", Span::new(0, 9));
        table.add("Groceries", Span::new(100, 109));
        assert_eq!(table.get("Groceries"), Some(Span::new(0, 9)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_name() {
        let table = SymbolTable::new();
        assert!(!table.contains("Assets"));
        assert_eq!(table.get("Assets"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn sorted_names_are_deterministic() {
        let mut table = SymbolTable::new();
        table.add("Expenses:Food", Span::new(0, 1));
        table.add("Assets:Cash", Span::new(2, 3));
        let names = table.sorted_names();
        assert_eq!(names, vec!["Assets:Cash", "Expenses:Food"]);
    }
}
