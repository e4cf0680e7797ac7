// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `tally accounts` / `tally payees` — list declared symbols.
//!
//! Parses every given journal and prints the union of declared names,
//! sorted, one per line. Files with syntax errors still contribute the
//! symbols from their parseable lines.

use miette::Result;
use tally_core::source_analysis::{SymbolTable, parse};

use crate::commands::{collect_journal_files, read_journal};

/// Lists declared accounts.
pub fn run_accounts(paths: &[String]) -> Result<()> {
    for name in collect_symbols(paths, |table| table.0)? {
        println!("{name}");
    }
    Ok(())
}

/// Lists declared payees.
pub fn run_payees(paths: &[String]) -> Result<()> {
    for name in collect_symbols(paths, |table| table.1)? {
        println!("{name}");
    }
    Ok(())
}

/// Parses every file and merges the chosen symbol table; returns sorted
/// names.
fn collect_symbols(
    paths: &[String],
    pick: impl Fn((SymbolTable, SymbolTable)) -> SymbolTable,
) -> Result<Vec<String>> {
    let files = collect_journal_files(paths)?;

    let mut merged = SymbolTable::new();
    for file in &files {
        let source = read_journal(file)?;
        let result = parse(&source);
        let table = pick((result.accounts, result.payees));
        for (name, span) in table.iter() {
            merged.add(name.clone(), span);
        }
    }

    Ok(merged
        .sorted_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect())
}
