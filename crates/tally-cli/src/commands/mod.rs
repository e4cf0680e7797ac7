// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod check;
pub mod print;
pub mod symbols;

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, Result};

/// File extensions treated as journals.
const JOURNAL_EXTENSIONS: &[&str] = &["journal", "ledger"];

/// Expands the given paths into a deduplicated list of journal files.
///
/// Files are taken as-is (and must have a journal extension); directories
/// are walked recursively.
pub fn collect_journal_files(paths: &[String]) -> Result<Vec<Utf8PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for path in paths {
        let path = Utf8PathBuf::from(path);
        if path.is_file() {
            if !has_journal_extension(&path) {
                miette::bail!("'{path}' is not a journal file (.journal or .ledger)");
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        } else if path.is_dir() {
            collect_from_dir(&path, &mut seen, &mut files)?;
        } else {
            miette::bail!("path '{path}' does not exist");
        }
    }

    if files.is_empty() {
        miette::bail!("no journal files found");
    }
    files.sort();
    Ok(files)
}

fn has_journal_extension(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| JOURNAL_EXTENSIONS.contains(&ext))
}

fn collect_from_dir(
    dir: &Utf8Path,
    seen: &mut HashSet<Utf8PathBuf>,
    files: &mut Vec<Utf8PathBuf>,
) -> Result<()> {
    let entries = dir.read_dir_utf8().into_diagnostic()?;
    for entry in entries {
        let entry = entry.into_diagnostic()?;
        let path = entry.path().to_owned();
        if path.is_dir() {
            collect_from_dir(&path, seen, files)?;
        } else if has_journal_extension(&path) && seen.insert(path.clone()) {
            files.push(path);
        }
    }
    Ok(())
}

/// Reads a journal file to a string.
pub fn read_journal(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path.as_std_path())
        .map_err(|e| miette::miette!("failed to read '{path}': {e}"))
}
