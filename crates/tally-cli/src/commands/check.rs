// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `tally check` — parse journal files and report every diagnostic.
//!
//! The parser recovers at line boundaries, so a single pass prints all of
//! a file's problems, not just the first. Exits non-zero if any file had
//! diagnostics.

use miette::Result;
use tally_core::source_analysis::parse;
use tracing::debug;

use crate::commands::{collect_journal_files, read_journal};
use crate::diagnostic::ReportedDiagnostic;

/// Checks the given paths, printing diagnostics to stderr.
pub fn run(paths: &[String]) -> Result<()> {
    let files = collect_journal_files(paths)?;

    let mut total_errors = 0usize;
    let mut files_with_errors = 0usize;

    for file in &files {
        let source = read_journal(file)?;
        let result = parse(&source);
        debug!(
            file = %file,
            items = result.file.items.len(),
            diagnostics = result.diagnostics.len(),
            "checked"
        );

        if result.diagnostics.is_empty() {
            continue;
        }
        files_with_errors += 1;
        total_errors += result.diagnostics.len();
        for diagnostic in &result.diagnostics {
            let report = ReportedDiagnostic::from_parse_diagnostic(
                diagnostic,
                file.as_str(),
                &source,
            );
            eprintln!("{:?}", miette::Report::new(report));
        }
    }

    if total_errors > 0 {
        let file_plural = if files_with_errors == 1 { "" } else { "s" };
        let error_plural = if total_errors == 1 { "" } else { "s" };
        miette::bail!(
            "{total_errors} error{error_plural} in {files_with_errors} file{file_plural}"
        );
    }

    println!(
        "{} file{} ok",
        files.len(),
        if files.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
