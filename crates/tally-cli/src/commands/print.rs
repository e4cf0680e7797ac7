// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `tally print` — render parsed journals back out.
//!
//! Rendering walks the retained token stream and emits each token's outer
//! text, so output is byte-for-byte identical to the input. `--check`
//! verifies that guarantee per file instead of printing, showing a unified
//! diff for any mismatch (a mismatch indicates a parser defect, not a
//! problem with the file).

use miette::Result;
use similar::TextDiff;
use tally_core::source_analysis::parse;
use tally_core::unparse::render_file;

use crate::commands::{collect_journal_files, read_journal};

/// Prints (or verifies) the given paths.
pub fn run(paths: &[String], check_only: bool) -> Result<()> {
    let files = collect_journal_files(paths)?;

    let mut mismatched = 0usize;
    for file in &files {
        let source = read_journal(file)?;
        let result = parse(&source);
        let rendered = render_file(&result.file);

        if check_only {
            if rendered != source {
                mismatched += 1;
                print_unified_diff(file.as_str(), &source, &rendered);
            }
        } else {
            print!("{rendered}");
        }
    }

    if mismatched > 0 {
        let plural = if mismatched == 1 { "" } else { "s" };
        miette::bail!("{mismatched} file{plural} did not round-trip");
    }
    Ok(())
}

/// Prints a unified diff between `original` and `rendered` to stdout.
fn print_unified_diff(path: &str, original: &str, rendered: &str) {
    let diff = TextDiff::from_lines(original, rendered);
    print!(
        "{}",
        diff.unified_diff()
            .header(&format!("a/{path}"), &format!("b/{path}"))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn write_temp_journal(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("test.journal");
        std::fs::write(&path, content).expect("write temp file");
        let utf8_path = Utf8PathBuf::from_path_buf(path).expect("utf8 path");
        (dir, utf8_path)
    }

    #[test]
    fn round_trip_check_passes_for_valid_files() {
        let source = "2024-06-12 * (7) Shop\n  [A:B]  -1,5 EUR ; n\n";
        let (_dir, path) = write_temp_journal(source);
        assert!(run(&[path.to_string()], true).is_ok());
    }

    #[test]
    fn round_trip_check_passes_even_with_parse_errors() {
        // Recovery never drops bytes, so broken files still round-trip.
        let source = "2024-06-12 *! broken\nalias\n";
        let (_dir, path) = write_temp_journal(source);
        assert!(run(&[path.to_string()], true).is_ok());
    }

    #[test]
    fn round_trip_check_handles_missing_final_newline() {
        let (_dir, path) = write_temp_journal("account A");
        assert!(run(&[path.to_string()], true).is_ok());
    }
}
