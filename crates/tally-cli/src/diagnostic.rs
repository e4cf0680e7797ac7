// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic rendering using miette.
//!
//! Converts tally-core parse diagnostics into miette-formatted reports
//! with source context, an arrow at the error span, and the file name.

use miette::{Diagnostic, SourceSpan};
use tally_core::source_analysis::ParseDiagnostic;

/// A parse diagnostic bundled with its source for rich terminal output.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(tally::parse))]
pub struct ReportedDiagnostic {
    /// Human-readable error message.
    pub message: String,
    /// Source code for context.
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the error.
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label shown at the error span.
    pub label: String,
}

impl ReportedDiagnostic {
    /// Bundles a core diagnostic with the file it came from.
    pub fn from_parse_diagnostic(
        diagnostic: &ParseDiagnostic,
        source_path: &str,
        source: &str,
    ) -> Self {
        Self {
            message: diagnostic.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label: diagnostic.kind.to_string(),
        }
    }
}
