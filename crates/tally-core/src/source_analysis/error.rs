// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parse diagnostics.
//!
//! All recoverable parse failures are values of [`ParseDiagnostic`]: a kind
//! tag from a closed set, a human message, and a [`Span`]. The parser never
//! panics on bad input — productions return `Result` and the file loop
//! records the error and resynchronizes. Diagnostics integrate with
//! [`miette`] so consumers can render source context.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Span;

/// A parse error with location information.
///
/// Diagnostics are ordered by discovery, which is left-to-right source
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic()]
pub struct ParseDiagnostic {
    /// The kind of error.
    pub kind: DiagnosticKind,
    /// The human-readable message.
    pub message: EcoString,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl ParseDiagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// Creates an `UnexpectedToken` diagnostic.
    #[must_use]
    pub fn unexpected_token(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(DiagnosticKind::UnexpectedToken, message, span)
    }

    /// Creates an `UnexpectedEof` diagnostic.
    #[must_use]
    pub fn unexpected_eof(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(DiagnosticKind::UnexpectedEof, message, span)
    }

    /// Creates an `InvalidDate` diagnostic.
    #[must_use]
    pub fn invalid_date(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(DiagnosticKind::InvalidDate, message, span)
    }

    /// Creates an `InvalidAccount` diagnostic.
    #[must_use]
    pub fn invalid_account(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(DiagnosticKind::InvalidAccount, message, span)
    }

    /// Creates an `InvalidInteger` diagnostic.
    #[must_use]
    pub fn invalid_integer(message: impl Into<EcoString>, span: Span) -> Self {
        Self::new(DiagnosticKind::InvalidInteger, message, span)
    }

    /// Creates a `LeadingSpace` diagnostic.
    #[must_use]
    pub fn leading_space(span: Span) -> Self {
        Self::new(
            DiagnosticKind::LeadingSpace,
            "unexpected leading space at start of line",
            span,
        )
    }
}

/// The closed set of parse error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A token of an unexpected kind was encountered.
    UnexpectedToken,
    /// Input (or the current line) ended where more was required.
    UnexpectedEof,
    /// A date had mismatched separators.
    InvalidDate,
    /// An account reference was empty.
    InvalidAccount,
    /// A number was required to be a decimal integer but was not.
    InvalidInteger,
    /// A top-level line began with whitespace.
    LeadingSpace,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEof => "unexpected end of input",
            Self::InvalidDate => "invalid date",
            Self::InvalidAccount => "invalid account",
            Self::InvalidInteger => "invalid integer",
            Self::LeadingSpace => "unexpected leading space",
        };
        write!(f, "{label}")
    }
}
