// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Value objects for the language service.
//!
//! Immutable types defined by their attributes:
//!
//! - **`ByteOffset`** — a position in source text as a byte offset
//! - **`Position`** — a line/column position in source text
//! - **`Location`** — a file path and span combination
//! - **`DocumentSymbol`** — an outline entry (account or payee)
//! - **`Completion`** — a completion suggestion

use camino::Utf8PathBuf;
use ecow::EcoString;

use crate::source_analysis::Span;

/// A byte offset in a source file (0-indexed).
///
/// A newtype so offsets and line/column positions can't be mixed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteOffset(pub u32);

impl ByteOffset {
    /// Creates a new byte offset.
    #[must_use]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    /// Returns the raw byte offset value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// A position in a source file (line and column, both 0-indexed).
///
/// The `column` field is a **byte offset within the line**, not a
/// character count; callers must keep it on a UTF-8 character boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Line number (0-indexed).
    pub line: u32,
    /// Column in bytes from the start of the line (0-indexed).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Converts a byte offset to a position in `source`.
    ///
    /// Returns `None` if the offset is out of bounds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "line and column offsets fit in u32"
    )]
    pub fn from_byte_offset(source: &str, offset: ByteOffset) -> Option<Self> {
        let target = offset.get() as usize;
        if target > source.len() {
            return None;
        }

        let mut line = 0u32;
        let mut line_start = 0usize;
        for (i, ch) in source.char_indices() {
            if i >= target {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = i + 1;
            }
        }
        Some(Self::new(line, (target - line_start) as u32))
    }

    /// Converts this position to a byte offset in `source`.
    ///
    /// Returns `None` if the position is out of bounds.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "line and column offsets fit in u32"
    )]
    pub fn to_byte_offset(self, source: &str) -> Option<ByteOffset> {
        let mut line = 0u32;
        let mut line_start = 0usize;
        if self.line > 0 {
            let mut found = false;
            for (i, ch) in source.char_indices() {
                if ch == '\n' {
                    line += 1;
                    line_start = i + 1;
                    if line == self.line {
                        found = true;
                        break;
                    }
                }
            }
            if !found {
                return None;
            }
        }

        let line_end = source[line_start..]
            .find('\n')
            .map_or(source.len(), |i| line_start + i);
        let offset = line_start + self.column as usize;
        if offset > line_end {
            return None;
        }
        Some(ByteOffset::new(offset as u32))
    }
}

/// A location in a source file (file path and span).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// The file path.
    pub file: Utf8PathBuf,
    /// The source span.
    pub span: Span,
}

impl Location {
    /// Creates a new location.
    #[must_use]
    pub fn new(file: Utf8PathBuf, span: Span) -> Self {
        Self { file, span }
    }
}

/// The kind of a document symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSymbolKind {
    /// A declared account name.
    Account,
    /// A declared payee name.
    Payee,
}

/// An outline entry: a symbol and where it was first declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSymbol {
    /// The symbol name.
    pub name: EcoString,
    /// Whether this is an account or a payee.
    pub kind: DocumentSymbolKind,
    /// The span of the first declaration.
    pub span: Span,
}

/// The kind of a completion item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    /// A declared account name.
    Account,
    /// A declared payee name.
    Payee,
}

/// A completion suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The text to insert.
    pub label: EcoString,
    /// The kind of completion.
    pub kind: CompletionKind,
}
