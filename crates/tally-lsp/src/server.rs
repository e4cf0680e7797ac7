// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! LSP server implementation.
//!
//! Delegates all IDE operations to [`JournalIndex`] and maps between LSP
//! protocol types and tally language service types. Character offsets are
//! treated as bytes on both sides; journal files are overwhelmingly ASCII
//! and the parser's spans are byte-based.

use std::sync::Mutex;

use camino::Utf8PathBuf;
use tally_core::language_service::{
    ByteOffset, CompletionKind, DocumentSymbolKind, JournalIndex, Position as CorePosition,
};
use tally_core::source_analysis::{ParseDiagnostic, Span};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionOptions, CompletionParams, CompletionResponse,
    Diagnostic, DiagnosticSeverity, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DocumentSymbolParams, DocumentSymbolResponse, GotoDefinitionParams,
    GotoDefinitionResponse, InitializeParams, InitializeResult, InitializedParams, Location,
    MessageType, NumberOrString, OneOf, Position, Range, ServerCapabilities, ServerInfo,
    SymbolInformation, SymbolKind, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::{Client, LanguageServer};
use tracing::debug;

/// LSP backend wrapping [`JournalIndex`].
pub struct Backend {
    client: Client,
    index: Mutex<JournalIndex>,
}

impl Backend {
    /// Creates a new backend for the given client handle.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            index: Mutex::new(JournalIndex::new()),
        }
    }

    /// Converts an LSP URI to the index's file key.
    fn file_key(uri: &Url) -> Utf8PathBuf {
        uri.to_file_path()
            .ok()
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .unwrap_or_else(|| Utf8PathBuf::from(uri.path()))
    }

    /// Replaces a document's content and publishes its diagnostics.
    async fn update_document(&self, uri: Url, content: String) {
        let key = Self::file_key(&uri);
        let diagnostics = {
            let mut index = self.index.lock().expect("index lock");
            index.update_file(key.clone(), content);
            let source = index.source(&key).unwrap_or_default().to_string();
            index
                .diagnostics(&key)
                .iter()
                .map(|d| to_lsp_diagnostic(d, &source))
                .collect::<Vec<_>>()
        };
        debug!(file = %key, count = diagnostics.len(), "publishing diagnostics");
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

/// Converts a byte span to an LSP range against `source`.
fn span_to_range(source: &str, span: Span) -> Range {
    let start = CorePosition::from_byte_offset(source, ByteOffset::new(span.start))
        .unwrap_or(CorePosition::new(0, 0));
    let end = CorePosition::from_byte_offset(source, ByteOffset::new(span.end))
        .unwrap_or(CorePosition::new(0, 0));
    Range::new(
        Position::new(start.line, start.column),
        Position::new(end.line, end.column),
    )
}

/// Converts a core diagnostic to an LSP diagnostic.
fn to_lsp_diagnostic(diagnostic: &ParseDiagnostic, source: &str) -> Diagnostic {
    Diagnostic {
        range: span_to_range(source, diagnostic.span),
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String(diagnostic.kind.to_string())),
        source: Some("tally".to_string()),
        message: diagnostic.message.to_string(),
        ..Diagnostic::default()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions::default()),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "tally-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "tally language server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.update_document(params.text_document.uri, params.text_document.text)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last content change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().next_back() {
            self.update_document(params.text_document.uri, change.text)
                .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let key = Self::file_key(&params.text_document.uri);
        self.index.lock().expect("index lock").remove_file(&key);
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let key = Self::file_key(&params.text_document_position.text_document.uri);
        let index = self.index.lock().expect("index lock");
        let items: Vec<CompletionItem> = index
            .completions(&key)
            .into_iter()
            .map(|completion| CompletionItem {
                label: completion.label.to_string(),
                kind: Some(match completion.kind {
                    CompletionKind::Account => CompletionItemKind::VALUE,
                    CompletionKind::Payee => CompletionItemKind::TEXT,
                }),
                ..CompletionItem::default()
            })
            .collect();
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(CompletionResponse::Array(items)))
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let key = Self::file_key(&uri);
        let position = params.text_document_position_params.position;
        let index = self.index.lock().expect("index lock");

        let Some(location) =
            index.definition(&key, CorePosition::new(position.line, position.character))
        else {
            return Ok(None);
        };
        let Some(source) = index.source(&key) else {
            return Ok(None);
        };
        Ok(Some(GotoDefinitionResponse::Scalar(Location {
            uri,
            range: span_to_range(source, location.span),
        })))
    }

    #[allow(deprecated)] // SymbolInformation::deprecated must be populated
    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let key = Self::file_key(&uri);
        let index = self.index.lock().expect("index lock");
        let Some(source) = index.source(&key) else {
            return Ok(None);
        };

        let symbols: Vec<SymbolInformation> = index
            .document_symbols(&key)
            .into_iter()
            .map(|symbol| SymbolInformation {
                name: symbol.name.to_string(),
                kind: match symbol.kind {
                    DocumentSymbolKind::Account => SymbolKind::VARIABLE,
                    DocumentSymbolKind::Payee => SymbolKind::STRING,
                },
                tags: None,
                deprecated: None,
                location: Location {
                    uri: uri.clone(),
                    range: span_to_range(source, symbol.span),
                },
                container_name: None,
            })
            .collect();

        if symbols.is_empty() {
            Ok(None)
        } else {
            Ok(Some(DocumentSymbolResponse::Flat(symbols)))
        }
    }
}
