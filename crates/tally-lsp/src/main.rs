// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tally Language Server Protocol server.
//!
//! Exposes the [`JournalIndex`](tally_core::language_service::JournalIndex)
//! from `tally-core` over LSP. The protocol runs on stdin/stdout, so all
//! logging goes to stderr.

/// LSP server backend implementation.
mod server;

use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

/// Sets up stderr logging for the server process.
///
/// Defaults to `tally_lsp=info`; `RUST_LOG` overrides. Output is plain
/// text — ANSI escapes would end up in editor log panes.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tally_lsp=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the tally language server.
#[tokio::main]
async fn main() {
    init_tracing();

    let (service, socket) = LspService::new(server::Backend::new);
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
