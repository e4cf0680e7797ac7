// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Tally command-line interface.
//!
//! This is the main entry point for the `tally` command: a validator and
//! converter for ledger-style journal files.

use clap::{Parser, Subcommand};
use miette::Result;

mod commands;
mod diagnostic;

/// Tally: a validator and converter for plain-text journals
#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check journal files for syntax errors
    Check {
        /// Journal files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<String>,
    },

    /// Print journal files back out, byte-for-byte
    Print {
        /// Journal files or directories to print
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Verify the round-trip instead of printing; show a diff and
        /// exit non-zero on any mismatch
        #[arg(long)]
        check: bool,
    },

    /// List every account declared in the given journals
    Accounts {
        /// Journal files or directories to read
        #[arg(default_value = ".")]
        paths: Vec<String>,
    },

    /// List every payee declared in the given journals
    Payees {
        /// Journal files or directories to read
        #[arg(default_value = ".")]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing only if RUST_LOG is explicitly set, to keep
    // stdout/stderr clean for piped use.
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .try_init();
    }

    // Install miette's fancy error handler.
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { paths } => commands::check::run(&paths),
        Command::Print { paths, check } => commands::print::run(&paths, check),
        Command::Accounts { paths } => commands::symbols::run_accounts(&paths),
        Command::Payees { paths } => commands::symbols::run_payees(&paths),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
