// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::custodian::CustodianError;
use crate::gate::GateError;

/// Process exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_QUORUM: i32 = 2;
pub const EXIT_UNAUTHORIZED: i32 = 3;

/// Threshold Gate diagnostics CLI
#[derive(Parser, Debug)]
#[command(name = "gate-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Diagnostic tools for the threshold custodian network", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handshake with every custodian node and print the agreed keys
    Handshake(commands::HandshakeArgs),

    /// Recover the signer of a personal_sign signature
    Recover(commands::RecoverArgs),

    /// Verify an access token and print its params
    TokenInfo(commands::TokenInfoArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Handshake(args) => commands::handshake(args).await,
        Commands::Recover(args) => commands::recover(args).await,
        Commands::TokenInfo(args) => commands::token_info(args).await,
    }
}

/// Exit code for a failed command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<CustodianError>() {
        if err.is_quorum_failure() {
            return EXIT_QUORUM;
        }
    }
    if let Some(GateError::Unauthorized(_)) = err.downcast_ref::<GateError>() {
        return EXIT_UNAUTHORIZED;
    }
    EXIT_FAILURE
}
