// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Parser;
use threshold_gate::cli::{execute, exit_code, Cli};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}
