// src/main.rs

use posix_ldap_sync::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match cli::run_cli().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::from(cli::EXIT_FATAL)
        }
    }
}
