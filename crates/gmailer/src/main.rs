//! # gmailer
//!
//! Command-line companion to `gmailer-core`: authorizes the Gmail account
//! once, checks that the stored token still works and sends a test email.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod console;

use clap::Parser;
use cli::{Cli, Command};
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gmailer=info,gmailer_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::debug!(
        credentials = %config.credentials_path.display(),
        token = %config.token_path.display(),
        "Starting gmailer"
    );

    match cli.command {
        Command::Setup => commands::setup::run(config).await,
        Command::Check => Ok(commands::check::run(&config).await),
        Command::Test(args) => commands::send_test::run(config, args).await,
    }
}
