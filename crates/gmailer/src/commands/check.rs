//! `gmailer check`: verifies credentials and token.

use crate::console;
use gmailer_core::{MailSender, MailerConfig};
use std::path::Path;
use std::process::ExitCode;

pub async fn run(config: &MailerConfig) -> ExitCode {
    if verify(config).await.is_some() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Checks the configuration step by step, refreshing an expired token.
///
/// Returns a ready sender when everything is usable.
pub async fn verify(config: &MailerConfig) -> Option<MailSender> {
    println!("Checking Gmail OAuth2 configuration...");
    println!();

    if !file_exists(&config.credentials_path).await {
        console::error(&format!(
            "Credentials file not found at: {}",
            config.credentials_path.display()
        ));
        print_setup_hint();
        return None;
    }
    console::ok("Credentials file found");

    if !file_exists(&config.token_path).await {
        console::error(&format!(
            "Token file not found at: {}",
            config.token_path.display()
        ));
        print_setup_hint();
        return None;
    }
    console::ok("Token file found");

    let mut sender = match MailSender::from_config(config.clone()).await {
        Ok(sender) => sender,
        Err(e) => {
            console::error(&e.to_string());
            print_setup_hint();
            return None;
        }
    };

    let was_valid = sender.is_token_valid().await;
    if let Err(e) = sender.token_store_mut().ensure_valid().await {
        console::error(&format!("Token validation failed: {e}"));
        print_setup_hint();
        return None;
    }
    if was_valid {
        console::ok("Token is valid");
    } else {
        console::warn("Token was expired but has been refreshed");
    }

    if let Some(address) = sender.authenticated_identity().await {
        console::ok(&format!("Authenticated as: {address}"));
    }
    println!();

    Some(sender)
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn print_setup_hint() {
    println!();
    println!("Run: gmailer setup");
}
