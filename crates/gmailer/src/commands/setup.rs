//! `gmailer setup`: interactive first-time authorization.

use crate::console;
use gmailer_core::{Error, MailSender, MailerConfig};
use gmailer_oauth::extract_code;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;

pub async fn run(config: MailerConfig) -> anyhow::Result<ExitCode> {
    let mut sender = match MailSender::from_config(config).await {
        Ok(sender) => sender,
        Err(Error::CredentialsNotFound(path)) => {
            print_credentials_help(&path);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if reuse_existing_token(&mut sender).await {
        show_identity(&mut sender).await;
        return Ok(ExitCode::SUCCESS);
    }

    let store = sender.token_store_mut();
    let flow = store.authorization_flow();
    let auth_url = flow.authorization_url(None)?;

    println!();
    console::title("Gmail OAuth2 Setup");
    println!("1. Open the following link in your browser:");
    println!();
    println!("{auth_url}");
    println!();
    println!("2. Log in with your Google account and grant permissions");
    println!("3. Copy the authorization code shown on screen");
    println!("   (or the whole address of the page you were redirected to)");
    println!("4. Paste it below");
    println!();

    let input = console::prompt(
        "Enter the authorization code (only the code value, not the entire URL): ",
    )
    .await?;
    let Some(code) = extract_code(&input) else {
        console::error("Authorization code is required.");
        return Ok(ExitCode::FAILURE);
    };

    match store.authorize_with_code(&code).await {
        Ok(_) => {}
        Err(e @ Error::AuthenticationFailed(_)) => {
            console::error(&e.to_string());
            println!("Make sure you copied only the code value, not the entire URL");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    }

    println!();
    println!("Gmail OAuth2 setup completed successfully!");
    println!("Token saved to: {}", store.path().display());
    show_identity(&mut sender).await;
    println!();
    println!("Your application now has permission to send emails via the Gmail API");
    println!();
    println!("Next steps:");
    println!("1. Point your application at the same credentials and token files");
    println!("2. Run: gmailer test to verify the setup");

    Ok(ExitCode::SUCCESS)
}

/// Returns true if a stored token is usable as-is or after a refresh.
async fn reuse_existing_token(sender: &mut MailSender) -> bool {
    let store = sender.token_store_mut();
    let token = match store.load().await {
        Ok(token) => token,
        Err(Error::TokenNotFound(_)) => return false,
        Err(e) => {
            console::warn(&format!("Ignoring stored token: {e}"));
            return false;
        }
    };

    if !token.is_expired() {
        println!("Gmail OAuth2 is already set up and token is valid!");
        return true;
    }
    if !token.is_refreshable() {
        return false;
    }

    match store.ensure_valid().await {
        Ok(_) => {
            println!("Token refreshed successfully!");
            true
        }
        Err(e) => {
            warn!("Token refresh during setup failed: {e}");
            console::warn("Failed to refresh token. Re-authenticating...");
            false
        }
    }
}

async fn show_identity(sender: &mut MailSender) {
    if let Some(address) = sender.authenticated_identity().await {
        println!("Authenticated as: {address}");
    }
}

fn print_credentials_help(path: &Path) {
    console::error(&format!("Credentials file not found at: {}", path.display()));
    println!();
    println!("To get your credentials:");
    println!("1. Go to Google Cloud Console: https://console.cloud.google.com/");
    println!("2. Create a new project or select an existing one");
    println!("3. Enable the Gmail API");
    println!("4. Go to Credentials > Create Credentials > OAuth client ID");
    println!("5. Select \"Desktop app\" as the application type");
    println!("6. Download the credentials JSON file");
    println!("7. Save it to: {}", path.display());
}
