//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use gmailer_core::MailerConfig;
use std::path::PathBuf;

/// Send mail through the Gmail API with a stored OAuth2 grant.
#[derive(Debug, Parser)]
#[command(name = "gmailer", author, version, about)]
pub struct Cli {
    /// OAuth client credentials JSON downloaded from Google Cloud Console.
    #[arg(long, global = true, env = "GMAIL_CREDENTIALS_PATH", value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Where the user token is stored.
    #[arg(long, global = true, env = "GMAIL_TOKEN_PATH", value_name = "PATH")]
    pub token: Option<PathBuf>,

    /// Gmail API base URL.
    #[arg(long, global = true, env = "GMAIL_API_BASE_URL", value_name = "URL")]
    pub api_base: Option<String>,

    /// Application name reported to Google and shown in test emails.
    #[arg(long, global = true, env = "GMAIL_APPLICATION_NAME", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Default sender address (`me` sends as the authorized account).
    #[arg(long, global = true, env = "GMAIL_FROM_ADDRESS", value_name = "ADDRESS")]
    pub from: Option<String>,

    /// Display name for the default sender.
    #[arg(long, global = true, env = "GMAIL_FROM_NAME", value_name = "NAME")]
    pub from_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorize the Gmail account and store the token
    Setup,
    /// Check credentials and token without sending anything
    Check,
    /// Send a test email
    Test(TestArgs),
}

/// Arguments of `gmailer test`.
#[derive(Debug, Args)]
pub struct TestArgs {
    /// Recipient of the test email
    #[arg(env = "GMAIL_TEST_RECIPIENT")]
    pub email: Option<String>,

    /// Subject of the test email
    #[arg(long)]
    pub subject: Option<String>,

    /// Only check the configuration, do not send
    #[arg(long)]
    pub check_only: bool,
}

impl Cli {
    /// Builds the mailer configuration from defaults and overrides.
    pub fn config(&self) -> MailerConfig {
        let mut config = MailerConfig::new();
        if let Some(path) = &self.credentials {
            config = config.with_credentials_path(path);
        }
        if let Some(path) = &self.token {
            config = config.with_token_path(path);
        }
        if let Some(url) = &self.api_base {
            config = config.with_api_base_url(url);
        }
        if let Some(name) = &self.app_name {
            config = config.with_application_name(name);
        }
        if self.from.is_some() || self.from_name.is_some() {
            let address = self
                .from
                .clone()
                .unwrap_or_else(|| config.from_address.clone());
            config = config.with_from(address, self.from_name.clone());
        }
        config
    }
}
