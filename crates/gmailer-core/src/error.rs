//! Error types for the core library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while authorizing or sending mail.
///
/// Every message names the file involved or tells the operator to re-run
/// `gmailer setup`.
#[derive(Debug, Error)]
pub enum Error {
    /// The OAuth client credentials file does not exist.
    #[error(
        "Gmail credentials file not found at {}: download the OAuth client JSON from the Google Cloud console and place it there",
        .0.display()
    )]
    CredentialsNotFound(PathBuf),

    /// The credentials file exists but cannot be used.
    #[error("Invalid Gmail credentials file {}: {reason}", .path.display())]
    InvalidCredentials {
        /// Credentials file path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// No token has been stored yet.
    #[error("Gmail OAuth token not found at {}: run `gmailer setup`", .0.display())]
    TokenNotFound(PathBuf),

    /// The token file exists but cannot be read or parsed.
    #[error("Invalid Gmail OAuth token file {}: {reason}; run `gmailer setup`", .path.display())]
    InvalidToken {
        /// Token file path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The access token expired and there is no refresh token.
    #[error("Gmail OAuth token has expired and cannot be refreshed: run `gmailer setup`")]
    TokenExpiredNoRefresh,

    /// The token endpoint rejected or failed the refresh.
    #[error("Gmail OAuth token refresh failed: {0}")]
    RefreshFailed(#[source] gmailer_oauth::Error),

    /// The token could not be written to disk.
    #[error("Failed to save Gmail OAuth token to {}: {reason}", .path.display())]
    PersistFailed {
        /// Token file path.
        path: PathBuf,
        /// Underlying I/O or serialization failure.
        reason: String,
    },

    /// The send call failed or returned an unusable response.
    #[error("Failed to send email via Gmail API: {0}")]
    SendFailed(String),

    /// The authorization code exchange failed.
    #[error("Gmail OAuth authentication failed: {0}")]
    AuthenticationFailed(#[source] gmailer_oauth::Error),

    /// An address failed the syntactic check.
    #[error("Invalid email address: {0:?}")]
    InvalidAddress(String),

    /// The message has no `To` recipients.
    #[error("At least one recipient is required")]
    NoRecipients,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if the operator has to run the interactive setup again.
    #[must_use]
    pub fn needs_reauthorization(&self) -> bool {
        match self {
            Self::TokenNotFound(_) | Self::InvalidToken { .. } | Self::TokenExpiredNoRefresh => {
                true
            }
            Self::RefreshFailed(cause) => cause.is_invalid_grant(),
            _ => false,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
