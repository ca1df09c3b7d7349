//! Sending mail through the Gmail REST API.

use crate::config::MailerConfig;
use crate::credentials::load_credentials;
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::message::{OutboundMessage, Recipients, SendOptions};
use crate::token_store::TokenStore;
use gmailer_mime::join_addresses;
use gmailer_oauth::OAuthClient;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    /// Remote message id.
    pub id: String,
    /// Remote thread id.
    #[serde(default)]
    pub thread_id: String,
    /// Labels applied by the server (usually `SENT`).
    #[serde(default)]
    pub label_ids: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
}

/// Sends mail as the authorized user.
///
/// Each send validates addresses, obtains a token through
/// [`TokenStore::ensure_valid`], and makes exactly one API call. Nothing is
/// retried.
#[derive(Debug)]
pub struct MailSender {
    config: MailerConfig,
    store: TokenStore,
    http: Client,
}

impl MailSender {
    /// Creates a sender from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(config: MailerConfig, store: TokenStore) -> Result<Self> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Ok(Self {
            config,
            store,
            http,
        })
    }

    /// Loads credentials and sets up the token store described by `config`.
    ///
    /// The token file itself is not read until the first send.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration, and
    /// `Error::CredentialsNotFound` or `Error::InvalidCredentials` if the
    /// credentials file is unusable.
    pub async fn from_config(config: MailerConfig) -> Result<Self> {
        config.validate()?;
        let secrets = load_credentials(&config.credentials_path).await?;
        let http = build_http_client(&config)?;

        let client = OAuthClient::from_secrets(&secrets)
            .map_err(|e| Error::InvalidCredentials {
                path: config.credentials_path.clone(),
                reason: e.to_string(),
            })?
            .with_http_client(http.clone());
        let store = TokenStore::new(&config.token_path, client);

        Ok(Self {
            config,
            store,
            http,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MailerConfig {
        &self.config
    }

    /// Token store used by this sender.
    #[must_use]
    pub const fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Mutable access to the token store (setup and diagnostics).
    pub const fn token_store_mut(&mut self) -> &mut TokenStore {
        &mut self.store
    }

    /// Sends an HTML email.
    ///
    /// Sender address and display name default to the configured ones when
    /// `options` leaves them unset.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoRecipients` or `Error::InvalidAddress` before any
    /// network call, token errors from [`TokenStore::ensure_valid`]
    /// unchanged, and `Error::SendFailed` if the API call fails.
    pub async fn send_email(
        &mut self,
        to: impl Into<Recipients>,
        subject: &str,
        body_html: &str,
        options: SendOptions,
    ) -> Result<SentMessage> {
        let message = OutboundMessage::new(to, subject, body_html)
            .from_address(&self.config.from_address, self.config.from_name.clone())
            .with_options(options);
        self.send(message).await
    }

    /// Flattens a framework envelope and sends it.
    ///
    /// # Errors
    ///
    /// Same as [`MailSender::send`].
    pub async fn send_envelope(&mut self, envelope: Envelope) -> Result<SentMessage> {
        let message = envelope.into_message(
            &self.config.from_address,
            self.config.from_name.as_deref(),
        );
        self.send(message).await
    }

    /// Sends a prepared message.
    ///
    /// # Errors
    ///
    /// Same as [`MailSender::send_email`].
    pub async fn send(&mut self, message: OutboundMessage) -> Result<SentMessage> {
        message.validate()?;
        let token = self.store.ensure_valid().await?;

        let recipients = join_addresses(&message.to);
        let payload = message.encode();
        let url = self.config.send_url()?;
        debug!(to = %recipients, "Posting message to {url}");

        let outcome = async {
            let response = self
                .http
                .post(url)
                .bearer_auth(&token.access_token)
                .json(&payload)
                .send()
                .await
                .map_err(|e| e.to_string())?;

            let status = response.status();
            let body = response.text().await.map_err(|e| e.to_string())?;
            if !status.is_success() {
                return Err(format!("{status}: {}", remote_error_message(&body)));
            }

            serde_json::from_str::<SentMessage>(&body)
                .map_err(|e| format!("malformed response ({e}): {}", body.trim()))
        }
        .await;

        match outcome {
            Ok(sent) => {
                info!(
                    to = %recipients,
                    subject = %message.subject,
                    id = %sent.id,
                    "Email sent successfully via Gmail API"
                );
                Ok(sent)
            }
            Err(reason) => {
                error!(
                    to = %recipients,
                    subject = %message.subject,
                    "Gmail send error: {reason}"
                );
                Err(Error::SendFailed(reason))
            }
        }
    }

    /// Returns true if a stored token exists and is unexpired. Never refreshes.
    pub async fn is_token_valid(&mut self) -> bool {
        self.store.is_valid().await
    }

    /// Email address of the authorized account, or `None` on any failure.
    pub async fn authenticated_identity(&mut self) -> Option<String> {
        match self.fetch_identity().await {
            Ok(address) => Some(address),
            Err(reason) => {
                warn!("Could not determine authenticated Gmail address: {reason}");
                None
            }
        }
    }

    async fn fetch_identity(&mut self) -> std::result::Result<String, String> {
        let token = self.store.ensure_valid().await.map_err(|e| e.to_string())?;
        let url = self.config.profile_url().map_err(|e| e.to_string())?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("{status}: {}", remote_error_message(&body)));
        }

        serde_json::from_str::<Profile>(&body)
            .map(|profile| profile.email_address)
            .map_err(|e| format!("malformed profile response: {e}"))
    }
}

fn build_http_client(config: &MailerConfig) -> Result<Client> {
    let user_agent = format!(
        "{} gmailer/{}",
        config.application_name,
        env!("CARGO_PKG_VERSION")
    );
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::Config(format!("HTTP client: {e}")))
}

/// Extracts the human-readable error from a Google API error body.
///
/// Google answers `{"error": {"code": 400, "message": "..."}}`; anything
/// else is returned trimmed as-is.
fn remote_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ApiErrorBody {
        error: ApiError,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ApiError {
        Detailed { message: String },
        Code(String),
    }

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error: ApiError::Detailed { message } | ApiError::Code(message),
        }) => message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message() {
        assert_eq!(
            remote_error_message(
                r#"{"error":{"code":400,"message":"Invalid To header","status":"INVALID_ARGUMENT"}}"#
            ),
            "Invalid To header"
        );
        assert_eq!(
            remote_error_message(r#"{"error":"invalid_request"}"#),
            "invalid_request"
        );
        assert_eq!(remote_error_message("  upstream timeout \n"), "upstream timeout");
        assert_eq!(remote_error_message(""), "empty response body");
    }
}
