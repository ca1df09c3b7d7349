//! Mailer configuration.

use crate::error::{Error, Result};
use crate::validation::{ME, is_valid_email};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default Gmail REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com";

/// Default application name.
pub const DEFAULT_APPLICATION_NAME: &str = "gmailer";

/// Path of the send endpoint relative to the API base.
const SEND_PATH: &str = "/gmail/v1/users/me/messages/send";

/// Path of the profile endpoint relative to the API base.
const PROFILE_PATH: &str = "/gmail/v1/users/me/profile";

/// Returns the per-user configuration directory (`<config_dir>/gmailer`).
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_APPLICATION_NAME)
}

/// Everything the sender needs, validated once before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// OAuth client credentials JSON from the Google Cloud console.
    pub credentials_path: PathBuf,
    /// Where the user token is stored.
    pub token_path: PathBuf,
    /// Application name, used in the HTTP user agent.
    pub application_name: String,
    /// Gmail API base URL.
    pub api_base_url: String,
    /// Sender used when a message does not set one (`me` for the account itself).
    pub from_address: String,
    /// Display name used with the default sender.
    pub from_name: Option<String>,
    /// Recipient of `gmailer test` when none is given.
    pub test_recipient: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        let dir = default_config_dir();
        Self {
            credentials_path: dir.join("credentials.json"),
            token_path: dir.join("token.json"),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            from_address: ME.to_string(),
            from_name: None,
            test_recipient: None,
        }
    }
}

impl MailerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials file path.
    #[must_use]
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Sets the token file path.
    #[must_use]
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the application name.
    #[must_use]
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Sets the default sender and display name.
    #[must_use]
    pub fn with_from(mut self, address: impl Into<String>, name: Option<String>) -> Self {
        self.from_address = address.into();
        self.from_name = name.filter(|n| !n.is_empty());
        self
    }

    /// Sets the default test recipient.
    #[must_use]
    pub fn with_test_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.test_recipient = Some(recipient.into());
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty path, an unparsable API base URL
    /// or an invalid default sender.
    pub fn validate(&self) -> Result<()> {
        if is_empty_path(&self.credentials_path) {
            return Err(Error::Config("credentials_path is empty".into()));
        }
        if is_empty_path(&self.token_path) {
            return Err(Error::Config("token_path is empty".into()));
        }

        let base = Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("api_base_url {:?}: {e}", self.api_base_url)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "api_base_url must be http(s): {}",
                self.api_base_url
            )));
        }

        if self.from_address != ME && !is_valid_email(&self.from_address) {
            return Err(Error::Config(format!(
                "from_address is not a valid address: {}",
                self.from_address
            )));
        }

        Ok(())
    }

    /// URL of the message send endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the base URL is invalid.
    pub fn send_url(&self) -> Result<Url> {
        self.endpoint(SEND_PATH)
    }

    /// URL of the profile endpoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the base URL is invalid.
    pub fn profile_url(&self) -> Result<Url> {
        self.endpoint(PROFILE_PATH)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{path}", self.api_base_url.trim_end_matches('/'));
        Url::parse(&joined).map_err(|e| Error::Config(format!("api_base_url: {e}")))
    }
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MailerConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.from_address, "me");
        assert!(config.credentials_path.ends_with("gmailer/credentials.json"));
        assert!(config.token_path.ends_with("gmailer/token.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoints() {
        let config = MailerConfig::new().with_api_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            config.send_url().unwrap().as_str(),
            "http://127.0.0.1:8080/gmail/v1/users/me/messages/send"
        );
        assert_eq!(
            config.profile_url().unwrap().as_str(),
            "http://127.0.0.1:8080/gmail/v1/users/me/profile"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_token = MailerConfig::new().with_token_path("");
        assert!(matches!(empty_token.validate(), Err(Error::Config(_))));

        let bad_url = MailerConfig::new().with_api_base_url("not a url");
        assert!(matches!(bad_url.validate(), Err(Error::Config(_))));

        let ftp = MailerConfig::new().with_api_base_url("ftp://example.com");
        assert!(matches!(ftp.validate(), Err(Error::Config(_))));

        let bad_from = MailerConfig::new().with_from("nobody", None);
        assert!(matches!(bad_from.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_with_from_drops_empty_name() {
        let config = MailerConfig::new().with_from("ops@example.com", Some(String::new()));
        assert_eq!(config.from_name, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: MailerConfig =
            serde_json::from_str(r#"{"token_path": "/srv/mail/token.json"}"#).unwrap();
        assert_eq!(config.token_path, PathBuf::from("/srv/mail/token.json"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
