//! Client secrets as issued by the Google Cloud console.
//!
//! The console download wraps the fields in an `installed` (desktop app)
//! or `web` object:
//!
//! ```json
//! { "installed": { "client_id": "...", "client_secret": "...",
//!                  "token_uri": "https://oauth2.googleapis.com/token",
//!                  "redirect_uris": ["http://localhost"] } }
//! ```
//!
//! A flat object with the same fields is accepted as well.

use crate::error::{Error, Result};
use crate::provider::Provider;
use serde::Deserialize;
use std::fmt;

/// Application identity used for every token exchange.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientSecrets {
    /// Client ID.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Authorization endpoint override.
    #[serde(default)]
    pub auth_uri: Option<String>,
    /// Token endpoint override.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Registered redirect URIs.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SecretsFile {
    Installed { installed: ClientSecrets },
    Web { web: ClientSecrets },
    Flat(ClientSecrets),
}

impl ClientSecrets {
    /// Parses a client secrets document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not contain `client_id` and
    /// `client_secret` in any supported layout, or if either is empty.
    pub fn from_json(json: &str) -> Result<Self> {
        let secrets = match serde_json::from_str::<SecretsFile>(json).map_err(|_| {
            Error::InvalidConfig(
                "expected client_id and client_secret (optionally under \"installed\" or \"web\")"
                    .into(),
            )
        })? {
            SecretsFile::Installed { installed } => installed,
            SecretsFile::Web { web } => web,
            SecretsFile::Flat(flat) => flat,
        };

        if secrets.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("client_id is empty".into()));
        }
        if secrets.client_secret.trim().is_empty() {
            return Err(Error::InvalidConfig("client_secret is empty".into()));
        }

        Ok(secrets)
    }

    /// Builds the Google provider, honouring endpoint overrides in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if an override is not a valid URL.
    pub fn provider(&self) -> Result<Provider> {
        let mut provider = Provider::google()?;
        if let Some(auth_uri) = &self.auth_uri {
            provider = provider.with_auth_url(auth_uri)?;
        }
        if let Some(token_uri) = &self.token_uri {
            provider = provider.with_token_url(token_uri)?;
        }
        Ok(provider)
    }
}

impl fmt::Debug for ClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}
