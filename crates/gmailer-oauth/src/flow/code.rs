//! Authorization Code Flow implementation.

use super::OAuthClient;
use crate::error::Result;
use crate::token::Token;
use url::Url;

/// Out-of-band redirect: the consent page shows the code for copy/paste.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Authorization Code Flow for `OAuth2`.
///
/// Used once, interactively, to obtain the first token (and its refresh
/// token). The user opens the authorization URL, grants access and pastes
/// the code shown back into the application.
#[derive(Debug)]
pub struct AuthorizationCodeFlow {
    client: OAuthClient,
}

impl AuthorizationCodeFlow {
    /// Creates a new authorization code flow.
    #[must_use]
    pub const fn new(client: OAuthClient) -> Self {
        Self { client }
    }

    /// Redirect URI sent with both the consent request and the code exchange.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        self.client.redirect_uri.as_deref().unwrap_or(OOB_REDIRECT_URI)
    }

    /// Builds the authorization URL for user consent.
    ///
    /// # Arguments
    ///
    /// * `state` - Optional state parameter for CSRF protection
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be constructed.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<Url> {
        let mut url = self.client.provider.auth_url.clone();

        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("client_id", &self.client.client_id)
                .append_pair("redirect_uri", self.redirect_uri())
                .append_pair("response_type", "code");

            let scope_str = self.client.provider.default_scopes.join(" ");
            if !scope_str.is_empty() {
                pairs.append_pair("scope", &scope_str);
            }

            if let Some(state_val) = state {
                pairs.append_pair("state", state_val);
            }

            // Offline access is what yields a refresh token.
            if self.client.provider.is_google() {
                pairs
                    .append_pair("access_type", "offline")
                    .append_pair("prompt", "select_account consent");
            }
        }

        Ok(url)
    }

    /// Exchanges the authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<Token> {
        self.client.exchange_code(code, self.redirect_uri()).await
    }
}

/// Extracts the authorization code from what the user pasted.
///
/// Accepts the bare code or a full redirect URL containing `code=`.
/// Returns `None` for blank input.
#[must_use]
pub fn extract_code(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains("code=") {
        let from_url = Url::parse(input)
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "code")
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|code| !code.is_empty());
        if from_url.is_some() {
            return from_url;
        }
    }

    Some(input.to_string())
}
