//! `OAuth2` token types and expiry handling.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// `OAuth2` access token with metadata.
///
/// Serialized with an RFC 3339 `expiry`. Deserialization also accepts
/// the `expires_in` + `created` pair written by Google client libraries.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredToken")]
pub struct Token {
    /// Access token string.
    pub access_token: String,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Expiration time.
    pub expiry: DateTime<Utc>,
    /// Refresh token for obtaining new access tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope granted by authorization server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Token {
    /// Creates a new token expiring at `expiry`.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expiry,
            refresh_token: None,
            scope: None,
        }
    }

    /// Creates a token from a token endpoint response received at `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the response carries an empty access token or an
    /// `expires_in` whose expiry cannot be represented.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Result<Self> {
        if response.access_token.is_empty() {
            return Err(Error::InvalidResponse("empty access_token".into()));
        }

        let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        Ok(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expiry: expiry_after(now, expires_in).ok_or_else(|| {
                Error::InvalidResponse(format!("expires_in out of range: {expires_in}"))
            })?,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            scope: response.scope,
        })
    }

    /// Checks if the token is expired at `now`.
    ///
    /// There is no grace window: the token is expired exactly when
    /// `now >= expiry`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    /// Checks if the token is expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns true if an expired token can be renewed without user interaction.
    #[must_use]
    pub const fn is_refreshable(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Returns the refresh token if available.
    ///
    /// # Errors
    ///
    /// Returns an error if no refresh token is available.
    pub fn refresh_token(&self) -> Result<&str> {
        self.refresh_token.as_deref().ok_or(Error::NoRefreshToken)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &mask_secret(&self.access_token))
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_secret),
            )
            .field("scope", &self.scope)
            .finish()
    }
}

/// Masks a secret for log output: first 4 chars, then `***`.
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    match secret.get(..4) {
        Some(prefix) if secret.len() > 4 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}

/// On-disk token shape accepted when loading.
#[derive(Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default, alias = "expires_at")]
    expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    created: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// `start + secs`, or `None` if the result is not representable.
fn expiry_after(start: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    start.checked_add_signed(TimeDelta::try_seconds(secs)?)
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<StoredToken> for Token {
    fn from(stored: StoredToken) -> Self {
        // Without a usable timestamp the token is treated as already expired.
        let expiry = stored
            .expiry
            .or_else(|| {
                let created = DateTime::from_timestamp(stored.created?, 0)?;
                expiry_after(created, stored.expires_in?)
            })
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            access_token: stored.access_token,
            token_type: stored.token_type,
            expiry,
            refresh_token: stored.refresh_token.filter(|t| !t.is_empty()),
            scope: stored.scope,
        }
    }
}

/// Token response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Token type.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Expires in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Scope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Error response from `OAuth2` server.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Error description.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Converts to an Error.
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::oauth_error(self.error, self.error_description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreadable_literal)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_token_creation() {
        let token = Token::new("access123", "Bearer", at(1_700_000_000));
        assert_eq!(token.access_token, "access123");
        assert_eq!(token.token_type, "Bearer");
        assert!(token.refresh_token.is_none());
        assert!(!token.is_refreshable());
    }

    #[test]
    fn test_expiry_boundary_is_exact() {
        let token = Token::new("a", "Bearer", at(1_000));
        assert!(!token.is_expired_at(at(999)));
        assert!(token.is_expired_at(at(1_000)));
        assert!(token.is_expired_at(at(1_001)));
    }

    #[test]
    fn test_token_from_response() {
        let response = TokenResponse {
            access_token: "test_token".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: Some(3599),
            refresh_token: Some("refresh".to_string()),
            scope: Some("https://www.googleapis.com/auth/gmail.send".to_string()),
        };

        let token = Token::from_response(response, at(1_000)).unwrap();
        assert_eq!(token.access_token, "test_token");
        assert_eq!(token.expiry, at(4_599));
        assert_eq!(token.refresh_token().unwrap(), "refresh");
    }

    #[test]
    fn test_from_response_defaults_lifetime() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"B"}"#).unwrap();
        let token = Token::from_response(response, at(0)).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expiry, at(3600));
    }

    #[test]
    fn test_from_response_rejects_empty_access_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"","expires_in":10}"#).unwrap();
        assert!(matches!(
            Token::from_response(response, at(0)),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_from_response_rejects_out_of_range_lifetime() {
        for expires_in in [9_000_000_000_000_000_i64, i64::MAX, i64::MIN] {
            let response = TokenResponse {
                access_token: "B".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: Some(expires_in),
                refresh_token: None,
                scope: None,
            };
            assert!(matches!(
                Token::from_response(response, at(1_700_000_000)),
                Err(Error::InvalidResponse(ref m)) if m.contains("expires_in")
            ));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let token = Token::new("A", "Bearer", Utc::now())
            .with_refresh_token("R")
            .with_scope("scope");
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_loads_google_library_format() {
        let json = r#"{
            "access_token": "ya29.x",
            "expires_in": 3599,
            "created": 1700000000,
            "refresh_token": "1//r",
            "scope": "https://www.googleapis.com/auth/gmail.send",
            "token_type": "Bearer"
        }"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.expiry, at(1_700_003_599));
        assert_eq!(token.refresh_token.as_deref(), Some("1//r"));
    }

    #[test]
    fn test_missing_timestamps_means_expired() {
        let token: Token =
            serde_json::from_str(r#"{"access_token":"a","expires_in":3599}"#).unwrap();
        assert_eq!(token.expiry, DateTime::UNIX_EPOCH);
        assert!(token.is_expired());
    }

    #[test]
    fn test_out_of_range_lifetime_means_expired() {
        let token: Token = serde_json::from_str(
            r#"{"access_token":"A","created":1700000000,"expires_in":9223372036854775807,"refresh_token":"R"}"#,
        )
        .unwrap();
        assert_eq!(token.expiry, DateTime::UNIX_EPOCH);
        assert!(token.is_refreshable());

        let token: Token = serde_json::from_str(
            r#"{"access_token":"A","created":9223372036854775807,"expires_in":60}"#,
        )
        .unwrap();
        assert_eq!(token.expiry, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_empty_refresh_token_is_absent() {
        let token: Token = serde_json::from_str(
            r#"{"access_token":"a","expiry":"2030-01-01T00:00:00Z","refresh_token":""}"#,
        )
        .unwrap();
        assert!(token.refresh_token.is_none());
        assert!(matches!(token.refresh_token(), Err(Error::NoRefreshToken)));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let token = Token::new("ya29.secret-value", "Bearer", at(0)).with_refresh_token("1//refresh");
        let debug = format!("{token:?}");
        assert!(debug.contains("ya29***"));
        assert!(!debug.contains("secret-value"));
        assert!(!debug.contains("1//refresh"));
    }

    #[test]
    fn test_mask_short_secret() {
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("abcd"), "***");
        assert_eq!(mask_secret("abcde"), "abcd***");
    }
}
