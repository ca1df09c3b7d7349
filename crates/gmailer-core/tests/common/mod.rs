//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use gmailer_core::{MailSender, MailerConfig, TokenStore};
use gmailer_oauth::{OAuthClient, Provider, Token};
use wiremock::MockServer;

/// OAuth client whose token endpoint is `<server>/token`.
pub fn oauth_client(server: &MockServer) -> OAuthClient {
    let provider = Provider::google()
        .unwrap()
        .with_token_url(format!("{}/token", server.uri()))
        .unwrap();
    OAuthClient::new("client-id.apps.googleusercontent.com", provider)
        .with_client_secret("client-secret")
}

/// Fixed instant used as "now" in clock-injected tests.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Token valid for another hour.
pub fn fresh_token(access: &str) -> Token {
    Token::new(access, "Bearer", Utc::now() + Duration::hours(1)).with_refresh_token("refresh-1")
}

/// Token that expired an hour ago.
pub fn expired_token(access: &str) -> Token {
    Token::new(access, "Bearer", Utc::now() - Duration::hours(1)).with_refresh_token("refresh-1")
}

/// Writes `token` where a store would.
pub fn write_token(path: &Path, token: &Token) {
    std::fs::write(path, serde_json::to_string(token).unwrap()).unwrap();
}

/// Reads the token file back.
pub fn read_token(path: &Path) -> Token {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Permission bits of a file or directory.
#[cfg(unix)]
pub fn mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

/// Sender talking to `server` for both the API and the token endpoint.
pub fn sender(server: &MockServer, token_path: &Path) -> MailSender {
    let config = MailerConfig::new()
        .with_api_base_url(server.uri())
        .with_token_path(token_path)
        .with_credentials_path(token_path.with_file_name("credentials.json"));
    let store = TokenStore::new(token_path, oauth_client(server));
    MailSender::new(config, store).unwrap()
}
